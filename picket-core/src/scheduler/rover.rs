//! The rover control loop

use picket_protocol::{LineBuffer, Reply, StatusLine, StopReason};

use crate::config::{PlatformCapabilities, RoverConfig, ScanMode, WatchdogProfile};
use crate::motion::{ChannelMap, MotionController};
use crate::safety::{RangeMonitor, SafetyVerdict, Watchdog, WatchdogStatus};
use crate::scan::HeadingActuator;
use crate::state::RoverState;
use crate::telemetry::{self, TelemetryReporter};
use crate::traits::{DirectionRegister, EchoSensor, EnableGate, LineSink, ServoOutput};
use crate::VERSION;

/// Board drivers handed to the rover at boot
pub struct RoverHardware<R, G, S, E> {
    pub register: R,
    pub gate: G,
    pub servo: S,
    pub sensor: E,
}

/// All control components and the state they share
pub struct Rover<R, G, S, E> {
    pub(super) config: RoverConfig,
    pub(super) profile: WatchdogProfile,
    pub(super) state: RoverState,
    pub(super) lines: LineBuffer,
    pub(super) motion: MotionController<R, G>,
    pub(super) range: RangeMonitor<E>,
    pub(super) heading: HeadingActuator<S>,
    pub(super) watchdog: Watchdog,
    pub(super) telemetry: TelemetryReporter,
}

impl<R, G, S, E> Rover<R, G, S, E>
where
    R: DirectionRegister,
    G: EnableGate,
    S: ServoOutput,
    E: EchoSensor,
{
    /// Assemble the rover in its safe boot state
    ///
    /// Nothing is written to hardware until [`Rover::boot`].
    pub fn new(
        config: RoverConfig,
        caps: PlatformCapabilities,
        channels: ChannelMap,
        hw: RoverHardware<R, G, S, E>,
        now_ms: u32,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Rover config rejected ({:?}), using defaults", e);
                RoverConfig::default()
            }
        };

        let profile = WatchdogProfile::active();
        let binary_gate = caps.binary_gate(&config.platform);
        if binary_gate {
            info!("Gate shares a timer with the servo; using binary gating");
        }

        let state = RoverState::new(
            config.telemetry.verbose_at_boot(profile),
            config.scan.mode == ScanMode::Sweep,
        );

        Self {
            motion: MotionController::new(hw.register, hw.gate, channels, config.drive, binary_gate),
            range: RangeMonitor::new(hw.sensor, config.range),
            heading: HeadingActuator::new(hw.servo, config.scan),
            watchdog: Watchdog::new(config.watchdog.timeout_ms(profile), now_ms),
            telemetry: TelemetryReporter::new(config.telemetry),
            lines: LineBuffer::new(),
            state,
            profile,
            config,
        }
    }

    /// Drive every output to its safe state and announce ourselves
    pub fn boot<K: LineSink>(&mut self, now_ms: u32, sink: &mut K) {
        self.motion.init();
        self.heading.init(now_ms);
        self.watchdog.note_heartbeat(now_ms);

        info!(
            "Rover boot: watchdog {} ms, bench={}",
            self.watchdog.timeout_ms(),
            self.profile.is_bench()
        );
        emit(
            sink,
            Reply::Boot {
                version: VERSION,
                heartbeat_timeout_ms: self.watchdog.timeout_ms(),
                bench: self.profile.is_bench(),
            },
        );
    }

    /// Run one control cycle
    ///
    /// `input` holds the bytes received since the previous tick.
    pub fn tick<K: LineSink>(&mut self, now_ms: u32, input: &[u8], sink: &mut K) {
        for &byte in input {
            match self.lines.feed(byte) {
                Ok(Some(line)) => self.dispatch_line(&line, now_ms, sink),
                Ok(None) => {}
                Err(kind) => emit(sink, Reply::Error { kind, text: "" }),
            }
        }

        match self.watchdog.tick(now_ms) {
            WatchdogStatus::Ok => {}
            WatchdogStatus::Tripped => {
                self.state.stop(StopReason::Watchdog, now_ms);
                emit(sink, Reply::Stopped(StopReason::Watchdog));
            }
            WatchdogStatus::Latched => {
                if self.state.mode().is_moving() {
                    self.state.stop(StopReason::Watchdog, now_ms);
                }
            }
        }

        let moving = self.state.mode().is_moving();
        self.heading.tick(now_ms, self.state.sweep_engaged());

        let settled = self.heading.is_settled(now_ms);
        if self.range.safety_tick(now_ms, settled, self.state.threshold_cm, moving)
            == SafetyVerdict::Trip
        {
            self.state.stop(StopReason::Safety, now_ms);
            emit(sink, Reply::Stopped(StopReason::Safety));
            emit(sink, Reply::Status(self.status()));
        }

        self.motion.tick(now_ms, &self.state);

        if self.telemetry.periodic_due(now_ms, self.state.verbose) {
            emit(sink, Reply::Status(self.status()));
        }
    }

    /// Current `STAT` snapshot
    pub fn status(&self) -> StatusLine {
        telemetry::snapshot(
            &self.state,
            self.motion.effective_duty(&self.state),
            self.range.last_cm_x10(),
        )
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }

    pub fn motion(&self) -> &MotionController<R, G> {
        &self.motion
    }

    pub fn heading(&self) -> &HeadingActuator<S> {
        &self.heading
    }

    pub fn range(&self) -> &RangeMonitor<E> {
        &self.range
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn config(&self) -> &RoverConfig {
        &self.config
    }
}

/// Render a reply and hand it to the sink
pub(super) fn emit<K: LineSink>(sink: &mut K, reply: Reply<'_>) {
    sink.send_line(&reply.render());
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::state::MotionMode;
    use crate::traits::mock::{MockEcho, MockGate, MockRegister, MockServo, MockSink};

    pub(in crate::scheduler) type TestRover = Rover<MockRegister, MockGate, MockServo, MockEcho>;

    /// Quiet rover (no periodic telemetry) booted at t=0, obstacle far away
    pub(in crate::scheduler) fn rover() -> (TestRover, MockSink) {
        let mut config = RoverConfig::default();
        config.telemetry.verbose = Some(false);
        rover_with(config)
    }

    pub(in crate::scheduler) fn rover_with(config: RoverConfig) -> (TestRover, MockSink) {
        let hw = RoverHardware {
            register: MockRegister::default(),
            gate: MockGate::default(),
            servo: MockServo::default(),
            sensor: MockEcho::at_cm(200),
        };
        let mut rover = Rover::new(
            config,
            PlatformCapabilities::default(),
            ChannelMap::default(),
            hw,
            0,
        );
        let mut sink = MockSink::default();
        rover.boot(0, &mut sink);
        (rover, sink)
    }

    /// Tick every 10 ms over `[from, to)` with no input
    pub(in crate::scheduler) fn run(rover: &mut TestRover, sink: &mut MockSink, from: u32, to: u32) {
        for now in (from..to).step_by(10) {
            rover.tick(now, b"", sink);
        }
    }

    // ========== Boot ==========

    #[test]
    fn test_boot_banner_and_safe_outputs() {
        let (rover, sink) = rover();
        assert_eq!(sink.lines.len(), 1);
        assert!(sink.lines[0].starts_with("BOOT picket "));
        assert!(sink.lines[0].contains(" hb_ms="));

        assert_eq!(rover.state().mode(), MotionMode::Stop);
        assert_eq!(rover.motion().gate().duty, 0);
        assert_eq!(rover.motion().register().latched, 0);
        assert_eq!(rover.heading().servo().angle, 90);
    }

    // ========== Scenario A: query after boot ==========

    #[test]
    fn test_query_after_boot() {
        let (mut rover, mut sink) = rover();
        sink.clear();

        rover.tick(10, b"Q\n", &mut sink);

        assert_eq!(sink.lines[0].as_str(), "STAT mode=S spd=0 thresh=0 last_cm=-1 sweep=0");
        assert_eq!(sink.count_prefix("DIST cm="), 1);
    }

    // ========== Scenario B: debounced safety stop ==========

    #[test]
    fn test_safety_stop() {
        let (mut rover, mut sink) = rover();
        run(&mut rover, &mut sink, 0, 200);
        rover.range.sensor_mut().set_cm(Some(50));
        sink.clear();

        rover.tick(200, b"T60\nF160\n", &mut sink);
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);
        assert_eq!(rover.motion().gate().duty, 160);

        let mut stopped_at = None;
        for now in (210..=440).step_by(10) {
            rover.tick(now, b"", &mut sink);
            if stopped_at.is_none() && rover.state().mode() == MotionMode::Stop {
                stopped_at = Some(now);
            }
        }

        let stopped_at = stopped_at.expect("safety stop never fired");
        assert!(stopped_at - 200 <= 240);
        assert!(sink.has("EVT stop=safety"));
        assert_eq!(sink.count_prefix("EVT stop=safety"), 1);
        assert_eq!(rover.motion().gate().duty, 0);
        assert_eq!(rover.state().last_stop, Some(StopReason::Safety));
    }

    #[test]
    fn test_safety_stop_recovers_on_motion_command() {
        let (mut rover, mut sink) = rover();
        run(&mut rover, &mut sink, 0, 200);
        rover.range.sensor_mut().set_cm(Some(50));
        rover.tick(200, b"T60\nF160\n", &mut sink);
        run(&mut rover, &mut sink, 210, 450);
        assert_eq!(rover.state().mode(), MotionMode::Stop);

        rover.range.sensor_mut().set_cm(Some(150));
        rover.tick(450, b"B\n", &mut sink);
        assert_eq!(rover.state().mode(), MotionMode::BackSlow);
    }

    #[test]
    fn test_threshold_zero_never_stops() {
        let (mut rover, mut sink) = rover();
        rover.range.sensor_mut().set_cm(Some(5));
        rover.tick(0, b"F200\n", &mut sink);
        for now in (10..500).step_by(10) {
            rover.tick(now, b"HB\n", &mut sink);
        }
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);
        assert_eq!(sink.count_prefix("EVT"), 0);
    }

    // ========== Scenario C: commanded stop ==========

    #[test]
    fn test_command_stop() {
        let (mut rover, mut sink) = rover();
        rover.tick(0, b"F160\n", &mut sink);
        assert_eq!(rover.motion().gate().duty, 160);
        sink.clear();

        rover.tick(10, b"S\n", &mut sink);
        assert_eq!(rover.motion().gate().duty, 0);
        assert_eq!(rover.motion().register().latched, 0);
        assert_eq!(sink.lines[0].as_str(), "OK S");
        assert_eq!(sink.lines[1].as_str(), "EVT stop=command");
        assert!(sink.lines[2].starts_with("STAT mode=S spd=0"));
    }

    // ========== Scenario D: unknown command ==========

    #[test]
    fn test_unknown_command_changes_nothing() {
        let (mut rover, mut sink) = rover();
        rover.tick(0, b"T40\nF200\n", &mut sink);
        sink.clear();

        rover.tick(10, b"ZZZ\n", &mut sink);
        assert_eq!(sink.lines.len(), 1);
        assert_eq!(sink.lines[0].as_str(), "ERR unknown ZZZ");
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);
        assert_eq!(rover.state().duty_override, Some(200));
        assert_eq!(rover.state().threshold_cm, 40);
    }

    // ========== Watchdog ==========

    #[test]
    fn test_watchdog_latches_until_command() {
        let (mut rover, mut sink) = rover();
        let timeout = rover.watchdog().timeout_ms();
        rover.tick(0, b"F160\n", &mut sink);
        sink.clear();

        run(&mut rover, &mut sink, 10, timeout + 100);
        assert_eq!(rover.state().mode(), MotionMode::Stop);
        assert_eq!(rover.motion().gate().duty, 0);
        assert_eq!(sink.count_prefix("EVT stop=watchdog"), 1);

        // Queries do not count as host supervision
        let now = timeout + 100;
        rover.tick(now, b"Q\n", &mut sink);
        assert!(rover.watchdog().is_latched());
        run(&mut rover, &mut sink, now + 10, now + 200);
        assert_eq!(sink.count_prefix("EVT stop=watchdog"), 1);

        rover.tick(now + 200, b"F160\n", &mut sink);
        assert!(!rover.watchdog().is_latched());
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);
        assert_eq!(rover.motion().gate().duty, 160);
    }

    #[test]
    fn test_heartbeat_keeps_link_alive() {
        let (mut rover, mut sink) = rover();
        let timeout = rover.watchdog().timeout_ms();
        rover.tick(0, b"F160\n", &mut sink);
        sink.clear();

        let step = timeout / 3;
        let mut now = 0;
        while now < timeout * 4 {
            now += step;
            rover.tick(now, b"HB\n", &mut sink);
        }
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);
        assert_eq!(sink.count_prefix("EVT"), 0);
        // HB is never echoed
        assert_eq!(sink.count_prefix("OK"), 0);
    }

    // ========== Idempotence ==========

    #[test]
    fn test_repeated_command_no_extra_transitions() {
        let (mut rover, mut sink) = rover();
        rover.tick(0, b"F200\n", &mut sink);
        let bit_writes = rover.motion().register().bit_writes;
        let applies = rover.motion().register().applies;
        let gate_writes = rover.motion().gate().writes;

        for now in (10..300).step_by(10) {
            sink.clear();
            rover.tick(now, b"F200\n", &mut sink);
        }

        assert_eq!(rover.motion().register().bit_writes, bit_writes);
        assert_eq!(rover.motion().register().applies, applies);
        assert_eq!(rover.motion().gate().writes, gate_writes);
    }

    // ========== Telemetry ==========

    #[test]
    fn test_periodic_status_when_verbose() {
        let (mut rover, mut sink) = rover();
        rover.tick(10, b"V1\n", &mut sink);
        run(&mut rover, &mut sink, 20, 1010);
        // Due at 10, 260, 510, 760
        assert_eq!(sink.count_prefix("STAT"), 4);
    }

    #[test]
    fn test_verbose_from_config() {
        let mut config = RoverConfig::default();
        config.telemetry.verbose = Some(true);
        let (mut rover, mut sink) = rover_with(config);
        sink.clear();
        rover.tick(0, b"", &mut sink);
        assert_eq!(sink.count_prefix("STAT"), 1);
    }

    // ========== Sweep ==========

    #[test]
    fn test_sweep_only_while_moving() {
        let (mut rover, mut sink) = rover();
        rover.tick(0, b"W1\n", &mut sink);
        run(&mut rover, &mut sink, 10, 400);
        assert!(!rover.heading().is_sweeping());

        rover.tick(400, b"F\n", &mut sink);
        run(&mut rover, &mut sink, 410, 700);
        assert!(rover.heading().is_sweeping());
        assert_ne!(rover.heading().target(), 90);

        rover.tick(700, b"S\n", &mut sink);
        assert!(!rover.heading().is_sweeping());
        let held = rover.heading().target();
        run(&mut rover, &mut sink, 710, 900);
        assert_eq!(rover.heading().target(), held);
        assert!(!rover.heading().servo().attached);
    }

    #[test]
    fn test_sweep_enabled_from_config() {
        let mut config = RoverConfig::default();
        config.telemetry.verbose = Some(false);
        config.scan.mode = ScanMode::Sweep;
        let (rover, _) = rover_with(config);
        assert!(rover.state().sweep_enabled);
    }

    #[test]
    fn test_safety_stop_while_sweeping() {
        let mut config = RoverConfig::default();
        config.telemetry.verbose = Some(false);
        config.scan.mode = ScanMode::Sweep;
        let (mut rover, mut sink) = rover_with(config);
        run(&mut rover, &mut sink, 0, 200);
        rover.range.sensor_mut().set_cm(Some(50));
        sink.clear();

        rover.tick(200, b"T60\nF160\n", &mut sink);
        assert_eq!(rover.state().mode(), MotionMode::ForwardFast);

        let mut stopped_at = None;
        for now in (210..1000).step_by(10) {
            let input: &[u8] = if now % 100 == 0 { b"HB\n" } else { b"" };
            rover.tick(now, input, &mut sink);
            if rover.state().mode() == MotionMode::Stop {
                stopped_at = Some(now);
                break;
            }
        }

        // One safety sample per sweep step: three steps at most
        let stopped_at = stopped_at.expect("no safety stop while sweeping");
        assert!(stopped_at - 200 <= 3 * 120 + 100, "stopped at {}", stopped_at);
        assert_eq!(sink.count_prefix("EVT stop=safety"), 1);
        assert_eq!(rover.state().last_stop, Some(StopReason::Safety));
    }

    #[test]
    fn test_status_reports_engaged_sweep() {
        let (mut rover, mut sink) = rover();
        rover.tick(0, b"W1\n", &mut sink);
        sink.clear();

        rover.tick(10, b"Q\n", &mut sink);
        assert!(sink.lines[0].ends_with(" sweep=0"), "{}", sink.lines[0]);

        rover.tick(20, b"F\n", &mut sink);
        sink.clear();
        rover.tick(30, b"Q\n", &mut sink);
        assert!(sink.lines[0].starts_with("STAT mode=FF "));
        assert!(sink.lines[0].ends_with(" sweep=1"), "{}", sink.lines[0]);
        assert!(rover.heading().is_sweeping());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut config = RoverConfig::default();
        config.drive.pulse_period_ms = 0;
        config.scan.sweep_min_deg = 150;
        config.scan.sweep_max_deg = 30;
        let (mut rover, mut sink) = rover_with(config);
        assert_eq!(rover.config(), &RoverConfig::default());

        rover.tick(0, b"AL\n", &mut sink);
        run(&mut rover, &mut sink, 10, 300);
        assert_eq!(rover.state().mode(), MotionMode::ArcLeft);
    }
}
