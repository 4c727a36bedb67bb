//! Command dispatch
//!
//! A command is applied in two steps: [`Rover::apply`] changes state and
//! returns the command in its resolved canonical form (defaults filled
//! in), then the replies go out: the `OK` echo first, followed by any
//! report the command asks for.

use picket_protocol::{Command, DriveKind, Duty, Reply, StopReason};

use super::rover::{emit, Rover};
use crate::state::MotionMode;
use crate::traits::{DirectionRegister, EchoSensor, EnableGate, LineSink, ServoOutput};

impl<R, G, S, E> Rover<R, G, S, E>
where
    R: DirectionRegister,
    G: EnableGate,
    S: ServoOutput,
    E: EchoSensor,
{
    /// Parse and execute one complete inbound line
    pub(super) fn dispatch_line<K: LineSink>(&mut self, line: &str, now_ms: u32, sink: &mut K) {
        match Command::parse(line) {
            Ok(cmd) => self.execute(&cmd, now_ms, sink),
            Err(kind) => {
                debug!("Rejected line ({})", kind.token());
                emit(sink, Reply::Error { kind, text: line.trim() });
            }
        }
    }

    /// Execute a parsed command and send its replies
    pub fn execute<K: LineSink>(&mut self, cmd: &Command, now_ms: u32, sink: &mut K) {
        if cmd.refreshes_link() {
            self.watchdog.note_heartbeat(now_ms);
        }

        let resolved = self.apply(cmd, now_ms);
        if resolved.wants_ack() {
            emit(sink, Reply::Ack(&resolved));
        }

        match resolved {
            Command::Stop => {
                emit(sink, Reply::Stopped(StopReason::Command));
                emit(sink, Reply::Status(self.status()));
            }
            Command::Threshold(_) => emit(sink, Reply::Status(self.status())),
            Command::Query => {
                emit(sink, Reply::Status(self.status()));
                let reading = self.take_reading(now_ms);
                emit(sink, Reply::Distance(reading));
            }
            Command::Distance => {
                let reading = self.take_reading(now_ms);
                emit(sink, Reply::Distance(reading));
            }
            Command::Help => emit(sink, Reply::Help),
            _ => {}
        }
    }

    /// Change state for `cmd`, returning its resolved form
    fn apply(&mut self, cmd: &Command, now_ms: u32) -> Command {
        match *cmd {
            Command::Drive { kind, duty } => {
                let drive = &self.config.drive;
                let value = duty.resolve(drive.fast_duty, drive.slow_duty, drive.default_duty);
                let mode = match kind {
                    DriveKind::Forward if value > drive.slow_duty => MotionMode::ForwardFast,
                    DriveKind::Forward => MotionMode::ForwardSlow,
                    DriveKind::Back => MotionMode::BackSlow,
                    DriveKind::SpinLeft => MotionMode::SpinLeft,
                    DriveKind::SpinRight => MotionMode::SpinRight,
                    DriveKind::ArcLeft => MotionMode::ArcLeft,
                    DriveKind::ArcRight => MotionMode::ArcRight,
                };

                self.range.reset_debounce();
                self.state.set_mode(mode, Some(value), now_ms);
                Command::Drive {
                    kind,
                    duty: Duty::Value(value),
                }
            }
            Command::Stop => {
                self.state.stop(StopReason::Command, now_ms);
                Command::Stop
            }
            Command::Heading(deg) => {
                let deg = deg.unwrap_or(self.config.scan.neutral_deg);
                self.state.sweep_enabled = false;
                self.heading.set_target(deg, now_ms);
                Command::Heading(Some(self.heading.target()))
            }
            Command::Threshold(cm) => {
                self.state.threshold_cm = cm;
                self.range.reset_debounce();
                Command::Threshold(cm)
            }
            Command::Verbose(on) => {
                self.state.verbose = on;
                Command::Verbose(on)
            }
            Command::Sweep(on) => {
                self.state.sweep_enabled = on;
                Command::Sweep(on)
            }
            other => other,
        }
    }

    fn take_reading(&mut self, now_ms: u32) -> Option<u16> {
        let settled = self.heading.is_settled(now_ms);
        self.range.measure(now_ms, settled)
    }
}
