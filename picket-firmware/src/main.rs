//! Picket - Rover Controller Firmware
//!
//! Main firmware binary for an RP2040 driving a four-wheeled rover
//! through an L293D motor shield, with a servo-mounted ultrasonic ranger
//! and a line-oriented host link on UART0.
//!
//! A picket is the sentry posted ahead of the column: the rover keeps its
//! own watch for obstacles and for a host that has gone quiet.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use picket_core::config::{parse_config, RoverConfig};
use picket_core::motion::ChannelMap;
use picket_core::scheduler::{Rover, RoverHardware};
use picket_drivers::{Hcsr04, HobbyServo, PwmGate, ServoTiming, ShiftRegister595, SwitchGate};
use picket_hal_rp2040::{
    gate_config, servo_config, PwmOutput, SliceChannel, UptimeMicros, PINS, UART_BAUD,
};

use crate::hardware::BoardGate;

/// Embedded configuration (compiled into firmware)
/// Edit rover.toml and rebuild to retune
const EMBEDDED_CONFIG: &str = include_str!("../rover.toml");

mod channels;
mod hardware;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Picket firmware starting...");

    let p = embassy_rp::init(Default::default());

    let config = load_config();
    let capabilities = PINS.capabilities();
    let binary_gate = capabilities.binary_gate(&config.platform);

    // Host link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("Host UART ready at {} baud", UART_BAUD);

    // Direction register: SER GPIO8, SRCLK GPIO4, RCLK GPIO12
    let register = ShiftRegister595::new(
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_12, Level::Low),
    );

    // Motor gate on the shield's /OE (GPIO7, slice 3 B), held off until boot
    let gate = if binary_gate {
        BoardGate::Switch(SwitchGate::active_low(Output::new(p.PIN_7, Level::High)))
    } else {
        let cfg = gate_config();
        let pwm = Pwm::new_output_b(p.PWM_SLICE3, p.PIN_7, cfg.clone());
        BoardGate::Pwm(PwmGate::active_low(SliceChannel::new(pwm, cfg, PwmOutput::B)))
    };

    // Heading servo on GPIO10 (slice 5 A)
    let servo_cfg = servo_config(clk_sys_freq());
    let servo_pwm = Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, servo_cfg.clone());
    let servo = HobbyServo::new(
        SliceChannel::new(servo_pwm, servo_cfg, PwmOutput::A),
        ServoTiming::default(),
    );

    // HC-SR04: trigger GPIO26, echo GPIO27
    let sensor = Hcsr04::new(
        Output::new(p.PIN_26, Level::Low),
        Input::new(p.PIN_27, Pull::Down),
        Delay,
        UptimeMicros,
    );

    let rover = Rover::new(
        config,
        capabilities,
        ChannelMap::default(),
        RoverHardware {
            register,
            gate,
            servo,
            sensor,
        },
        tasks::control::now_ms(),
    );

    spawner.spawn(tasks::uart_rx_task(rx)).unwrap();
    spawner.spawn(tasks::uart_tx_task(tx)).unwrap();
    spawner.spawn(tasks::control_task(rover)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded rover.toml, falling back to built-in defaults
fn load_config() -> RoverConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded rover.toml");
            config
        }
        Err(e) => {
            error!("rover.toml rejected ({:?}), using defaults", e);
            RoverConfig::default()
        }
    }
}
