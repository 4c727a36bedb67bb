//! Embassy tasks

pub mod control;
pub mod uart_rx;
pub mod uart_tx;

pub use control::control_task;
pub use uart_rx::uart_rx_task;
pub use uart_tx::uart_tx_task;
