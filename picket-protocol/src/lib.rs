//! Host link protocol for the Picket rover controller
//!
//! This crate defines the serial protocol between the rover controller
//! and its supervising host. The link is line-oriented ASCII at 115200
//! baud, one command or report per line.
//!
//! # Protocol Overview
//!
//! ```text
//! host → rover   F160\n  S\r\n  P45\n  T60\n  Q\n  HB\n  (case-insensitive)
//! rover → host   OK F160  STAT mode=FF spd=160 ...  DIST cm=42.5  EVT stop=safety
//! ```
//!
//! The rover never trusts the host to stay alive: commands are
//! accepted as intents and the controller keeps its own safety
//! overrides. The [`nav`] module describes what a host policy must
//! promise in return.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod nav;
pub mod reply;

pub use command::{Command, DriveKind, Duty, ParseError, Tier};
pub use line::{Line, LineBuffer, MAX_LINE_LEN};
pub use reply::{OutLine, Reply, StatusLine, StopReason, OUT_LINE_LEN};
