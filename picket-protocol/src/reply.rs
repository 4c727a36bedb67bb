//! Outbound lines from the rover.
//!
//! Every report is a single ASCII line rendered into a fixed-capacity
//! buffer. Rendering never fails: output that does not fit is cut at the
//! buffer boundary.

use core::fmt::Write;

use heapless::String;

use crate::command::{Command, ParseError};

/// Capacity of a rendered outbound line (terminator not included)
pub const OUT_LINE_LEN: usize = 96;

/// A rendered outbound line
pub type OutLine = String<OUT_LINE_LEN>;

/// Help text listing the canonical command set
pub const HELP_TEXT: &str =
    "HELP F/B/L/R/AL/AR<duty> S P<deg> T<cm> Q D V<0|1> W<0|1> HB H";

/// Why the rover stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Host asked for it
    Command,
    /// Obstacle within the safety threshold
    Safety,
    /// Host link went quiet
    Watchdog,
}

impl StopReason {
    /// Wire token used in `EVT` lines
    pub fn token(&self) -> &'static str {
        match self {
            StopReason::Command => "command",
            StopReason::Safety => "safety",
            StopReason::Watchdog => "watchdog",
        }
    }
}

/// Fields of a `STAT` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusLine {
    /// Short motion mode code (`S`, `FF`, `FS`, ...)
    pub mode: &'static str,
    /// Effective drive duty
    pub duty: u8,
    /// Safety threshold (0 = disabled)
    pub threshold_cm: u16,
    /// Last valid distance in tenths of a centimetre
    pub last_cm_x10: Option<u16>,
    /// Continuous sweep engaged (enabled and moving)
    pub sweep: bool,
}

/// An outbound report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    /// Boot banner
    Boot {
        version: &'a str,
        heartbeat_timeout_ms: u32,
        bench: bool,
    },
    /// `STAT` snapshot
    Status(StatusLine),
    /// `DIST` reading, tenths of a centimetre
    Distance(Option<u16>),
    /// `EVT stop=<reason>`
    Stopped(StopReason),
    /// `OK <command>` acknowledgement
    Ack(&'a Command),
    /// `ERR <kind> <text>`
    Error { kind: ParseError, text: &'a str },
    /// `HELP ...`
    Help,
}

impl Reply<'_> {
    /// Render this reply as a single line
    pub fn render(&self) -> OutLine {
        let mut out = OutLine::new();
        // Truncating writer never reports an error
        let _ = self.write_to(&mut Truncating(&mut out));
        out
    }

    fn write_to(&self, out: &mut Truncating<'_>) -> core::fmt::Result {
        match self {
            Reply::Boot {
                version,
                heartbeat_timeout_ms,
                bench,
            } => {
                write!(out, "BOOT picket {} hb_ms={}", version, heartbeat_timeout_ms)?;
                if *bench {
                    out.write_str(" +BENCH")?;
                }
                Ok(())
            }
            Reply::Status(s) => {
                write!(
                    out,
                    "STAT mode={} spd={} thresh={} last_cm=",
                    s.mode, s.duty, s.threshold_cm
                )?;
                match s.last_cm_x10 {
                    Some(x10) => write!(out, "{}", x10 / 10)?,
                    None => out.write_str("-1")?,
                }
                write!(out, " sweep={}", s.sweep as u8)
            }
            Reply::Distance(Some(x10)) => write!(out, "DIST cm={}.{}", x10 / 10, x10 % 10),
            Reply::Distance(None) => out.write_str("DIST cm=NA"),
            Reply::Stopped(reason) => write!(out, "EVT stop={}", reason.token()),
            Reply::Ack(cmd) => write!(out, "OK {}", cmd),
            Reply::Error { kind, text } if text.is_empty() => {
                write!(out, "ERR {}", kind.token())
            }
            Reply::Error { kind, text } => write!(out, "ERR {} {}", kind.token(), text),
            Reply::Help => out.write_str(HELP_TEXT),
        }
    }
}

/// Writer that keeps whatever fits and silently drops the rest
struct Truncating<'a>(&'a mut OutLine);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{DriveKind, Duty};

    #[test]
    fn test_boot_banner() {
        let live = Reply::Boot {
            version: "0.1.0",
            heartbeat_timeout_ms: 600,
            bench: false,
        };
        assert_eq!(live.render().as_str(), "BOOT picket 0.1.0 hb_ms=600");

        let bench = Reply::Boot {
            version: "0.1.0",
            heartbeat_timeout_ms: 60000,
            bench: true,
        };
        assert_eq!(
            bench.render().as_str(),
            "BOOT picket 0.1.0 hb_ms=60000 +BENCH"
        );
    }

    #[test]
    fn test_status_at_boot() {
        let stat = Reply::Status(StatusLine {
            mode: "S",
            duty: 0,
            threshold_cm: 0,
            last_cm_x10: None,
            sweep: false,
        });
        assert_eq!(
            stat.render().as_str(),
            "STAT mode=S spd=0 thresh=0 last_cm=-1 sweep=0"
        );
    }

    #[test]
    fn test_status_with_reading() {
        let stat = Reply::Status(StatusLine {
            mode: "FF",
            duty: 230,
            threshold_cm: 60,
            last_cm_x10: Some(425),
            sweep: true,
        });
        assert_eq!(
            stat.render().as_str(),
            "STAT mode=FF spd=230 thresh=60 last_cm=42 sweep=1"
        );
    }

    #[test]
    fn test_distance() {
        assert_eq!(Reply::Distance(Some(425)).render().as_str(), "DIST cm=42.5");
        assert_eq!(Reply::Distance(Some(30)).render().as_str(), "DIST cm=3.0");
        assert_eq!(Reply::Distance(None).render().as_str(), "DIST cm=NA");
    }

    #[test]
    fn test_events_and_errors() {
        assert_eq!(
            Reply::Stopped(StopReason::Safety).render().as_str(),
            "EVT stop=safety"
        );
        assert_eq!(
            Reply::Error {
                kind: ParseError::Unknown,
                text: "ZZZ"
            }
            .render()
            .as_str(),
            "ERR unknown ZZZ"
        );
    }

    #[test]
    fn test_ack() {
        let cmd = Command::Drive {
            kind: DriveKind::ArcRight,
            duty: Duty::Value(150),
        };
        assert_eq!(Reply::Ack(&cmd).render().as_str(), "OK AR150");
    }

    #[test]
    fn test_long_error_truncated() {
        let text = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX\
                    XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
        let line = Reply::Error {
            kind: ParseError::Unknown,
            text,
        }
        .render();
        assert_eq!(line.len(), OUT_LINE_LEN);
        assert!(line.starts_with("ERR unknown XXXX"));
    }
}
