//! Inbound command grammar.
//!
//! Every accepted line parses into exactly one canonical [`Command`].
//! The legacy dialect (`STOP`, `F,FAST`, `SERVO,90`, ...) is resolved
//! here by a small alias table, so the controller only ever handles the
//! canonical set.
//!
//! Numeric arguments are clamped to their valid range rather than
//! rejected. A non-numeric argument is a [`ParseError::BadArgument`].

use core::fmt;

use heapless::String;

use crate::line::MAX_LINE_LEN;

/// Largest accepted heading angle in degrees
pub const MAX_ANGLE_DEG: u8 = 180;

/// Largest accepted safety threshold in centimetres
pub const MAX_THRESHOLD_CM: u16 = 399;

/// Errors produced while turning a line into a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Leading token not recognised
    Unknown,
    /// Token recognised but its argument is malformed or missing
    BadArgument,
    /// Line exceeded the input buffer
    Overflow,
}

impl ParseError {
    /// Wire token used in `ERR` replies
    pub fn token(&self) -> &'static str {
        match self {
            ParseError::Unknown => "unknown",
            ParseError::BadArgument => "badarg",
            ParseError::Overflow => "overflow",
        }
    }
}

/// Named speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tier {
    Fast,
    Slow,
}

/// Requested drive duty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duty {
    /// No duty given; controller default applies
    Default,
    /// Named tier from the legacy dialect
    Tier(Tier),
    /// Explicit duty, already clamped to 0-255
    Value(u8),
}

impl Duty {
    /// Resolve to a concrete duty given the configured tier values
    pub fn resolve(self, fast: u8, slow: u8, default: u8) -> u8 {
        match self {
            Duty::Default => default,
            Duty::Tier(Tier::Fast) => fast,
            Duty::Tier(Tier::Slow) => slow,
            Duty::Value(v) => v,
        }
    }
}

/// Drive command family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveKind {
    Forward,
    Back,
    SpinLeft,
    SpinRight,
    ArcLeft,
    ArcRight,
}

impl DriveKind {
    /// Canonical command token
    pub fn token(&self) -> &'static str {
        match self {
            DriveKind::Forward => "F",
            DriveKind::Back => "B",
            DriveKind::SpinLeft => "L",
            DriveKind::SpinRight => "R",
            DriveKind::ArcLeft => "AL",
            DriveKind::ArcRight => "AR",
        }
    }
}

/// Canonical inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `F`/`B`/`L`/`R`/`AL`/`AR` with optional duty
    Drive { kind: DriveKind, duty: Duty },
    /// `S`
    Stop,
    /// `P<angle>`; `None` means the neutral heading
    Heading(Option<u8>),
    /// `T<cm>`; 0 disables the safety stop
    Threshold(u16),
    /// `Q`: status plus one reading
    Query,
    /// `D`: one reading only
    Distance,
    /// `H`
    Help,
    /// `HB`
    Heartbeat,
    /// `V0`/`V1`: periodic telemetry
    Verbose(bool),
    /// `W0`/`W1`: continuous sweep
    Sweep(bool),
}

impl Command {
    /// Parse one line (terminators already stripped)
    ///
    /// Surrounding whitespace is ignored and matching is case-insensitive.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let upper = normalize(line);
        let line = upper.as_str();

        if line.is_empty() {
            return Err(ParseError::Unknown);
        }

        if let Some(cmd) = parse_alias(line)? {
            return Ok(cmd);
        }

        // Two-letter tokens first so "HB" never reads as "H" + "B"
        if let Some(arg) = line.strip_prefix("HB") {
            return no_arg(arg, Command::Heartbeat);
        }
        if let Some(arg) = line.strip_prefix("AL") {
            return drive(DriveKind::ArcLeft, arg);
        }
        if let Some(arg) = line.strip_prefix("AR") {
            return drive(DriveKind::ArcRight, arg);
        }

        let mut chars = line.chars();
        let head = chars.next().ok_or(ParseError::Unknown)?;
        let arg = chars.as_str();

        match head {
            'F' => drive(DriveKind::Forward, arg),
            'B' => drive(DriveKind::Back, arg),
            'L' => drive(DriveKind::SpinLeft, arg),
            'R' => drive(DriveKind::SpinRight, arg),
            'S' => no_arg(arg, Command::Stop),
            'P' => {
                let arg = arg.trim();
                if arg.is_empty() {
                    Ok(Command::Heading(None))
                } else {
                    let deg = parse_clamped(arg, MAX_ANGLE_DEG as i32)?;
                    Ok(Command::Heading(Some(deg as u8)))
                }
            }
            'T' => {
                let arg = arg.trim();
                if arg.is_empty() {
                    return Err(ParseError::BadArgument);
                }
                let cm = parse_clamped(arg, MAX_THRESHOLD_CM as i32)?;
                Ok(Command::Threshold(cm as u16))
            }
            'Q' => no_arg(arg, Command::Query),
            'D' => no_arg(arg, Command::Distance),
            'H' => no_arg(arg, Command::Help),
            'V' => parse_flag(arg).map(Command::Verbose),
            'W' => parse_flag(arg).map(Command::Sweep),
            _ => Err(ParseError::Unknown),
        }
    }

    /// Queries report state without changing it
    pub fn is_query(&self) -> bool {
        matches!(self, Command::Query | Command::Distance | Command::Help)
    }

    /// Whether this command counts as a sign of host liveness
    ///
    /// Heartbeats and every non-query command refresh the watchdog.
    pub fn refreshes_link(&self) -> bool {
        !self.is_query()
    }

    /// Whether the controller acknowledges this command with `OK`
    pub fn wants_ack(&self) -> bool {
        !self.is_query() && !matches!(self, Command::Heartbeat)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Drive { kind, duty } => {
                f.write_str(kind.token())?;
                match duty {
                    Duty::Default => Ok(()),
                    Duty::Tier(Tier::Fast) => f.write_str(",FAST"),
                    Duty::Tier(Tier::Slow) => f.write_str(",SLOW"),
                    Duty::Value(v) => write!(f, "{}", v),
                }
            }
            Command::Stop => f.write_str("S"),
            Command::Heading(None) => f.write_str("P"),
            Command::Heading(Some(deg)) => write!(f, "P{}", deg),
            Command::Threshold(cm) => write!(f, "T{}", cm),
            Command::Query => f.write_str("Q"),
            Command::Distance => f.write_str("D"),
            Command::Help => f.write_str("H"),
            Command::Heartbeat => f.write_str("HB"),
            Command::Verbose(on) => write!(f, "V{}", *on as u8),
            Command::Sweep(on) => write!(f, "W{}", *on as u8),
        }
    }
}

/// Trim and upper-case a raw line
fn normalize(line: &str) -> String<MAX_LINE_LEN> {
    let mut out = String::new();
    for ch in line.trim().chars() {
        // Input lines are bounded by the line buffer; longer text is cut
        if out.push(ch.to_ascii_uppercase()).is_err() {
            break;
        }
    }
    out
}

/// Legacy dialect, resolved onto canonical commands
fn parse_alias(line: &str) -> Result<Option<Command>, ParseError> {
    let cmd = match line {
        "STOP" => Command::Stop,
        "PING" => Command::Distance,
        "STAT?" => Command::Query,
        "SPINL" => Command::Drive {
            kind: DriveKind::SpinLeft,
            duty: Duty::Default,
        },
        "SPINR" => Command::Drive {
            kind: DriveKind::SpinRight,
            duty: Duty::Default,
        },
        _ => {
            let Some((head, arg)) = line.split_once(',') else {
                return Ok(None);
            };
            let arg = arg.trim();
            match head.trim() {
                "F" => tier_drive(DriveKind::Forward, arg)?,
                "B" => tier_drive(DriveKind::Back, arg)?,
                "L" => tier_drive(DriveKind::ArcLeft, arg)?,
                "R" => tier_drive(DriveKind::ArcRight, arg)?,
                "SERVO" => {
                    let deg = parse_clamped(arg, MAX_ANGLE_DEG as i32)?;
                    Command::Heading(Some(deg as u8))
                }
                "VERBOSE" => Command::Verbose(on_off(arg)?),
                "SWEEP" => Command::Sweep(on_off(arg)?),
                _ => return Err(ParseError::Unknown),
            }
        }
    };
    Ok(Some(cmd))
}

fn tier_drive(kind: DriveKind, arg: &str) -> Result<Command, ParseError> {
    let tier = match arg {
        "FAST" => Tier::Fast,
        "SLOW" => Tier::Slow,
        _ => return Err(ParseError::BadArgument),
    };
    Ok(Command::Drive {
        kind,
        duty: Duty::Tier(tier),
    })
}

fn on_off(arg: &str) -> Result<bool, ParseError> {
    match arg {
        "ON" => Ok(true),
        "OFF" => Ok(false),
        _ => Err(ParseError::BadArgument),
    }
}

fn drive(kind: DriveKind, arg: &str) -> Result<Command, ParseError> {
    let arg = arg.trim();
    let duty = if arg.is_empty() {
        Duty::Default
    } else {
        Duty::Value(parse_clamped(arg, u8::MAX as i32)? as u8)
    };
    Ok(Command::Drive { kind, duty })
}

fn no_arg(arg: &str, cmd: Command) -> Result<Command, ParseError> {
    if arg.trim().is_empty() {
        Ok(cmd)
    } else {
        Err(ParseError::Unknown)
    }
}

fn parse_flag(arg: &str) -> Result<bool, ParseError> {
    match arg.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ParseError::BadArgument),
    }
}

/// Parse a signed decimal integer and clamp it into `0..=max`
///
/// Overlong digit strings saturate instead of failing.
fn parse_clamped(arg: &str, max: i32) -> Result<i32, ParseError> {
    let (negative, digits) = match arg.as_bytes().first() {
        Some(b'-') => (true, &arg[1..]),
        Some(b'+') => (false, &arg[1..]),
        _ => (false, arg),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::BadArgument);
    }

    let magnitude = digits
        .bytes()
        .fold(0i32, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i32));

    let value = if negative { -magnitude } else { magnitude };
    Ok(value.clamp(0, max))
}
