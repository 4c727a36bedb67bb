//! Motion modes and what each asks of the two drive sides

use picket_protocol::Tier;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current drive intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionMode {
    #[default]
    Stop,
    ForwardFast,
    ForwardSlow,
    BackSlow,
    ArcLeft,
    ArcRight,
    SpinLeft,
    SpinRight,
}

/// Which side of the chassis a channel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

/// Direction requested for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideDirection {
    Idle,
    Forward,
    Reverse,
}

/// Direction and speed tier for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SideIntent {
    pub direction: SideDirection,
    pub tier: Tier,
}

impl SideIntent {
    const IDLE: Self = Self {
        direction: SideDirection::Idle,
        tier: Tier::Slow,
    };

    const fn new(direction: SideDirection, tier: Tier) -> Self {
        Self { direction, tier }
    }
}

/// Per-side intents for a mode plus the tier of the faster (outer) side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrivePlan {
    pub left: SideIntent,
    pub right: SideIntent,
    pub outer: Tier,
}

impl DrivePlan {
    pub fn side(&self, side: Side) -> SideIntent {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

impl MotionMode {
    /// Short code used in `STAT` lines
    pub fn code(&self) -> &'static str {
        match self {
            MotionMode::Stop => "S",
            MotionMode::ForwardFast => "FF",
            MotionMode::ForwardSlow => "FS",
            MotionMode::BackSlow => "BS",
            MotionMode::ArcLeft => "AL",
            MotionMode::ArcRight => "AR",
            MotionMode::SpinLeft => "SL",
            MotionMode::SpinRight => "SR",
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, MotionMode::Stop)
    }

    /// Map this mode onto per-side intents
    ///
    /// Arcs run the inner side SLOW and the outer side FAST. Spins run
    /// the sides in opposite directions, both SLOW.
    pub fn plan(&self) -> DrivePlan {
        use SideDirection::{Forward, Reverse};

        let (left, right, outer) = match self {
            MotionMode::Stop => (SideIntent::IDLE, SideIntent::IDLE, Tier::Slow),
            MotionMode::ForwardFast => (
                SideIntent::new(Forward, Tier::Fast),
                SideIntent::new(Forward, Tier::Fast),
                Tier::Fast,
            ),
            MotionMode::ForwardSlow => (
                SideIntent::new(Forward, Tier::Slow),
                SideIntent::new(Forward, Tier::Slow),
                Tier::Slow,
            ),
            MotionMode::BackSlow => (
                SideIntent::new(Reverse, Tier::Slow),
                SideIntent::new(Reverse, Tier::Slow),
                Tier::Slow,
            ),
            MotionMode::ArcLeft => (
                SideIntent::new(Forward, Tier::Slow),
                SideIntent::new(Forward, Tier::Fast),
                Tier::Fast,
            ),
            MotionMode::ArcRight => (
                SideIntent::new(Forward, Tier::Fast),
                SideIntent::new(Forward, Tier::Slow),
                Tier::Fast,
            ),
            MotionMode::SpinLeft => (
                SideIntent::new(Reverse, Tier::Slow),
                SideIntent::new(Forward, Tier::Slow),
                Tier::Slow,
            ),
            MotionMode::SpinRight => (
                SideIntent::new(Forward, Tier::Slow),
                SideIntent::new(Reverse, Tier::Slow),
                Tier::Slow,
            ),
        };

        DrivePlan { left, right, outer }
    }
}
