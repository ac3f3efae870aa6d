use serde::{Deserialize, Serialize};
use std::fmt;

/// The side of a directional alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Identifies one of the confluence rules. The declaration order is the
/// evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    FvgFlip,
    TriangleSync,
    StochMacdScalp,
    TrendRider,
}

impl StrategyId {
    pub const ALL: [StrategyId; 4] = [
        StrategyId::FvgFlip,
        StrategyId::TriangleSync,
        StrategyId::StochMacdScalp,
        StrategyId::TrendRider,
    ];

    /// The label used in alert text.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyId::FvgFlip => "S1: FVG FLIP",
            StrategyId::TriangleSync => "S2: TRIANGLE SYNC",
            StrategyId::StochMacdScalp => "S3: STOCH-MACD SCALP",
            StrategyId::TrendRider => "S4: TREND RIDER",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
