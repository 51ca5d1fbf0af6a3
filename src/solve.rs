use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One manual time penalty unit (a WCA-style "+2").
pub const PENALTY_UNIT_MS: u64 = 2000;

/// Manual penalty cycling wraps after 8 units (0..=8).
pub const PENALTY_UNIT_WRAP: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display)]
pub enum PuzzleType {
    #[serde(rename = "2x2")]
    #[value(name = "2x2")]
    #[strum(serialize = "2x2")]
    TwoByTwo,
    #[serde(rename = "3x3")]
    #[value(name = "3x3")]
    #[strum(serialize = "3x3")]
    ThreeByThree,
    #[serde(rename = "4x4")]
    #[value(name = "4x4")]
    #[strum(serialize = "4x4")]
    FourByFour,
    #[serde(rename = "5x5")]
    #[value(name = "5x5")]
    #[strum(serialize = "5x5")]
    FiveByFive,
    #[serde(rename = "pyraminx")]
    #[value(name = "pyraminx")]
    #[strum(serialize = "pyraminx")]
    Pyraminx,
}

impl PuzzleType {
    /// Long-form name shown in the header.
    pub fn label(&self) -> &'static str {
        match self {
            PuzzleType::TwoByTwo => "2x2x2",
            PuzzleType::ThreeByThree => "3x3x3",
            PuzzleType::FourByFour => "4x4x4",
            PuzzleType::FiveByFive => "5x5x5",
            PuzzleType::Pyraminx => "Pyraminx",
        }
    }
}

/// A single recorded solve attempt.
///
/// Immutable once created except for the penalty fields, which the
/// solve-list mutators adjust after the fact. `raw_time_ms` is `None`
/// only for an automatic DNF from inspection overrun, where no time
/// was ever measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub id: u64,
    pub raw_time_ms: Option<u64>,
    pub puzzle: PuzzleType,
    pub scramble: String,
    pub penalty_units: u8,
    pub is_dnf: bool,
    pub recorded_at: DateTime<Local>,
}

impl Solve {
    pub fn new(
        id: u64,
        puzzle: PuzzleType,
        scramble: String,
        raw_time_ms: u64,
        penalty_units: u8,
    ) -> Self {
        Self {
            id,
            raw_time_ms: Some(raw_time_ms),
            puzzle,
            scramble,
            penalty_units,
            is_dnf: false,
            recorded_at: Local::now(),
        }
    }

    /// An automatic DNF with no measured time (inspection ran out).
    pub fn dnf(id: u64, puzzle: PuzzleType, scramble: String) -> Self {
        Self {
            id,
            raw_time_ms: None,
            puzzle,
            scramble,
            penalty_units: 0,
            is_dnf: true,
            recorded_at: Local::now(),
        }
    }

    /// Raw time plus penalties, or infinite for a DNF.
    pub fn adjusted_time_ms(&self) -> f64 {
        match (self.is_dnf, self.raw_time_ms) {
            (true, _) | (false, None) => f64::INFINITY,
            (false, Some(raw)) => (raw + u64::from(self.penalty_units) * PENALTY_UNIT_MS) as f64,
        }
    }

    pub fn has_measured_time(&self) -> bool {
        self.raw_time_ms.is_some()
    }

    /// Advance the manual +2 penalty, wrapping back to zero after 8
    /// units. No-op on a DNF (DNF supersedes time penalties).
    pub fn cycle_penalty(&mut self) {
        if self.is_dnf {
            return;
        }
        self.penalty_units = (self.penalty_units + 1) % PENALTY_UNIT_WRAP;
    }

    /// Flip the DNF flag. Turning DNF on clears any penalty units and
    /// does not restore them later; turning it off is refused when the
    /// solve has no measured time to fall back to.
    pub fn toggle_dnf(&mut self) {
        if self.is_dnf && !self.has_measured_time() {
            return;
        }
        self.is_dnf = !self.is_dnf;
        if self.is_dnf {
            self.penalty_units = 0;
        }
    }
}
