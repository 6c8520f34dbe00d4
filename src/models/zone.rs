use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ParseError, ParseResult};

/// Discrete intensity bucket, Z1 (recovery) through Z6 (sprint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
    Z6,
}

impl ZoneId {
    pub const ALL: [ZoneId; 6] = [
        ZoneId::Z1,
        ZoneId::Z2,
        ZoneId::Z3,
        ZoneId::Z4,
        ZoneId::Z5,
        ZoneId::Z6,
    ];

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(number: u32) -> ParseResult<Self> {
        match number {
            1..=6 => Ok(Self::ALL[(number - 1) as usize]),
            _ => Err(ParseError::UnknownZone(format!("Z{}", number))),
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z{}", self.number())
    }
}

impl FromStr for ZoneId {
    type Err = ParseError;

    /// Accepts "Z3", "z3" or a bare "3".
    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        let trimmed = identifier.trim();
        let digits = trimmed
            .strip_prefix('Z')
            .or_else(|| trimmed.strip_prefix('z'))
            .unwrap_or(trimmed);

        digits
            .parse::<u32>()
            .map_err(|_| ParseError::UnknownZone(trimmed.to_string()))
            .and_then(ZoneId::from_number)
    }
}

/// A zone with its display label and RPE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub id: ZoneId,
    pub label: &'static str,
    pub rpe: u8,
}

/// Fixed zone -> (label, RPE) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTable {
    zones: [Zone; 6],
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ZoneTable {
    pub fn standard() -> Self {
        Self {
            zones: [
                Zone { id: ZoneId::Z1, label: "Recovery", rpe: 1 },
                Zone { id: ZoneId::Z2, label: "Easy", rpe: 3 },
                Zone { id: ZoneId::Z3, label: "Tempo", rpe: 5 },
                Zone { id: ZoneId::Z4, label: "Threshold", rpe: 7 },
                Zone { id: ZoneId::Z5, label: "VO2 Max", rpe: 9 },
                Zone { id: ZoneId::Z6, label: "Sprint", rpe: 10 },
            ],
        }
    }

    /// Look up a zone by identifier. Anything outside Z1-Z6 is a hard error.
    pub fn resolve(&self, identifier: &str) -> ParseResult<&Zone> {
        let id: ZoneId = identifier.parse()?;
        Ok(self.get(id))
    }

    pub fn get(&self, id: ZoneId) -> &Zone {
        &self.zones[(id.number() - 1) as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }
}

/// Resolved intensity target for a block of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneSpec {
    Single { zone: ZoneId },
    /// Progression across repetitions: the first half at `from`, the rest at `to`.
    Range { from: ZoneId, to: ZoneId },
    Keyword { keyword: String, zone: ZoneId },
}

impl ZoneSpec {
    pub fn single(zone: ZoneId) -> Self {
        ZoneSpec::Single { zone }
    }

    /// The zone the spec starts at.
    pub fn primary(&self) -> ZoneId {
        match self {
            ZoneSpec::Single { zone } | ZoneSpec::Keyword { zone, .. } => *zone,
            ZoneSpec::Range { from, .. } => *from,
        }
    }

    /// Zone for repetition `rep` (0-based) out of `reps`.
    ///
    /// Odd counts put the extra repetition in the lower zone.
    pub fn zone_for_rep(&self, rep: u32, reps: u32) -> ZoneId {
        match self {
            ZoneSpec::Range { from, to } => {
                let lower_reps = reps - reps / 2;
                if rep < lower_reps {
                    *from
                } else {
                    *to
                }
            }
            other => other.primary(),
        }
    }
}
