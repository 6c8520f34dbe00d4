use regex::Regex;
use serde::Serialize;

use super::compile;

/// A day cell that produced one workout or, for compound cells, two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SplitOutcome<T> {
    Single(T),
    Split(T, T),
}

impl<T> SplitOutcome<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            SplitOutcome::Single(workout) => vec![workout],
            SplitOutcome::Split(first, second) => vec![first, second],
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, SplitOutcome::Split(..))
    }
}

/// How a compound cell's text divides into clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clauses<'t> {
    Whole,
    Pair(&'t str, &'t str),
    /// More than two matchable clauses; the cell stays whole.
    Ambiguous(usize),
}

/// Connectives tried from strongest to weakest.
const CONNECTIVES: [&str; 3] = [r"(?i)\s+and\s+", r"\s*&\s*", r"\s*\+\s*"];

pub struct WorkoutSplitter {
    connectives: Vec<Regex>,
}

impl Default for WorkoutSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkoutSplitter {
    pub fn new() -> Self {
        Self {
            connectives: CONNECTIVES.iter().map(|pattern| compile(pattern)).collect(),
        }
    }

    /// Split `text` on the first connective whose clauses are each a
    /// workout on their own. `matchable` decides that per clause.
    pub fn clauses<'t>(&self, text: &'t str, matchable: impl Fn(&str) -> bool) -> Clauses<'t> {
        for connective in &self.connectives {
            let parts: Vec<&str> = connective
                .split(text)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();

            match parts.len() {
                0 | 1 => continue,
                2 => {
                    if matchable(parts[0]) && matchable(parts[1]) {
                        return Clauses::Pair(parts[0], parts[1]);
                    }
                }
                count => {
                    let plausible = parts.iter().filter(|&&part| matchable(part)).count();
                    if plausible > 2 || (plausible == 2 && count > 2) {
                        return Clauses::Ambiguous(count);
                    }
                }
            }
        }

        Clauses::Whole
    }
}
