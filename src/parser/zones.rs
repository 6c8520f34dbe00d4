use regex::Regex;

use super::compile;
use super::grammar::{Segment, ZoneHint};
use crate::config::ParserConfig;
use crate::errors::ParseResult;
use crate::models::{ZoneId, ZoneSpec};

/// Pattern for numeric zone tokens: "Z3", "Z3-Z4", "zone 2", "Zones 3-4".
pub const ZONE_TOKEN: &str = r"z(?:ones?)?\s*\d+(?:\s*-\s*(?:z(?:ones?)?\s*)?\d+)?";

/// Turns zone tokens and intensity keywords into a `ZoneSpec`.
pub struct ZoneResolver<'a> {
    config: &'a ParserConfig,
    numeric_pattern: Regex,
    keyword_patterns: Vec<(Regex, &'a str, ZoneId)>,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        let keyword_patterns = config
            .keyword_zones
            .iter()
            .map(|entry| {
                let words: Vec<String> = entry
                    .keyword
                    .split_whitespace()
                    .map(regex::escape)
                    .collect();
                let pattern = compile(&format!(r"(?i)\b{}\b", words.join(r"\s+")));
                (pattern, entry.keyword.as_str(), entry.zone)
            })
            .collect();

        Self {
            config,
            numeric_pattern: compile(
                r"(?i)^\s*z(?:ones?)?\s*(\d+)(?:\s*-\s*(?:z(?:ones?)?\s*)?(\d+))?\s*$",
            ),
            keyword_patterns,
        }
    }

    /// Resolve a numeric token or a keyword.
    ///
    /// Numeric zones outside Z1-Z6 fail; unknown keywords fall back to the
    /// configured default zone. A range always runs from the lower zone, so
    /// "Z4-Z3" reads as "Z3-Z4".
    pub fn resolve(&self, token: &str) -> ParseResult<ZoneSpec> {
        if let Some(caps) = self.numeric_pattern.captures(token) {
            let from = self.numeric_zone(&caps[1])?;
            return match caps.get(2) {
                Some(upper) => {
                    let other = self.numeric_zone(upper.as_str())?;
                    let (from, to) = (from.min(other), from.max(other));
                    if from == to {
                        Ok(ZoneSpec::single(from))
                    } else {
                        Ok(ZoneSpec::Range { from, to })
                    }
                }
                None => Ok(ZoneSpec::single(from)),
            };
        }

        let keyword = token.trim().to_lowercase();
        let zone = self.config.keyword_zone(&keyword).unwrap_or_else(|| {
            tracing::debug!(
                "Unknown intensity keyword {:?}, using {}",
                keyword,
                self.config.unknown_keyword_zone
            );
            self.config.unknown_keyword_zone
        });

        Ok(ZoneSpec::Keyword { keyword, zone })
    }

    /// Leftmost table keyword in `text`; ties go to the earlier table entry.
    pub fn keyword_in(&self, text: &str) -> Option<ZoneSpec> {
        self.keyword_patterns
            .iter()
            .filter_map(|(pattern, keyword, zone)| {
                pattern.find(text).map(|found| (found.start(), *keyword, *zone))
            })
            .min_by_key(|(start, _, _)| *start)
            .map(|(_, keyword, zone)| ZoneSpec::Keyword {
                keyword: keyword.to_string(),
                zone,
            })
    }

    /// Resolve the zone hint of every segment.
    ///
    /// Unstated repeat blocks take the nearest stated block before them, or
    /// the first stated block after them. Anything else unstated takes
    /// `context`, then `default`.
    pub fn resolve_segments(
        &self,
        segments: &[Segment<ZoneHint>],
        context: Option<&ZoneSpec>,
        default: ZoneId,
    ) -> ParseResult<Vec<Segment<ZoneSpec>>> {
        let fallback = context.cloned().unwrap_or_else(|| ZoneSpec::single(default));
        let mut inherited = segments
            .iter()
            .find_map(|segment| match segment {
                Segment::Repeat {
                    zone: ZoneHint::Stated(token),
                    ..
                } => Some(token.as_str()),
                _ => None,
            })
            .map(|token| self.resolve(token))
            .transpose()?;

        let mut resolved = Vec::with_capacity(segments.len());
        for segment in segments {
            let next = match segment {
                Segment::Repeat {
                    reps,
                    work,
                    rest,
                    zone,
                } => {
                    let zone = match zone {
                        ZoneHint::Stated(token) => {
                            let spec = self.resolve(token)?;
                            inherited = Some(spec.clone());
                            spec
                        }
                        ZoneHint::Fixed(id) => ZoneSpec::single(*id),
                        ZoneHint::Unstated => inherited.clone().unwrap_or_else(|| fallback.clone()),
                    };
                    Segment::Repeat {
                        reps: *reps,
                        work: *work,
                        rest: rest.clone(),
                        zone,
                    }
                }
                Segment::Steady {
                    quantity,
                    zone,
                    note,
                } => Segment::Steady {
                    quantity: *quantity,
                    zone: match zone {
                        ZoneHint::Stated(token) => self.resolve(token)?,
                        ZoneHint::Fixed(id) => ZoneSpec::single(*id),
                        ZoneHint::Unstated => fallback.clone(),
                    },
                    note: note.clone(),
                },
                Segment::Placeholder => Segment::Placeholder,
            };
            resolved.push(next);
        }

        Ok(resolved)
    }

    fn numeric_zone(&self, digits: &str) -> ParseResult<ZoneId> {
        Ok(self.config.zones.resolve(digits)?.id)
    }
}
