use regex::Regex;

use super::compile;
use super::grammar::{parse_work, GrammarKind, GrammarSet, MatchResult, RestSpec, Segment, ZoneHint};
use crate::config::ParserConfig;
use crate::models::{Quantity, ZoneId};

/// Implicit recovery for notes that only say "jog recovery".
const IMPLICIT_RECOVERY_SECONDS: u32 = 120;

/// Parses the free-text Session-Notes row of the extensive layout.
pub struct SessionNotesParser {
    part_separator: Regex,
    warm_up: Regex,
    cool_down: Regex,
    reps: Regex,
    minutes: Regex,
    kilometers: Regex,
    rest_line: Regex,
    implicit_rest: Regex,
    parenthesized: Regex,
    easy_zone: ZoneId,
    interval_zone: ZoneId,
}

impl SessionNotesParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            part_separator: compile(r"\s*/\s*"),
            warm_up: compile(r"(?i)\bwarm[\s-]?up\b"),
            cool_down: compile(r"(?i)\bcool[\s-]?down\b"),
            reps: compile(
                r"(?i)(?P<reps>\d+)\s*x\s*(?P<work>\d+:\d{2}|\d+(?:\.\d+)?(?:\s*(?:seconds?|secs?|s|minutes?|mins?|km|k|m)\b)?)",
            ),
            minutes: compile(r"(?i)(?P<value>\d+(?:\.\d+)?)\s*(?:minutes?|mins?)\b"),
            kilometers: compile(r"(?i)(?P<value>\d+(?:\.\d+)?)\s*km\b"),
            rest_line: compile(
                r"(?i)^(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>minutes?|mins?|m|seconds?|secs?|s)?\s*(?:jog|walk|recovery|rest|rec)\b",
            ),
            implicit_rest: compile(r"(?i)\b(?:jog\s+recovery|steady\s+jog)\b"),
            parenthesized: compile(r"\([^)]*\)"),
            easy_zone: config.keyword_zone("easy").unwrap_or(config.unknown_keyword_zone),
            interval_zone: config.interval_zone,
        }
    }

    /// Whether `notes` describe the same session as `activity`.
    pub fn applies_to(&self, notes: &str, activity: &str, purpose: Option<&str>) -> bool {
        let notes = notes.to_lowercase();
        let activity_lower = activity.to_lowercase();
        let purpose = purpose.map(str::to_lowercase).unwrap_or_default();

        if notes.trim().is_empty()
            || activity_lower.contains("recovery")
            || activity_lower.contains("hill")
        {
            return false;
        }

        let is_long_run = activity_lower.contains("long") || activity_lower.contains("inc.");
        if notes.contains("interval") {
            let is_interval = (activity_lower.contains('x') && activity.contains(':'))
                || purpose.contains("vo2max");
            return is_interval;
        }
        if notes.contains("long run") {
            return is_long_run;
        }
        if notes.contains("progression") {
            return activity_lower.contains("progression");
        }

        !notes.contains("hill")
    }

    /// Parse the notes into segments; `None` when nothing in them is a step.
    pub fn parse(&self, notes: &str, grammars: &GrammarSet) -> Option<MatchResult> {
        let mut parts: Vec<String> = if notes.contains('\n') {
            notes
                .lines()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect()
        } else {
            self.part_separator
                .split(notes.trim())
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect()
        };

        // "Interval Session: 6x3:00 ..." -> drop the title
        if let Some(first) = parts.first_mut() {
            if let Some((title, rest)) = first.split_once(':') {
                if !title.chars().any(|c| c.is_ascii_digit()) {
                    *first = rest.trim().to_string();
                }
            }
        }

        let mut segments = Vec::new();
        let mut index = 0;
        while index < parts.len() {
            let part = parts[index].as_str();
            let next = parts.get(index + 1).map(String::as_str);
            index += 1;

            if part.is_empty() {
                continue;
            }

            if let Some(note) = self.warm_up_note(part) {
                match self.steady_quantity(part) {
                    Some(quantity) => segments.push(Segment::Steady {
                        quantity,
                        zone: self
                            .zone_hint(grammars, part)
                            .unwrap_or(ZoneHint::Fixed(self.easy_zone)),
                        note: Some(note.to_string()),
                    }),
                    None => tracing::debug!("Skipping {} without a duration: {:?}", note, part),
                }
                continue;
            }

            if self.reps.is_match(part) {
                if let Some(progression) = grammars.match_zone_progression(part) {
                    segments.extend(progression.segments);
                    continue;
                }

                let blocks = grammars.split_chain(part);
                let last = blocks.len().saturating_sub(1);
                for (position, block) in blocks.into_iter().enumerate() {
                    let mut rest = self.rest_in(grammars, block);
                    if rest == RestSpec::Continuous && position == last {
                        if let Some(seconds) = next.and_then(|next| self.rest_line_seconds(next)) {
                            rest = RestSpec::Timed(seconds);
                            index += 1;
                        }
                    }
                    if let Some(segment) = self.repeat(grammars, block, rest) {
                        segments.push(segment);
                    }
                }
                continue;
            }

            if let Some(quantity) = self.steady_quantity(part) {
                segments.push(Segment::Steady {
                    quantity,
                    zone: self
                        .zone_hint(grammars, part)
                        .unwrap_or(ZoneHint::Fixed(self.easy_zone)),
                    note: None,
                });
                continue;
            }

            tracing::debug!("Ignoring session-notes part {:?}", part);
        }

        if segments.is_empty() {
            return None;
        }

        Some(MatchResult {
            grammar: GrammarKind::SessionNotes,
            segments,
            default_zone: self.interval_zone,
        })
    }

    fn warm_up_note(&self, part: &str) -> Option<&'static str> {
        if self.warm_up.is_match(part) {
            Some("warm-up")
        } else if self.cool_down.is_match(part) {
            Some("cool-down")
        } else {
            None
        }
    }

    fn steady_quantity(&self, part: &str) -> Option<Quantity> {
        if let Some(caps) = self.minutes.captures(part) {
            let minutes: f64 = caps["value"].parse().ok()?;
            return Some(Quantity::DurationSeconds((minutes * 60.0).round() as u32));
        }

        let caps = self.kilometers.captures(part)?;
        Some(Quantity::kilometers(caps["value"].parse().ok()?))
    }

    fn repeat(&self, grammars: &GrammarSet, block: &str, rest: RestSpec) -> Option<Segment<ZoneHint>> {
        let caps = self.reps.captures(block)?;
        let reps = caps["reps"].parse().ok()?;
        let work = parse_work(&caps["work"])?;

        Some(Segment::Repeat {
            reps,
            work,
            rest,
            zone: self.zone_hint(grammars, block).unwrap_or(ZoneHint::Unstated),
        })
    }

    fn rest_in(&self, grammars: &GrammarSet, block: &str) -> RestSpec {
        if let Some(seconds) = grammars.rest_phrase_seconds(block) {
            return RestSpec::Timed(seconds);
        }
        if let Some(paren) = self.parenthesized.find(block) {
            let inner = paren.as_str().trim_matches(|c| c == '(' || c == ')');
            if let rest @ RestSpec::Timed(_) = grammars.parse_paren_rest(inner) {
                return rest;
            }
        }
        if self.implicit_rest.is_match(block) {
            return RestSpec::Timed(IMPLICIT_RECOVERY_SECONDS);
        }
        RestSpec::Continuous
    }

    /// "90 sec jog" on its own line after a repeat block.
    fn rest_line_seconds(&self, part: &str) -> Option<u32> {
        let caps = self.rest_line.captures(part.trim())?;
        let unit = caps.name("unit").map_or("", |m| m.as_str());
        let token = format!("{}{}", &caps["value"], unit);
        super::grammar::parse_duration(&token, 60)
    }

    /// Numeric zone first, then a keyword outside any rest phrase.
    fn zone_hint(&self, grammars: &GrammarSet, text: &str) -> Option<ZoneHint> {
        if let Some(token) = grammars.zone_token_in(text) {
            return Some(ZoneHint::Stated(token.to_string()));
        }

        let mut effort = self.parenthesized.replace_all(text, " ").into_owned();
        if let Some((start, end)) = grammars.rest_phrase_span(&effort) {
            effort.replace_range(start..end, " ");
        }
        grammars.keyword_hint(&effort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn parsers() -> (SessionNotesParser, GrammarSet) {
        let config = ParserConfig::default();
        (SessionNotesParser::new(&config), GrammarSet::new(&config))
    }

    #[test]
    fn test_interval_notes_with_warm_up() {
        let (notes, grammars) = parsers();
        let result = notes
            .parse(
                "Interval Session:\n15 min warm up\n6x3:00 Z4 with 90 sec jog\n10 min cool down",
                &grammars,
            )
            .unwrap();

        assert_eq!(result.grammar, GrammarKind::SessionNotes);
        assert_eq!(
            result.segments,
            vec![
                Segment::Steady {
                    quantity: Quantity::minutes(15),
                    zone: ZoneHint::Fixed(ZoneId::Z2),
                    note: Some("warm-up".to_string()),
                },
                Segment::Repeat {
                    reps: 6,
                    work: Quantity::DurationSeconds(180),
                    rest: RestSpec::Timed(90),
                    zone: ZoneHint::Stated("Z4".to_string()),
                },
                Segment::Steady {
                    quantity: Quantity::minutes(10),
                    zone: ZoneHint::Fixed(ZoneId::Z2),
                    note: Some("cool-down".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_rest_from_following_part() {
        let (notes, grammars) = parsers();
        let result = notes.parse("5x1km Z4 / 2 min jog / 20 min easy", &grammars).unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_matches!(
            &result.segments[0],
            Segment::Repeat { reps: 5, work: Quantity::DistanceMeters(1000), rest: RestSpec::Timed(120), .. }
        );
        assert_matches!(
            &result.segments[1],
            Segment::Steady { zone: ZoneHint::Stated(keyword), .. } if keyword == "easy"
        );
    }

    #[test]
    fn test_plus_chained_parts() {
        let (notes, grammars) = parsers();
        let result = notes
            .parse("3x10 mins Z3 + 60 sec rest + 4x2 mins Z5", &grammars)
            .unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_matches!(
            &result.segments[0],
            Segment::Repeat { reps: 3, rest: RestSpec::Timed(60), .. }
        );
        assert_matches!(
            &result.segments[1],
            Segment::Repeat { reps: 4, zone: ZoneHint::Stated(z), .. } if z == "Z5"
        );
    }

    #[test]
    fn test_zone_progression_in_notes() {
        let (notes, grammars) = parsers();
        let result = notes
            .parse("6x3:00 (90s) first 3 reps in Zone 3, final 3 reps in Zone 4", &grammars)
            .unwrap();

        assert_eq!(result.segments.len(), 2);
    }

    #[test]
    fn test_distance_in_zone() {
        let (notes, grammars) = parsers();
        let result = notes.parse("5km in Zone 1", &grammars).unwrap();

        assert_eq!(
            result.segments,
            vec![Segment::Steady {
                quantity: Quantity::DistanceMeters(5000),
                zone: ZoneHint::Stated("Zone 1".to_string()),
                note: None,
            }]
        );
    }

    #[test]
    fn test_notes_without_steps() {
        let (notes, grammars) = parsers();
        assert!(notes.parse("Keep it relaxed", &grammars).is_none());
        assert!(notes.parse("Warm up well", &grammars).is_none());
    }

    #[test]
    fn test_matching_rules() {
        let (notes, _) = parsers();

        assert!(!notes.applies_to("20 min easy", "Recovery 30 mins", None));
        assert!(!notes.applies_to("6x200m", "10x3:00 hills", None));
        assert!(notes.applies_to("Interval session: 6x3:00", "6x3:00 (90s) Z4", None));
        assert!(notes.applies_to("Interval session", "Track", Some("VO2max")));
        assert!(!notes.applies_to("Interval session", "Easy 40 mins", None));
        assert!(notes.applies_to("Long run: 90 mins", "Long 90 mins", None));
        assert!(!notes.applies_to("Long run: 90 mins", "Easy 40 mins", None));
        assert!(notes.applies_to("Progression: 5km Z2", "15km progression run", None));
        assert!(!notes.applies_to("Progression: 5km Z2", "Easy 40 mins", None));
        assert!(!notes.applies_to("Hill session", "Easy 40 mins", None));
        assert!(notes.applies_to("20 min easy / 10 min steady", "Easy 30 mins", None));
    }
}
