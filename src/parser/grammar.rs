use regex::{Captures, Regex};
use serde::Serialize;

use super::compile;
use super::zones::ZONE_TOKEN;
use crate::config::{ParserConfig, StridesConfig};
use crate::models::{Quantity, ZoneId};

/// Which notation a piece of cell text was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrammarKind {
    Race,
    MarathonEffort,
    ZoneProgression,
    HillRepeats,
    LongRunWithIntervals,
    RepeatedDistance,
    RepeatedTime,
    ProgressionRun,
    EasyWithStrides,
    Plain,
    /// Several simple-format blocks parsed one after another.
    MultiBlock,
    SessionNotes,
}

/// Most repetitions a single block may ask for.
pub const MAX_REPS: u32 = 100;

/// Order the matchers are tried in. The first full match wins.
pub const PRIORITY: [GrammarKind; 10] = [
    GrammarKind::Race,
    GrammarKind::MarathonEffort,
    GrammarKind::ZoneProgression,
    GrammarKind::HillRepeats,
    GrammarKind::LongRunWithIntervals,
    GrammarKind::RepeatedDistance,
    GrammarKind::RepeatedTime,
    GrammarKind::ProgressionRun,
    GrammarKind::EasyWithStrides,
    GrammarKind::Plain,
];

/// Zone information as written in the text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneHint {
    /// "Z3", "Z3-Z4", "zone 2" or an intensity keyword.
    Stated(String),
    /// Set by the grammar itself (marathon effort, progression thirds).
    Fixed(ZoneId),
    Unstated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestSpec {
    Timed(u32),
    /// Free text such as "steady jog back"; no quantity.
    Described(String),
    /// Repetitions run back to back.
    Continuous,
}

/// A structured piece of a workout. `Z` is `ZoneHint` straight out of a
/// matcher and `ZoneSpec` once the zone resolver has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<Z> {
    Repeat {
        reps: u32,
        work: Quantity,
        rest: RestSpec,
        zone: Z,
    },
    Steady {
        quantity: Quantity,
        zone: Z,
        note: Option<String>,
    },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub grammar: GrammarKind,
    pub segments: Vec<Segment<ZoneHint>>,
    /// Zone for unstated segments when the cell carries no keyword either.
    pub default_zone: ZoneId,
}

impl MatchResult {
    fn new(grammar: GrammarKind, segments: Vec<Segment<ZoneHint>>, default_zone: ZoneId) -> Self {
        Self {
            grammar,
            segments,
            default_zone,
        }
    }
}

/// Whether the segments expand to at most `MAX_REPS` repetitions per block,
/// at least one each, with duration and distance totals that fit in a `u32`.
pub fn within_bounds<Z>(segments: &[Segment<Z>]) -> bool {
    let mut seconds = Some(0u32);
    let mut meters = Some(0u32);

    for segment in segments {
        let parts = match segment {
            Segment::Repeat { reps, .. } if *reps == 0 || *reps > MAX_REPS => return false,
            Segment::Repeat { reps, work, rest, .. } => {
                let rest = match rest {
                    RestSpec::Timed(rest_seconds) => Quantity::DurationSeconds(*rest_seconds),
                    _ => Quantity::Untimed,
                };
                [(*work, *reps), (rest, *reps)]
            }
            Segment::Steady { quantity, .. } => [(*quantity, 1), (Quantity::Untimed, 0)],
            Segment::Placeholder => continue,
        };

        for (quantity, times) in parts {
            let (total, value) = match quantity {
                Quantity::DurationSeconds(value) => (&mut seconds, value),
                Quantity::DistanceMeters(value) => (&mut meters, value),
                Quantity::Untimed => continue,
            };
            *total = total
                .zip(value.checked_mul(times))
                .and_then(|(sum, added)| sum.checked_add(added));
        }
    }

    seconds.is_some() && meters.is_some()
}

type Matcher = fn(&GrammarSet, &str) -> Option<MatchResult>;

const WORK_TIME: &str = r"\d+:\d{2}|\d+(?:\.\d+)?(?:\s*(?:seconds?|secs?|s|minutes?|mins?|m)\b)?";
const WORK_DISTANCE: &str = r"\d+(?:\.\d+)?\s*(?:km|k|m)\b";
const WORK_ANY: &str = r"\d+:\d{2}|\d+(?:\.\d+)?(?:\s*(?:seconds?|secs?|s|minutes?|mins?|km|k|m)\b)?";
const REST_PHRASE: &str = r"(?:\+|with|and|all\s+with)\s+(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>minutes?|mins?|m|seconds?|secs?|s)?\s*(?:jog|walk|recovery|rest|rec|float)\b";
const REPEAT_BLOCK: &str = r"(?i)^(?:(?P<label>[a-z][a-z ]*?)\s*:?\s+)?(?P<reps>\d+)\s*x\s*(?P<work><WORK>)\s*(?:\((?P<rest>[^)]*)\))?(?:\s*(?:@\s*|at\s+|in\s+)?(?P<zone><ZONE>))?(?:\s*,?\s*(?P<phrase>(?:\+|with|and|all\s+with)\s+\d+(?:\.\d+)?\s*(?:minutes?|mins?|m|seconds?|secs?|s)?\s*(?:jog|walk|recovery|rest|rec|float)\b))?(?:\s*,?\s*(?:@\s*|at\s+|in\s+)?(?P<zone2><ZONE>))?$";

/// The ordered set of interval grammars.
pub struct GrammarSet {
    repeat_time: Regex,
    repeat_distance: Regex,
    chain_separator: Regex,
    reps_start: Regex,
    reps_lead: Regex,
    paren_rest: Regex,
    rest_phrase: Regex,
    zone_token: Regex,
    keyword: Regex,
    hr_suffix: Regex,
    hills_suffix: Regex,
    hills_prefix: Regex,
    progression_prose: Regex,
    parenthesized: Regex,
    long_run_steady_first: Regex,
    long_run_intervals_first: Regex,
    progression_run: Regex,
    progression_run_prefix: Regex,
    marathon: Regex,
    race: Regex,
    plain_quantity: Regex,
    strict_plain: Regex,
    strides_split: Regex,
    strides_leading: Regex,
    strides_trailing: Regex,
    strides_bare: Regex,
    defaults: GrammarDefaults,
}

#[derive(Debug, Clone)]
struct GrammarDefaults {
    plain_zone: ZoneId,
    interval_zone: ZoneId,
    hill_zone: ZoneId,
    marathon_zone: ZoneId,
    long_run_zone: ZoneId,
    long_run_recovery_seconds: u32,
    progression_zones: [ZoneId; 3],
    strides: StridesConfig,
}

impl GrammarSet {
    pub fn new(config: &ParserConfig) -> Self {
        let mut keywords: Vec<String> = config
            .keyword_zones
            .iter()
            .map(|entry| {
                entry
                    .keyword
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();
        keywords.sort_by_key(|keyword| std::cmp::Reverse(keyword.len()));
        let keyword_alt = keywords.join("|");
        let zone_alt = format!(r"{}|\b(?:{})\b", ZONE_TOKEN, keyword_alt);

        let repeat = |work: &str| {
            compile(
                &REPEAT_BLOCK
                    .replace("<WORK>", work)
                    .replace("<ZONE>", &zone_alt),
            )
        };

        Self {
            repeat_time: repeat(WORK_TIME),
            repeat_distance: repeat(WORK_DISTANCE),
            chain_separator: compile(r"(?i)\s*(?:\+|,|&|\bthen\b)\s*"),
            reps_start: compile(r"^\d+\s*x"),
            reps_lead: compile(r"(?i)^\d+\s*x\s*\d"),
            paren_rest: compile(
                r"(?i)^\s*(?P<time>\d+:\d{2}|\d+(?:\.\d+)?(?:\s*(?:seconds?|secs?|s|minutes?|mins?|m)\b)?)\s*(?:(?:jog|walk|recovery|rest|rec|float|easy|standing)\s*)*$",
            ),
            rest_phrase: compile(&format!("(?i){}", REST_PHRASE)),
            zone_token: compile(&format!(r"(?i)\b{}\b", ZONE_TOKEN)),
            keyword: compile(&format!(r"(?i)\b(?:{})\b", keyword_alt)),
            hr_suffix: compile(r"(?i)\bhr\b"),
            hills_suffix: compile(&format!(
                r"(?i)^(?P<reps>\d+)\s*x\s*(?P<work>{})\s*(?:hills?|hill\s+repeats?|uphill)\b(?P<tail>.*)$",
                WORK_ANY
            )),
            hills_prefix: compile(&format!(
                r"(?i)^(?:hills?|hill\s+repeats?)\s*:?\s*(?P<reps>\d+)\s*x\s*(?P<work>{})(?P<tail>\W.*)?$",
                WORK_ANY
            )),
            progression_prose: compile(&format!(
                r"(?i)^(?:[a-z][a-z ]*?\s*:?\s+)?(?P<reps>\d+)\s*x\s*(?P<work>{})(?P<middle>.*?)\bfirst\s+(?P<n1>\d+)\s*(?:reps?\s+)?(?:in|at|@)\s*(?:zones?\s*|z)(?P<z1>\d+)(?P<between>.*?)\b(?:final|last|remaining)\s+(?P<n2>\d+)\s*(?:reps?\s+)?(?:in|at|@)\s*(?:zones?\s*|z)(?P<z2>\d+)\b.*$",
                WORK_ANY
            )),
            parenthesized: compile(r"\(([^)]*)\)"),
            long_run_steady_first: compile(
                &r"(?i)^(?:(?:long(?:\s+run)?|steady|easy)\s*:?\s+)?(?P<total>\d+(?:\.\d+)?)\s*(?P<unit>minutes?|mins?|km|k)\b(?:\s+(?P<steadyzone><NUMERIC>))?\s*(?:(?P<inc>inc\.?|incl\.?|including)|\+|&|and|with)\s*(?P<reps>\d+)\s*x\s*(?P<dur>\d+(?:\.\d+)?)\s*(?:minutes?|mins?)\b(?:\s*(?:@\s*|at\s+|in\s+)?(?P<zone><ZONE>))?(?:\s*\((?P<rest>[^)]*)\))?$"
                    .replace("<NUMERIC>", ZONE_TOKEN)
                    .replace("<ZONE>", &zone_alt),
            ),
            long_run_intervals_first: compile(
                &r"(?i)^(?P<reps>\d+)\s*x\s*(?P<dur>\d+(?:\.\d+)?)\s*(?:minutes?|mins?)\b(?:\s*(?:@\s*|at\s+|in\s+)?(?P<zone><ZONE>))?(?:\s*\((?P<rest>[^)]*)\))?\s*(?:then|followed\s+by|\+|&|and)\s*(?P<total>\d+(?:\.\d+)?)\s*(?P<unit>minutes?|mins?|km|k)\b(?:\s+(?P<steadyzone><ZONE>))?$"
                    .replace("<ZONE>", &zone_alt),
            ),
            progression_run: compile(
                r"(?i)^(?:[a-z][a-z ]*?\s+)?(?P<km>\d+(?:\.\d+)?)\s*(?:km|k)\s+progression(?:\s+run)?$",
            ),
            progression_run_prefix: compile(
                r"(?i)^progression(?:\s+run)?\s*:?\s*(?P<km>\d+(?:\.\d+)?)\s*(?:km|k)$",
            ),
            marathon: compile(
                r"(?i)^(?P<reps>\d+)\s*x\s*(?P<dist>\d+(?:\.\d+)?\s*(?:km|k|m))\s+(?:at|@)\s+marathon\s+(?:effort|pace)\b(?:\s*\((?P<rest>[^)]*)\))?$",
            ),
            race: compile(r"(?i)\brace\b"),
            plain_quantity: compile(
                r"(?i)\b(?:(?P<hours>\d+(?:\.\d+)?)\s*(?:hours?|hrs?|h)\b(?:\s*(?P<hour_minutes>\d+)\s*(?:minutes?|mins?|m)\b)?|(?P<minutes>\d+(?:\.\d+)?)\s*(?:minutes?|mins?)\b|(?P<km>\d+(?:\.\d+)?)\s*(?:km|k)\b)",
            ),
            strict_plain: compile(
                &r"(?i)^(?:[a-z][a-z ]*?\s+)?\d+(?:\.\d+)?\s*(?:minutes?|mins?|km|k)\b(?:\s+(?:<ZONE>))?(?:\s+(?:run|jog))?$"
                    .replace("<ZONE>", &zone_alt),
            ),
            strides_split: compile(
                r"(?i)^(?P<base>.+?)\s*(?:&|\+|\band\b|\bwith\b|,)\s*(?P<strides>(?:\d+\s*x\s*\d+\s*(?:seconds?|secs?|s)?\s+)?strides?\b.*)$",
            ),
            strides_leading: compile(
                r"(?i)^strides?\s*:?\s*(?P<reps>\d+)\s*x\s*(?P<secs>\d+)\s*(?:seconds?|secs?|s)?(?:\s*(?:\+|with|,)?\s*(?P<rec>\d+)\s*(?:seconds?|secs?|s)?\s*(?:rest|recovery|jog|walk)?)?$",
            ),
            strides_trailing: compile(
                r"(?i)^(?P<reps>\d+)\s*x\s*(?P<secs>\d+)\s*(?:seconds?|secs?|s)?\s+strides?(?:\s*(?:\+|with|,)?\s*(?P<rec>\d+)\s*(?:seconds?|secs?|s)?\s*(?:rest|recovery|jog|walk)?)?$",
            ),
            strides_bare: compile(r"(?i)^strides?$"),
            defaults: GrammarDefaults {
                plain_zone: config.unknown_keyword_zone,
                interval_zone: config.interval_zone,
                hill_zone: config.hill_zone,
                marathon_zone: config.marathon_zone,
                long_run_zone: config.long_run_zone,
                long_run_recovery_seconds: config.long_run_recovery_seconds,
                progression_zones: config.progression_zones,
                strides: config.strides.clone(),
            },
        }
    }

    fn matchers() -> [(GrammarKind, Matcher); 10] {
        [
            (GrammarKind::Race, GrammarSet::match_race as Matcher),
            (GrammarKind::MarathonEffort, GrammarSet::match_marathon_effort as Matcher),
            (GrammarKind::ZoneProgression, GrammarSet::match_zone_progression as Matcher),
            (GrammarKind::HillRepeats, GrammarSet::match_hills as Matcher),
            (GrammarKind::LongRunWithIntervals, GrammarSet::match_long_run as Matcher),
            (GrammarKind::RepeatedDistance, GrammarSet::match_repeated_distance as Matcher),
            (GrammarKind::RepeatedTime, GrammarSet::match_repeated_time as Matcher),
            (GrammarKind::ProgressionRun, GrammarSet::match_progression_run as Matcher),
            (GrammarKind::EasyWithStrides, GrammarSet::match_strides as Matcher),
            (GrammarKind::Plain, GrammarSet::match_plain as Matcher),
        ]
    }

    /// Try every grammar in priority order, ending with the plain fallback.
    pub fn try_match(&self, text: &str) -> Option<MatchResult> {
        let text = normalize(text);
        Self::matchers().iter().find_map(|(kind, matcher)| {
            let result = matcher(self, &text);
            if result.is_some() {
                tracing::debug!("{:?} matched {:?}", kind, text);
            }
            result
        })
    }

    /// Like `try_match` but without the plain fallback.
    pub fn try_specific(&self, text: &str) -> Option<MatchResult> {
        let text = normalize(text);
        Self::matchers()
            .iter()
            .filter(|(kind, _)| *kind != GrammarKind::Plain)
            .find_map(|(_, matcher)| matcher(self, &text))
    }

    pub fn is_race(&self, text: &str) -> bool {
        self.race.is_match(text)
    }

    pub fn match_race(&self, text: &str) -> Option<MatchResult> {
        self.race.is_match(text).then(|| {
            MatchResult::new(GrammarKind::Race, vec![Segment::Placeholder], self.defaults.plain_zone)
        })
    }

    pub fn match_marathon_effort(&self, text: &str) -> Option<MatchResult> {
        let caps = self.marathon.captures(text)?;
        let reps = caps["reps"].parse().ok()?;
        let work = parse_distance(&caps["dist"])?;
        let rest = self.rest_from(&caps);

        Some(MatchResult::new(
            GrammarKind::MarathonEffort,
            vec![Segment::Repeat {
                reps,
                work,
                rest,
                zone: ZoneHint::Fixed(self.defaults.marathon_zone),
            }],
            self.defaults.marathon_zone,
        ))
    }

    /// "6x3:00 (90s) first 3 reps in Zone 3, final 3 reps in Zone 4"
    pub fn match_zone_progression(&self, text: &str) -> Option<MatchResult> {
        let caps = self.progression_prose.captures(text)?;
        let reps: u32 = caps["reps"].parse().ok()?;
        let work = parse_work(&caps["work"])?;
        let first_reps: u32 = caps["n1"].parse().ok()?;
        let final_reps: u32 = caps["n2"].parse().ok()?;

        if first_reps.checked_add(final_reps) != Some(reps) {
            tracing::debug!(
                "Zone progression counts {}+{} override {} reps in {:?}",
                first_reps,
                final_reps,
                reps,
                text
            );
        }

        let rest = self
            .parenthesized
            .captures(&caps["middle"])
            .map(|paren| self.parse_paren_rest(&paren[1]))
            .or_else(|| self.rest_phrase_seconds(text).map(RestSpec::Timed))
            .unwrap_or(RestSpec::Continuous);

        let segments = vec![
            Segment::Repeat {
                reps: first_reps,
                work,
                rest: rest.clone(),
                zone: ZoneHint::Stated(format!("Z{}", &caps["z1"])),
            },
            Segment::Repeat {
                reps: final_reps,
                work,
                rest,
                zone: ZoneHint::Stated(format!("Z{}", &caps["z2"])),
            },
        ];

        Some(MatchResult::new(
            GrammarKind::ZoneProgression,
            segments,
            self.defaults.interval_zone,
        ))
    }

    pub fn match_hills(&self, text: &str) -> Option<MatchResult> {
        let caps = self
            .hills_suffix
            .captures(text)
            .or_else(|| self.hills_prefix.captures(text))?;
        let reps = caps["reps"].parse().ok()?;
        let work = parse_work(&caps["work"])?;
        let tail = caps.name("tail").map_or("", |m| m.as_str());

        let zone = self
            .zone_token
            .find(tail)
            .map(|m| ZoneHint::Stated(m.as_str().to_string()))
            .unwrap_or(ZoneHint::Unstated);

        let phrase = self.zone_token.replace_all(tail, " ");
        let phrase = self.hr_suffix.replace_all(&phrase, " ").replace(['(', ')'], " ");
        let phrase = phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c == ',' || c == ';' || c == ':' || c == '-' || c.is_whitespace())
            .to_string();
        let phrase = if phrase.is_empty() {
            "jog back".to_string()
        } else {
            phrase
        };

        Some(MatchResult::new(
            GrammarKind::HillRepeats,
            vec![Segment::Repeat {
                reps,
                work,
                rest: RestSpec::Described(phrase),
                zone,
            }],
            self.defaults.hill_zone,
        ))
    }

    /// "90 mins inc. 3x10 mins Z3", "Long 80 mins + 8x5 mins Z3",
    /// "3x10 mins Z3 then 40 mins easy".
    pub fn match_long_run(&self, text: &str) -> Option<MatchResult> {
        let (caps, steady_first) = match self.long_run_steady_first.captures(text) {
            Some(caps) => (caps, true),
            None => (self.long_run_intervals_first.captures(text)?, false),
        };

        let reps: u32 = caps["reps"].parse().ok()?;
        let interval_seconds = parse_duration(&format!("{} min", &caps["dur"]), 60)?;
        let rest = match caps.name("rest") {
            Some(rest) => self.parse_paren_rest(rest.as_str()),
            None => RestSpec::Timed(self.defaults.long_run_recovery_seconds),
        };
        let zone = caps
            .name("zone")
            .map(|m| ZoneHint::Stated(m.as_str().to_string()))
            .unwrap_or(ZoneHint::Fixed(self.defaults.interval_zone));

        let total: f64 = caps["total"].parse().ok()?;
        let is_distance = caps["unit"].to_lowercase().starts_with('k');
        let steady = if is_distance {
            Quantity::kilometers(total)
        } else {
            let total_seconds = (total * 60.0).round() as u32;
            if caps.name("inc").is_some() {
                let rest_seconds = match &rest {
                    RestSpec::Timed(seconds) => *seconds,
                    _ => 0,
                };
                let block_seconds = reps
                    .saturating_mul(interval_seconds)
                    .saturating_add(reps.saturating_sub(1).saturating_mul(rest_seconds));
                Quantity::DurationSeconds(total_seconds.saturating_sub(block_seconds))
            } else {
                Quantity::DurationSeconds(total_seconds)
            }
        };
        let steady_zone = caps
            .name("steadyzone")
            .map(|m| ZoneHint::Stated(m.as_str().to_string()))
            .unwrap_or(ZoneHint::Fixed(self.defaults.long_run_zone));

        let block = Segment::Repeat {
            reps,
            work: Quantity::DurationSeconds(interval_seconds),
            rest,
            zone,
        };
        let steady = (steady != Quantity::DurationSeconds(0)).then_some(Segment::Steady {
            quantity: steady,
            zone: steady_zone,
            note: None,
        });

        let segments = match (steady, steady_first) {
            (Some(steady), true) => vec![steady, block],
            (Some(steady), false) => vec![block, steady],
            (None, _) => {
                tracing::debug!("Embedded intervals fill the whole long run: {:?}", text);
                vec![block]
            }
        };

        Some(MatchResult::new(
            GrammarKind::LongRunWithIntervals,
            segments,
            self.defaults.long_run_zone,
        ))
    }

    pub fn match_repeated_distance(&self, text: &str) -> Option<MatchResult> {
        self.match_repeat_chain(text, &self.repeat_distance, GrammarKind::RepeatedDistance)
    }

    pub fn match_repeated_time(&self, text: &str) -> Option<MatchResult> {
        self.match_repeat_chain(text, &self.repeat_time, GrammarKind::RepeatedTime)
    }

    /// "15km progression run": three equal thirds at rising zones.
    pub fn match_progression_run(&self, text: &str) -> Option<MatchResult> {
        let caps = self
            .progression_run
            .captures(text)
            .or_else(|| self.progression_run_prefix.captures(text))?;
        let km: f64 = caps["km"].parse().ok()?;
        let total_meters = (km * 1000.0).round() as u32;
        let third = total_meters / 3;
        let lengths = [third, third, total_meters - 2 * third];

        let segments = lengths
            .iter()
            .zip(self.defaults.progression_zones.iter())
            .map(|(meters, zone)| Segment::Steady {
                quantity: Quantity::DistanceMeters(*meters),
                zone: ZoneHint::Fixed(*zone),
                note: None,
            })
            .collect();

        Some(MatchResult::new(
            GrammarKind::ProgressionRun,
            segments,
            self.defaults.progression_zones[0],
        ))
    }

    /// "Easy 40 mins & Strides 5x10sec + 50sec rest", "Easy 40 mins + strides".
    pub fn match_strides(&self, text: &str) -> Option<MatchResult> {
        let caps = self.strides_split.captures(text)?;
        let base = caps["base"].trim();
        if !self.strict_plain.is_match(base) {
            return None;
        }

        let strides = caps["strides"].trim();
        let defaults = &self.defaults.strides;
        let (reps, seconds, recovery) = match self
            .strides_leading
            .captures(strides)
            .or_else(|| self.strides_trailing.captures(strides))
        {
            Some(found) => (
                found["reps"].parse().ok()?,
                found["secs"].parse().ok()?,
                match found.name("rec") {
                    Some(rec) => rec.as_str().parse().ok()?,
                    None => defaults.recovery_seconds,
                },
            ),
            None if self.strides_bare.is_match(strides) => {
                (defaults.reps, defaults.seconds, defaults.recovery_seconds)
            }
            None => return None,
        };

        let mut segments = self.match_plain(base)?.segments;
        segments.push(Segment::Repeat {
            reps,
            work: Quantity::DurationSeconds(seconds),
            rest: RestSpec::Timed(recovery),
            zone: ZoneHint::Fixed(defaults.zone),
        });

        Some(MatchResult::new(
            GrammarKind::EasyWithStrides,
            segments,
            self.defaults.plain_zone,
        ))
    }

    /// Fallback: the first duration or distance in the text as one steady
    /// step, or an untimed step when only an intensity keyword is present.
    pub fn match_plain(&self, text: &str) -> Option<MatchResult> {
        // A repetition block no interval grammar accepted is not a steady run
        if self.reps_lead.is_match(text) {
            return None;
        }

        let zone = self
            .zone_token
            .find(text)
            .map(|m| ZoneHint::Stated(m.as_str().to_string()))
            .or_else(|| self.keyword_hint(text));

        let quantity = self.plain_quantity.captures(text).and_then(|caps| {
            if let Some(hours) = caps.name("hours") {
                let hours: f64 = hours.as_str().parse().ok()?;
                let minutes: f64 = caps
                    .name("hour_minutes")
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0.0);
                Some(Quantity::DurationSeconds((hours * 3600.0 + minutes * 60.0).round() as u32))
            } else if let Some(minutes) = caps.name("minutes") {
                let minutes: f64 = minutes.as_str().parse().ok()?;
                Some(Quantity::DurationSeconds((minutes * 60.0).round() as u32))
            } else {
                let km: f64 = caps.name("km")?.as_str().parse().ok()?;
                Some(Quantity::kilometers(km))
            }
        });

        let (quantity, zone) = match (quantity, zone) {
            (Some(quantity), zone) => (quantity, zone.unwrap_or(ZoneHint::Unstated)),
            (None, Some(zone)) => (Quantity::Untimed, zone),
            (None, None) => return None,
        };

        Some(MatchResult::new(
            GrammarKind::Plain,
            vec![Segment::Steady {
                quantity,
                zone,
                note: None,
            }],
            self.defaults.plain_zone,
        ))
    }

    /// Keyword from the table found in `text`, as a stated hint.
    pub fn keyword_hint(&self, text: &str) -> Option<ZoneHint> {
        self.keyword.find(text).map(|m| {
            ZoneHint::Stated(m.as_str().split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        })
    }

    pub fn zone_token_in<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.zone_token.find(text).map(|m| m.as_str())
    }

    /// Rest given as "with 60 sec rest", "+ 2 min jog" and the like.
    pub fn rest_phrase_seconds(&self, text: &str) -> Option<u32> {
        let caps = self.rest_phrase.captures(text)?;
        let token = format!(
            "{}{}",
            &caps["value"],
            caps.name("unit").map_or("", |m| m.as_str())
        );
        parse_duration(&token, 60)
    }

    pub fn rest_phrase_span(&self, text: &str) -> Option<(usize, usize)> {
        self.rest_phrase.find(text).map(|m| (m.start(), m.end()))
    }

    /// Rest written inside parentheses. Bare numbers are seconds.
    pub fn parse_paren_rest(&self, inner: &str) -> RestSpec {
        if let Some(caps) = self.paren_rest.captures(inner) {
            if let Some(seconds) = parse_duration(&caps["time"], 1) {
                return RestSpec::Timed(seconds);
            }
        }

        let described = inner.split_whitespace().collect::<Vec<_>>().join(" ");
        if described.is_empty() {
            RestSpec::Continuous
        } else {
            RestSpec::Described(described)
        }
    }

    fn rest_from(&self, caps: &Captures) -> RestSpec {
        caps.name("rest")
            .map(|rest| self.parse_paren_rest(rest.as_str()))
            .unwrap_or(RestSpec::Continuous)
    }

    fn match_repeat_chain(&self, text: &str, pattern: &Regex, kind: GrammarKind) -> Option<MatchResult> {
        let segments = self
            .split_chain(text)
            .into_iter()
            .map(|block| self.repeat_block(pattern, block, kind))
            .collect::<Option<Vec<_>>>()?;

        Some(MatchResult::new(kind, segments, self.defaults.interval_zone))
    }

    fn repeat_block(&self, pattern: &Regex, block: &str, kind: GrammarKind) -> Option<Segment<ZoneHint>> {
        let caps = pattern.captures(block)?;
        let reps = caps["reps"].parse().ok()?;
        let work = match kind {
            GrammarKind::RepeatedDistance => parse_distance(&caps["work"])?,
            _ => Quantity::DurationSeconds(parse_duration(&caps["work"], 60)?),
        };

        let rest = match (caps.name("rest"), caps.name("phrase")) {
            (Some(rest), _) => self.parse_paren_rest(rest.as_str()),
            (None, Some(phrase)) => self
                .rest_phrase_seconds(phrase.as_str())
                .map(RestSpec::Timed)
                .unwrap_or(RestSpec::Continuous),
            (None, None) => RestSpec::Continuous,
        };

        let zone = caps
            .name("zone")
            .or_else(|| caps.name("zone2"))
            .map(|m| ZoneHint::Stated(m.as_str().to_string()))
            .or_else(|| caps.name("label").and_then(|label| self.keyword_hint(label.as_str())))
            .unwrap_or(ZoneHint::Unstated);

        Some(Segment::Repeat {
            reps,
            work,
            rest,
            zone,
        })
    }

    /// Split "5x3:00 (60s) + 4x1:00 (60s) Z4" into its repeat blocks. A
    /// separator only counts when a new "<N>x" follows it.
    pub(crate) fn split_chain<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut blocks = Vec::new();
        let mut start = 0;

        for separator in self.chain_separator.find_iter(text) {
            if self.reps_start.is_match(&text[separator.end()..]) {
                blocks.push(text[start..separator.start()].trim());
                start = separator.end();
            }
        }
        blocks.push(text[start..].trim());
        blocks
    }
}

/// Collapse whitespace and drop trailing "HR" and punctuation.
pub fn normalize(text: &str) -> String {
    let collapsed = text.replace('×', "x").split_whitespace().collect::<Vec<_>>().join(" ");
    let mut normalized = collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | '!'))
        .trim_end()
        .to_string();

    let len = normalized.len();
    if len >= 3 && normalized.is_char_boundary(len - 3) && normalized[len - 3..].eq_ignore_ascii_case(" hr") {
        normalized.truncate(len - 3);
    }
    normalized.trim().to_string()
}

/// Parse "3:00", "90s", "2 min", "1.5h" or a bare number in `bare_unit`
/// seconds. A bare "m" of 100 or more is a distance, not minutes.
pub fn parse_duration(token: &str, bare_unit: u32) -> Option<u32> {
    let token = token.trim().to_lowercase();

    if let Some((minutes, seconds)) = token.split_once(':') {
        let minutes: u32 = minutes.trim().parse().ok()?;
        let seconds: u32 = seconds.trim().parse().ok()?;
        return minutes.checked_mul(60)?.checked_add(seconds);
    }

    let number_end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let value: f64 = token[..number_end].parse().ok()?;
    let unit = token[number_end..].trim();

    let seconds = match unit {
        "" => value * f64::from(bare_unit),
        "m" if value >= 100.0 => return None,
        unit if unit.starts_with('s') => value,
        unit if unit.starts_with('m') => value * 60.0,
        unit if unit.starts_with('h') => value * 3600.0,
        _ => return None,
    };
    Some(seconds.round() as u32)
}

/// Parse "1km", "1.5k" or "400m". Metres under 100 are rejected so "3m"
/// stays available as minutes.
pub fn parse_distance(token: &str) -> Option<Quantity> {
    let token = token.trim().to_lowercase();
    let number_end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let value: f64 = token[..number_end].parse().ok()?;

    match token[number_end..].trim() {
        "km" | "k" => Some(Quantity::kilometers(value)),
        "m" if value >= 100.0 => Some(Quantity::DistanceMeters(value.round() as u32)),
        _ => None,
    }
}

pub fn parse_work(token: &str) -> Option<Quantity> {
    parse_distance(token).or_else(|| parse_duration(token, 60).map(Quantity::DurationSeconds))
}
