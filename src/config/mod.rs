use serde::{Deserialize, Serialize};

use crate::models::{ZoneId, ZoneTable};

/// Lookup tables and defaults the parser runs with.
///
/// Built once at startup (optionally from the `[parser]` section of a TOML
/// file) and handed to the parser by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Keyword -> zone, checked in order; the first keyword found wins.
    #[serde(default = "default_keyword_zones")]
    pub keyword_zones: Vec<KeywordZone>,

    /// Zone for a keyword that is not in `keyword_zones`.
    #[serde(default = "default_unknown_keyword_zone")]
    pub unknown_keyword_zone: ZoneId,

    #[serde(default = "default_interval_zone")]
    pub interval_zone: ZoneId,

    #[serde(default = "default_hill_zone")]
    pub hill_zone: ZoneId,

    #[serde(default = "default_marathon_zone")]
    pub marathon_zone: ZoneId,

    #[serde(default = "default_long_run_zone")]
    pub long_run_zone: ZoneId,

    /// Recovery between intervals embedded in a long run.
    #[serde(default = "default_long_run_recovery_seconds")]
    pub long_run_recovery_seconds: u32,

    /// Easy -> moderate -> hard thirds of a progression run.
    #[serde(default = "default_progression_zones")]
    pub progression_zones: [ZoneId; 3],

    #[serde(default)]
    pub strides: StridesConfig,

    /// Pins the year of week headers instead of inferring it.
    #[serde(default)]
    pub plan_year: Option<i32>,

    #[serde(skip)]
    pub zones: ZoneTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordZone {
    pub keyword: String,
    pub zone: ZoneId,
}

impl KeywordZone {
    fn new(keyword: &str, zone: ZoneId) -> Self {
        Self {
            keyword: keyword.to_string(),
            zone,
        }
    }
}

/// Strides used when a cell says "+ Strides" without numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StridesConfig {
    #[serde(default = "default_stride_reps")]
    pub reps: u32,

    #[serde(default = "default_stride_seconds")]
    pub seconds: u32,

    #[serde(default = "default_stride_recovery_seconds")]
    pub recovery_seconds: u32,

    #[serde(default = "default_stride_zone")]
    pub zone: ZoneId,
}

// Default value functions
fn default_keyword_zones() -> Vec<KeywordZone> {
    vec![
        KeywordZone::new("recovery", ZoneId::Z1),
        KeywordZone::new("rest", ZoneId::Z1),
        KeywordZone::new("jog", ZoneId::Z1),
        KeywordZone::new("walk", ZoneId::Z1),
        KeywordZone::new("easy", ZoneId::Z2),
        KeywordZone::new("steady", ZoneId::Z2),
        KeywordZone::new("moderate", ZoneId::Z2),
        KeywordZone::new("long run", ZoneId::Z2),
        KeywordZone::new("long", ZoneId::Z2),
        KeywordZone::new("tempo", ZoneId::Z3),
        KeywordZone::new("marathon", ZoneId::Z3),
        KeywordZone::new("threshold", ZoneId::Z4),
        KeywordZone::new("hard", ZoneId::Z4),
        KeywordZone::new("fast", ZoneId::Z4),
        KeywordZone::new("hill intervals", ZoneId::Z4),
        KeywordZone::new("hills", ZoneId::Z4),
        KeywordZone::new("intervals", ZoneId::Z4),
        KeywordZone::new("vo2max", ZoneId::Z5),
        KeywordZone::new("sprints", ZoneId::Z5),
        KeywordZone::new("sprint", ZoneId::Z5),
    ]
}

fn default_unknown_keyword_zone() -> ZoneId {
    ZoneId::Z2
}

fn default_interval_zone() -> ZoneId {
    ZoneId::Z4
}

fn default_hill_zone() -> ZoneId {
    ZoneId::Z4
}

fn default_marathon_zone() -> ZoneId {
    ZoneId::Z3
}

fn default_long_run_zone() -> ZoneId {
    ZoneId::Z2
}

fn default_long_run_recovery_seconds() -> u32 {
    120
}

fn default_progression_zones() -> [ZoneId; 3] {
    [ZoneId::Z2, ZoneId::Z3, ZoneId::Z4]
}

fn default_stride_reps() -> u32 {
    4
}

fn default_stride_seconds() -> u32 {
    10
}

fn default_stride_recovery_seconds() -> u32 {
    50
}

fn default_stride_zone() -> ZoneId {
    ZoneId::Z5
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            keyword_zones: default_keyword_zones(),
            unknown_keyword_zone: default_unknown_keyword_zone(),
            interval_zone: default_interval_zone(),
            hill_zone: default_hill_zone(),
            marathon_zone: default_marathon_zone(),
            long_run_zone: default_long_run_zone(),
            long_run_recovery_seconds: default_long_run_recovery_seconds(),
            progression_zones: default_progression_zones(),
            strides: StridesConfig::default(),
            plan_year: None,
            zones: ZoneTable::standard(),
        }
    }
}

impl Default for StridesConfig {
    fn default() -> Self {
        Self {
            reps: default_stride_reps(),
            seconds: default_stride_seconds(),
            recovery_seconds: default_stride_recovery_seconds(),
            zone: default_stride_zone(),
        }
    }
}

impl ParserConfig {
    /// Zone for an exact keyword, if the table knows it.
    pub fn keyword_zone(&self, keyword: &str) -> Option<ZoneId> {
        let keyword = keyword.trim().to_lowercase();
        self.keyword_zones
            .iter()
            .find(|entry| entry.keyword == keyword)
            .map(|entry| entry.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.unknown_keyword_zone, ZoneId::Z2);
        assert_eq!(config.interval_zone, ZoneId::Z4);
        assert_eq!(config.keyword_zone("Easy"), Some(ZoneId::Z2));
        assert_eq!(config.keyword_zone("tempo"), Some(ZoneId::Z3));
        assert_eq!(config.keyword_zone("threshold"), Some(ZoneId::Z4));
        assert_eq!(config.keyword_zone("recovery"), Some(ZoneId::Z1));
        assert_eq!(config.keyword_zone("sprints"), Some(ZoneId::Z5));
        assert_eq!(config.keyword_zone("pilates"), None);
    }

    #[test]
    fn test_progression_zones_ascend() {
        let zones = ParserConfig::default().progression_zones;
        assert!(zones[0] < zones[1] && zones[1] < zones[2]);
    }

    #[test]
    fn test_config_serialization() {
        let config = ParserConfig::default();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: ParserConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"interval_zone": "Z5", "plan_year": 2026}"#).unwrap();

        assert_eq!(config.interval_zone, ZoneId::Z5);
        assert_eq!(config.plan_year, Some(2026));
        assert_eq!(config.hill_zone, ZoneId::Z4);
        assert_eq!(config.strides.reps, 4);
        assert!(!config.keyword_zones.is_empty());
    }
}
