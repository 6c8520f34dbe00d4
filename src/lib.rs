//! Parses free-form training plan sheet cells into structured workouts.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use training_plan::{ParserConfig, WorkoutParser};
//!
//! let config = ParserConfig::default();
//! let parser = WorkoutParser::new(&config);
//! let date = NaiveDate::from_ymd_opt(2025, 12, 22).unwrap();
//! let workouts = parser.parse_text("5x3:00 (60s) Z4", date).unwrap();
//! assert_eq!(workouts[0].total_duration_seconds(), Some(1140));
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod parser;
pub mod services;

pub use config::ParserConfig;
pub use errors::{ParseError, ParseResult};
pub use models::{Category, DayCell, ParsedPlan, PlanStatus, RawWeek, Workout, WorkoutStep, ZoneId};
pub use parser::{ParsedCell, SplitOutcome, WorkoutParser};
pub use services::{PlanBuilderService, SheetLayoutService};
