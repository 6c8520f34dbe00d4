// Structured workout model produced by the parser

pub mod plan;
pub mod workout;
pub mod zone;

pub use plan::*;
pub use workout::*;
pub use zone::*;
