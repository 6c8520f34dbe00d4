// Library exports for the training-plan CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
