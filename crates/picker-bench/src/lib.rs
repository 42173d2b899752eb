//! Offline harness that replays pair-selection policies against a simulated
//! evaluator and reports how quickly each recovers the hidden ranking.

pub mod analytics;
pub mod config;
pub mod logging;
pub mod simulation;
