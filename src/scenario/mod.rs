// src/scenario/mod.rs
// Scenario interpretation and forecast adjustment

pub mod adjuster;
pub mod interpreter;
pub mod keywords;

pub use adjuster::{apply_scenario, scenario_factor};
pub use interpreter::ScenarioInterpreter;
pub use keywords::parse_scenario_keywords;
