//! Application use cases (verification orchestration).

mod run_scenario;
mod run_suite;

pub use run_scenario::ScenarioRunner;
pub use run_suite::SuiteExecutor;
