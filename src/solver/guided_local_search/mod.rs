pub mod guidance;
pub mod monitor;
pub mod neighbourhood;
pub mod search;

pub use monitor::{InterruptMonitor, SearchCommand, SearchMonitor, SearchStatistics};
pub use search::{solve, GuidedLocalSearch, ProgressPoint, SearchOutcome};
