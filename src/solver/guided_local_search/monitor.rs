//! Search monitors polled between local-search iterations.
//!
//! A monitor never interrupts a move; it is asked for a [`SearchCommand`] before the
//! next neighbourhood is scanned, so the search always stops on a fully evaluated state.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Counters of one local-search run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatistics {
    pub iterations: u64,
    pub moves_applied: u64,
    pub local_optima: u64,
    pub penalised_arcs: u64,
    pub improvements: u64,
    pub elapsed: Duration,
}

pub trait SearchMonitor {
    fn name(&self) -> &str;

    fn on_start(&mut self) {}

    fn on_best_solution_updated(&mut self, _cost: f64, _statistics: &SearchStatistics) {}

    fn search_command(&mut self, _statistics: &SearchStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
}

impl std::fmt::Debug for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor {{ name: {} }}", self.name())
    }
}

/// Stops the search once a wall-clock budget is spent.
#[derive(Debug, Clone)]
pub struct TimeLimitMonitor {
    start_time: Instant,
    time_limit: Duration,
}

impl TimeLimitMonitor {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
        }
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_start(&mut self) {
        self.start_time = Instant::now();
    }

    fn search_command(&mut self, _statistics: &SearchStatistics) -> SearchCommand {
        if self.start_time.elapsed() >= self.time_limit {
            return SearchCommand::Terminate("time limit exceeded".to_string());
        }
        SearchCommand::Continue
    }
}

#[derive(Debug, Clone)]
pub struct IterationLimitMonitor {
    max_iterations: u64,
}

impl IterationLimitMonitor {
    pub fn new(max_iterations: u64) -> Self {
        Self { max_iterations }
    }
}

impl SearchMonitor for IterationLimitMonitor {
    fn name(&self) -> &str {
        "IterationLimitMonitor"
    }

    fn search_command(&mut self, statistics: &SearchStatistics) -> SearchCommand {
        if statistics.iterations >= self.max_iterations {
            return SearchCommand::Terminate("iteration limit reached".to_string());
        }
        SearchCommand::Continue
    }
}

/// Stops the search when a shared flag is raised from elsewhere.
#[derive(Debug, Clone)]
pub struct InterruptMonitor {
    flag: Arc<AtomicBool>,
}

impl InterruptMonitor {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl SearchMonitor for InterruptMonitor {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn search_command(&mut self, _statistics: &SearchStatistics) -> SearchCommand {
        if self.flag.load(Ordering::Relaxed) {
            return SearchCommand::Terminate("interrupted".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time_limit_terminates_immediately() {
        let mut monitor = TimeLimitMonitor::new(Duration::ZERO);
        monitor.on_start();
        assert!(matches!(
            monitor.search_command(&SearchStatistics::default()),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn iteration_limit_counts_completed_iterations() {
        let mut monitor = IterationLimitMonitor::new(3);
        let mut stats = SearchStatistics {
            iterations: 2,
            ..Default::default()
        };
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
        stats.iterations = 3;
        assert_eq!(
            monitor.search_command(&stats),
            SearchCommand::Terminate("iteration limit reached".to_string())
        );
    }

    #[test]
    fn interrupt_flag_is_observed() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut monitor = InterruptMonitor::new(flag.clone());
        assert_eq!(
            monitor.search_command(&SearchStatistics::default()),
            SearchCommand::Continue
        );
        flag.store(true, Ordering::Relaxed);
        assert_eq!(monitor.name(), "InterruptMonitor");
        assert!(matches!(
            monitor.search_command(&SearchStatistics::default()),
            SearchCommand::Terminate(_)
        ));
    }
}
