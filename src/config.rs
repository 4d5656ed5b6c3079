use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use tracing::{debug, info};

use crate::error::{SolverError, SolverResult};
use crate::solver::construction::FirstSolutionStrategy;

pub mod constant {
    pub(crate) const TIME_LIMIT_MS: u64 = 1_000;
    pub(crate) const DEPOT: usize = 0;
    pub(crate) const GLS_LAMBDA_COEFFICIENT: f64 = 0.1;
    pub(crate) const MAX_OR_OPT_SEGMENT: usize = 3;
    pub(crate) const SEED: u64 = 12345;
    pub(crate) const INPUT_PATH: &str = "assignment_cvrp.json";
    pub(crate) const OUTPUT_PATH: &str = "output.json";
    pub(crate) const PROGRESS_CSV_PATH: &str = "best_so_far.csv";
    pub(crate) const FIXTURE_LOCATION_COUNT: usize = 8;
    pub(crate) const FIXTURE_VEHICLE_COUNT: usize = 6;
    /// Capacities and demands are compared with this tolerance.
    pub const CAPACITY_EPSILON: f64 = 1e-9;
}

/// Knobs of a single solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    pub time_limit: Duration,
    pub max_iterations: Option<u64>,
    pub first_solution: FirstSolutionStrategy,
    pub gls_lambda_coefficient: f64,
    pub max_or_opt_segment: usize,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(constant::TIME_LIMIT_MS),
            max_iterations: None,
            first_solution: FirstSolutionStrategy::default(),
            gls_lambda_coefficient: constant::GLS_LAMBDA_COEFFICIENT,
            max_or_opt_segment: constant::MAX_OR_OPT_SEGMENT,
        }
    }
}

impl SearchParameters {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_first_solution(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution = strategy;
        self
    }
}

/// Run configuration for the solver binary.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub progress_csv: Option<PathBuf>,
    pub num_vehicles: Option<usize>,
    pub depot: usize,
    pub seed: u64,
    pub search: SearchParameters,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(constant::INPUT_PATH),
            output_path: PathBuf::from(constant::OUTPUT_PATH),
            progress_csv: Some(PathBuf::from(constant::PROGRESS_CSV_PATH)),
            num_vehicles: None,
            depot: constant::DEPOT,
            seed: constant::SEED,
            search: SearchParameters::default(),
        }
    }
}

impl SolverConfig {
    /// Defaults overridden by `VRP_*` variables from the environment or `.env`.
    pub fn from_env() -> SolverResult<Self> {
        dotenv().ok();
        let mut config = Self::default();

        if let Ok(path) = env::var("VRP_INPUT") {
            config.input_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("VRP_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        match env::var("VRP_PROGRESS_CSV") {
            Ok(path) if path.is_empty() || path == "off" => config.progress_csv = None,
            Ok(path) => config.progress_csv = Some(PathBuf::from(path)),
            Err(_) => {}
        }
        if let Some(ms) = parse_var::<u64>("VRP_TIME_LIMIT_MS")? {
            config.search.time_limit = Duration::from_millis(ms);
        }
        if let Some(iterations) = parse_var::<u64>("VRP_MAX_ITERATIONS")? {
            config.search.max_iterations = Some(iterations);
        }
        if let Some(strategy) = parse_var::<FirstSolutionStrategy>("VRP_FIRST_SOLUTION")? {
            config.search.first_solution = strategy;
        }
        if let Some(lambda) = parse_var::<f64>("VRP_GLS_LAMBDA")? {
            if !lambda.is_finite() || lambda < 0.0 {
                return Err(SolverError::validation(format!(
                    "VRP_GLS_LAMBDA must be a non-negative number, got {lambda}"
                )));
            }
            config.search.gls_lambda_coefficient = lambda;
        }
        config.num_vehicles = parse_var::<usize>("VRP_NUM_VEHICLES")?;
        if let Some(depot) = parse_var::<usize>("VRP_DEPOT")? {
            config.depot = depot;
        }
        if let Some(seed) = parse_var::<u64>("VRP_SEED")? {
            config.seed = seed;
        }

        info!(
            "Loaded configuration: input={}, time limit={:?}, first solution={:?}",
            config.input_path.display(),
            config.search.time_limit,
            config.search.first_solution
        );
        debug!("{:?}", config);
        Ok(config)
    }
}

fn parse_var<T>(key: &str) -> SolverResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SolverError::validation(format!("{key}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(None),
    }
}
