use std::error::Error;
use std::io::ErrorKind;

use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SolverConfig;
use crate::domain::types::ProblemInstance;
use crate::error::{SolverError, SolverResult};
use crate::fixtures::data_generator::default_fixture;
use crate::report::output::{print_report, save_progress_csv, write_routes_json};
use crate::report::reporter::{build_report, SolutionReport};
use crate::routing::model::RoutingModel;
use crate::setup::init::{build_problem, load_input};
use crate::setup::init_types::InputData;
use crate::solver::guided_local_search::{GuidedLocalSearch, SearchMonitor, SearchOutcome};

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    dotenv().ok();
    Ok(())
}

/// Reads the configured input file, or generates the default fixture when it does not exist.
pub fn load_or_generate(config: &SolverConfig) -> SolverResult<InputData> {
    match load_input(&config.input_path) {
        Ok(input) => Ok(input),
        Err(SolverError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Input file {} not found, falling back to a random instance (seed {})",
                config.input_path.display(),
                config.seed
            );
            Ok(default_fixture(config.seed))
        }
        Err(e) => Err(e),
    }
}

/// Solves `problem`, prints and persists the report. Nothing is written unless a full solution exists.
pub fn execute(
    problem: &ProblemInstance,
    config: &SolverConfig,
    monitors: Vec<Box<dyn SearchMonitor>>,
) -> SolverResult<(SearchOutcome, SolutionReport)> {
    let model = RoutingModel::new(problem);
    let search = monitors
        .into_iter()
        .fold(GuidedLocalSearch::new(&model, config.search.clone()), |search, monitor| {
            search.with_monitor(monitor)
        });
    let outcome = search.run()?;

    info!(
        "Initial cost {:.2}, final cost {:.2}, {} improvements, terminated: {}",
        outcome.initial_cost,
        outcome.solution.objective(),
        outcome.statistics.improvements,
        outcome.termination
    );

    let report = build_report(&model, &outcome.solution);
    print_report(&report);
    write_routes_json(&config.output_path, &report)?;
    if let Some(path) = &config.progress_csv {
        save_progress_csv(path, &outcome.progress)?;
    }

    Ok((outcome, report))
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let config = SolverConfig::from_env()?;

    let input = load_or_generate(&config)?;
    let problem = build_problem(input, &config)?;

    info!(
        "Starting CVRP solver with {} locations, {} vehicles and a {:?} budget",
        problem.num_locations(),
        problem.num_vehicles(),
        config.search.time_limit
    );

    execute(&problem, &config, vec![])?;
    Ok(())
}
