use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, span, trace, Level};

use crate::config::SearchParameters;
use crate::domain::solution::Solution;
use crate::domain::types::ProblemInstance;
use crate::error::SolverResult;
use crate::evaluation::penalty::ArcPenalties;
use crate::routing::model::RoutingModel;
use crate::solver::construction::construct;

use super::guidance::{penalize_local_optimum, AugmentedObjective};
use super::monitor::{
    IterationLimitMonitor, SearchCommand, SearchMonitor, SearchStatistics, TimeLimitMonitor,
};
use super::neighbourhood::{best_candidate, generate_moves, IMPROVEMENT_EPSILON};

/// A new best solution seen during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub iteration: u64,
    pub elapsed_ms: u64,
    pub best_cost: f64,
}

/// Final state of a solve.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub solution: Solution,
    pub initial_cost: f64,
    pub statistics: SearchStatistics,
    pub progress: Vec<ProgressPoint>,
    pub termination: String,
}

struct SearchState {
    current: Solution,
    route_costs: Vec<f64>,
    augmented_costs: Vec<f64>,
    best: Solution,
    penalties: ArcPenalties,
    statistics: SearchStatistics,
    progress: Vec<ProgressPoint>,
}

/// Guided local search over relocate, or-opt, exchange and 2-opt moves.
pub struct GuidedLocalSearch<'m, 'p> {
    model: &'m RoutingModel<'p>,
    params: SearchParameters,
    monitors: Vec<Box<dyn SearchMonitor>>,
}

impl<'m, 'p> GuidedLocalSearch<'m, 'p> {
    pub fn new(model: &'m RoutingModel<'p>, params: SearchParameters) -> Self {
        let mut monitors: Vec<Box<dyn SearchMonitor>> =
            vec![Box::new(TimeLimitMonitor::new(params.time_limit))];
        if let Some(max_iterations) = params.max_iterations {
            monitors.push(Box::new(IterationLimitMonitor::new(max_iterations)));
        }
        Self {
            model,
            params,
            monitors,
        }
    }

    pub fn with_monitor(mut self, monitor: Box<dyn SearchMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    /// Pre-checks, constructs a first solution and improves it until a monitor stops the search.
    pub fn run(mut self) -> SolverResult<SearchOutcome> {
        self.model.check_feasibility()?;
        let initial = construct(self.model, self.params.first_solution)?;
        Ok(self.improve(initial))
    }

    fn poll(&mut self, statistics: &SearchStatistics) -> SearchCommand {
        for monitor in self.monitors.iter_mut() {
            if let SearchCommand::Terminate(reason) = monitor.search_command(statistics) {
                debug!("{} requested termination: {}", monitor.name(), reason);
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    pub fn improve(&mut self, initial: Solution) -> SearchOutcome {
        let span = span!(Level::INFO, "guided_local_search");
        let _guard = span.enter();

        let started = Instant::now();
        let model = self.model;
        let route_costs: Vec<f64> = initial
            .routes()
            .iter()
            .enumerate()
            .map(|(vehicle, route)| model.route_cost(vehicle, route))
            .collect();

        // lambda stays zero until the first local optimum, so both caches agree
        let mut state = SearchState {
            augmented_costs: route_costs.clone(),
            route_costs,
            best: initial.clone(),
            current: initial,
            penalties: ArcPenalties::new(model.problem().num_locations()),
            statistics: SearchStatistics::default(),
            progress: vec![],
        };
        let initial_cost = state.best.objective();
        state.progress.push(ProgressPoint {
            iteration: 0,
            elapsed_ms: 0,
            best_cost: initial_cost,
        });

        for monitor in self.monitors.iter_mut() {
            monitor.on_start();
        }

        let termination = loop {
            state.statistics.elapsed = started.elapsed();
            if let SearchCommand::Terminate(reason) = self.poll(&state.statistics) {
                break reason;
            }

            let moves = generate_moves(state.current.routes(), self.params.max_or_opt_segment);
            if moves.is_empty() {
                break "neighbourhood exhausted".to_string();
            }
            state.statistics.iterations += 1;

            let candidate = {
                let objective = AugmentedObjective::new(model, &state.penalties);
                best_candidate(
                    &moves,
                    state.current.routes(),
                    &state.augmented_costs,
                    model,
                    &objective,
                )
            };

            match candidate {
                Some(candidate) if candidate.delta < -IMPROVEMENT_EPSILON => {
                    trace!("Applying {} ({:.4}): {:?}", candidate.mv.kind(), candidate.delta, candidate.mv);
                    let touched = candidate.mv.apply(state.current.routes());
                    self.apply(&mut state, touched);
                    if state.current.objective() < state.best.objective() - IMPROVEMENT_EPSILON {
                        self.record_best(&mut state, started);
                    }
                }
                _ => {
                    state.statistics.local_optima += 1;
                    let penalised = penalize_local_optimum(
                        model,
                        state.current.routes(),
                        &mut state.penalties,
                        self.params.gls_lambda_coefficient,
                    );
                    state.statistics.penalised_arcs += penalised as u64;
                    state.augmented_costs = AugmentedObjective::new(model, &state.penalties)
                        .route_costs(state.current.routes());
                    trace!(
                        "Local optimum {} at cost {:.2}, penalised {} arcs",
                        state.statistics.local_optima,
                        state.current.objective(),
                        penalised
                    );
                }
            }
        };

        state.statistics.elapsed = started.elapsed();
        info!(
            "Search finished ({}): best cost {:.2} after {} iterations, {} local optima",
            termination,
            state.best.objective(),
            state.statistics.iterations,
            state.statistics.local_optima
        );

        SearchOutcome {
            solution: state.best,
            initial_cost,
            statistics: state.statistics,
            progress: state.progress,
            termination,
        }
    }

    fn apply(&self, state: &mut SearchState, touched: Vec<(usize, Vec<usize>)>) {
        let objective = AugmentedObjective::new(self.model, &state.penalties);
        for (vehicle, route) in touched {
            state.augmented_costs[vehicle] = objective.route_cost(vehicle, &route);
            state.route_costs[vehicle] = self.model.route_cost(vehicle, &route);
            state.current.routes_mut()[vehicle] = route;
        }
        let total = state.route_costs.iter().sum();
        state.current.set_objective(total);
        state.statistics.moves_applied += 1;
    }

    fn record_best(&mut self, state: &mut SearchState, started: Instant) {
        state.best = state.current.clone();
        state.statistics.improvements += 1;
        state.progress.push(ProgressPoint {
            iteration: state.statistics.iterations,
            elapsed_ms: started.elapsed().as_millis() as u64,
            best_cost: state.best.objective(),
        });
        debug!(
            "New best at iteration {}: cost = {:.2}",
            state.statistics.iterations,
            state.best.objective()
        );
        for monitor in self.monitors.iter_mut() {
            monitor.on_best_solution_updated(state.best.objective(), &state.statistics);
        }
    }
}

/// Builds the routing model for `problem` and runs a full solve.
pub fn solve(problem: &ProblemInstance, params: &SearchParameters) -> SolverResult<SearchOutcome> {
    let model = RoutingModel::new(problem);
    GuidedLocalSearch::new(&model, params.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::domain::types::ProblemData;
    use crate::fixtures::data_generator::generate_random_input;
    use crate::setup::init::build_problem;
    use std::time::Duration;

    /// Ends the search right after the first local optimum is penalised.
    struct FirstLocalOptimum;

    impl SearchMonitor for FirstLocalOptimum {
        fn name(&self) -> &str {
            "FirstLocalOptimum"
        }

        fn search_command(&mut self, statistics: &SearchStatistics) -> SearchCommand {
            if statistics.local_optima >= 1 {
                return SearchCommand::Terminate("first local optimum".to_string());
            }
            SearchCommand::Continue
        }
    }

    fn square_problem() -> ProblemInstance {
        // Depot at the origin, four customers on the corners of a square.
        let points = [(0.0, 0.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)];
        let distance_matrix = points
            .iter()
            .map(|a| {
                points
                    .iter()
                    .map(|b: &(f64, f64)| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        ProblemInstance::new(ProblemData {
            distance_matrix,
            weight_demands: vec![0.0, 2.0, 2.0, 2.0, 2.0],
            volume_demands: vec![0.0, 1.0, 1.0, 1.0, 1.0],
            max_weight: vec![4.0, 4.0, 8.0],
            max_volume: vec![4.0, 4.0, 4.0],
            fixed_costs: vec![5.0, 5.0, 5.0],
            per_km_costs: vec![1.0, 1.0, 1.0],
            num_vehicles: 3,
            depot: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn search_never_returns_worse_than_construction() {
        let problem = square_problem();
        let params = SearchParameters::default()
            .with_time_limit(Duration::from_secs(5))
            .with_max_iterations(200);
        let outcome = solve(&problem, &params).unwrap();

        let model = RoutingModel::new(&problem);
        assert!(outcome.solution.objective() <= outcome.initial_cost + 1e-9);
        assert!(outcome.solution.covers_all(model.manager()));
        assert!((model.solution_cost(&outcome.solution) - outcome.solution.objective()).abs() < 1e-9);
        for vehicle in 0..3 {
            assert!(model.check_route(vehicle, outcome.solution.route(vehicle)).is_ok());
        }
        assert_eq!(outcome.termination, "iteration limit reached");
        assert_eq!(outcome.statistics.iterations, 200);
    }

    #[test]
    fn progress_is_strictly_decreasing() {
        let problem = square_problem();
        let params = SearchParameters::default().with_max_iterations(100);
        let outcome = solve(&problem, &params).unwrap();
        assert!(outcome
            .progress
            .windows(2)
            .all(|w| w[1].best_cost < w[0].best_cost));
        assert_eq!(
            outcome.progress.last().map(|p| p.best_cost),
            Some(outcome.solution.objective())
        );
    }

    #[test]
    fn fixed_iteration_budget_is_reproducible() {
        let problem = square_problem();
        let params = SearchParameters::default()
            .with_time_limit(Duration::from_secs(30))
            .with_max_iterations(50);
        let first = solve(&problem, &params).unwrap();
        let second = solve(&problem, &params).unwrap();
        assert_eq!(first.solution, second.solution);
    }

    #[test]
    fn single_customer_exhausts_neighbourhood() {
        let problem = ProblemInstance::new(ProblemData {
            distance_matrix: vec![vec![0.0, 3.0], vec![3.0, 0.0]],
            weight_demands: vec![0.0, 1.0],
            volume_demands: vec![0.0, 1.0],
            max_weight: vec![1.0],
            max_volume: vec![1.0],
            fixed_costs: vec![0.0],
            per_km_costs: vec![2.0],
            num_vehicles: 1,
            depot: 0,
            ..Default::default()
        })
        .unwrap();
        let outcome = solve(&problem, &SearchParameters::default()).unwrap();
        assert_eq!(outcome.termination, "neighbourhood exhausted");
        assert_eq!(outcome.solution.objective(), 12.0);
    }

    #[test]
    fn penalties_lead_past_the_first_local_optimum() {
        let problem =
            build_problem(generate_random_input(30, 5, 6), &SolverConfig::default()).unwrap();
        let model = RoutingModel::new(&problem);
        let params = SearchParameters::default().with_time_limit(Duration::from_secs(60));

        let descent = GuidedLocalSearch::new(&model, params.clone())
            .with_monitor(Box::new(FirstLocalOptimum))
            .run()
            .unwrap();
        assert_eq!(descent.termination, "first local optimum");
        assert_eq!(descent.statistics.local_optima, 1);

        let guided = GuidedLocalSearch::new(
            &model,
            params
                .with_time_limit(Duration::from_secs(20))
                .with_max_iterations(2_000),
        )
        .run()
        .unwrap();
        assert!(guided.statistics.local_optima > 1);
        assert!(guided.statistics.improvements > descent.statistics.improvements);
        assert!(guided.solution.objective() < descent.solution.objective() - 1e-6);
        assert!(guided.solution.covers_all(model.manager()));
    }
}
