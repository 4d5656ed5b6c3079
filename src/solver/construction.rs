use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, info, span, trace, Level};

use crate::domain::solution::Solution;
use crate::error::{SolverError, SolverResult};
use crate::routing::model::RoutingModel;

/// Heuristic used to build the first feasible solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Repeatedly insert the unplaced location whose cheapest feasible insertion,
    /// over every vehicle and route slot, raises the objective the least.
    #[default]
    CheapestInsertion,
    /// Grow each vehicle's path by its cheapest feasible outgoing arc; whatever is
    /// left over is placed by cheapest insertion.
    PathCheapestArc,
}

impl Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheapestInsertion => write!(f, "cheapest_insertion"),
            Self::PathCheapestArc => write!(f, "path_cheapest_arc"),
        }
    }
}

impl FromStr for FirstSolutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cheapest_insertion" => Ok(Self::CheapestInsertion),
            "path_cheapest_arc" => Ok(Self::PathCheapestArc),
            other => Err(format!("unknown first solution strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Insertion {
    position: usize,
    vehicle: usize,
    index: usize,
    delta: f64,
}

/// Partial assignment under construction.
struct Builder<'m, 'p> {
    model: &'m RoutingModel<'p>,
    routes: Vec<Vec<usize>>,
    loads: Vec<Vec<f64>>,
    unplaced: Vec<usize>,
}

impl<'m, 'p> Builder<'m, 'p> {
    fn new(model: &'m RoutingModel<'p>) -> Self {
        let vehicles = model.num_vehicles();
        Self {
            model,
            routes: vec![vec![]; vehicles],
            loads: vec![vec![0.0; model.dimensions().len()]; vehicles],
            unplaced: model
                .problem()
                .customers()
                .filter_map(|location| model.manager().location_to_position(location))
                .collect(),
        }
    }

    fn fits(&self, vehicle: usize, position: usize) -> bool {
        let demands = self.model.location_demands(self.model.location(position));
        self.model.fits_with(vehicle, &self.loads[vehicle], &demands)
    }

    fn place(&mut self, position: usize, vehicle: usize, index: usize) {
        let demands = self.model.location_demands(self.model.location(position));
        for (load, demand) in self.loads[vehicle].iter_mut().zip(demands) {
            *load += demand;
        }
        self.routes[vehicle].insert(index, position);
        self.unplaced.retain(|&p| p != position);
        trace!("Placed position {} on vehicle {} at index {}", position, vehicle, index);
    }

    /// Objective increase of putting `position` before `index` on `vehicle`.
    fn insertion_delta(&self, position: usize, vehicle: usize, index: usize) -> f64 {
        let cost = self.model.cost();
        let depot = cost.depot();
        let route = &self.routes[vehicle];
        let location = self.model.location(position);

        if route.is_empty() {
            return cost.fixed_cost(vehicle)
                + cost.arc_cost(vehicle, depot, location)
                + cost.arc_cost(vehicle, location, depot);
        }

        let prev = if index == 0 {
            depot
        } else {
            self.model.location(route[index - 1])
        };
        let next = route
            .get(index)
            .map_or(depot, |&p| self.model.location(p));

        cost.arc_cost(vehicle, prev, location) + cost.arc_cost(vehicle, location, next)
            - cost.arc_cost(vehicle, prev, next)
    }

    fn cheapest_insertion(&self) -> Option<Insertion> {
        let mut best: Option<Insertion> = None;
        for &position in &self.unplaced {
            for vehicle in 0..self.routes.len() {
                if !self.fits(vehicle, position) {
                    continue;
                }
                for index in 0..=self.routes[vehicle].len() {
                    let delta = self.insertion_delta(position, vehicle, index);
                    if best.map_or(true, |b| delta < b.delta) {
                        best = Some(Insertion {
                            position,
                            vehicle,
                            index,
                            delta,
                        });
                    }
                }
            }
        }
        best
    }

    fn fill_by_insertion(&mut self) -> SolverResult<()> {
        while !self.unplaced.is_empty() {
            match self.cheapest_insertion() {
                Some(ins) => self.place(ins.position, ins.vehicle, ins.index),
                None => {
                    let stranded: Vec<usize> = self
                        .unplaced
                        .iter()
                        .map(|&p| self.model.location(p))
                        .collect();
                    return Err(SolverError::NoSolutionFound(format!(
                        "no feasible insertion left for locations {:?}",
                        stranded
                    )));
                }
            }
        }
        Ok(())
    }

    fn extend_paths_by_cheapest_arc(&mut self) {
        let depot = self.model.cost().depot();
        for vehicle in 0..self.routes.len() {
            let mut current = depot;
            loop {
                let mut best: Option<(usize, f64)> = None;
                for &position in &self.unplaced {
                    if !self.fits(vehicle, position) {
                        continue;
                    }
                    let arc = self
                        .model
                        .cost()
                        .arc_cost(vehicle, current, self.model.location(position));
                    if best.map_or(true, |(_, c)| arc < c) {
                        best = Some((position, arc));
                    }
                }
                let Some((position, _)) = best else { break };
                let index = self.routes[vehicle].len();
                self.place(position, vehicle, index);
                current = self.model.location(position);
            }
        }
    }

    fn finish(self) -> Solution {
        let mut solution = Solution::new(self.routes, 0.0);
        let objective = self.model.solution_cost(&solution);
        solution.set_objective(objective);
        solution
    }
}

/// Builds an initial solution that covers every location and respects every dimension.
pub fn construct(model: &RoutingModel, strategy: FirstSolutionStrategy) -> SolverResult<Solution> {
    let span = span!(Level::INFO, "construction", strategy = %strategy);
    let _guard = span.enter();

    let mut builder = Builder::new(model);
    if strategy == FirstSolutionStrategy::PathCheapestArc {
        builder.extend_paths_by_cheapest_arc();
        debug!(
            "Cheapest-arc paths left {} locations unplaced",
            builder.unplaced.len()
        );
    }
    builder.fill_by_insertion()?;

    let solution = builder.finish();
    info!(
        "Initial solution: cost {:.2}, {} vehicles used",
        solution.objective(),
        solution.vehicles_used()
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ProblemData, ProblemInstance};

    fn line_problem(max_weight: Vec<f64>, weights: Vec<f64>) -> ProblemInstance {
        // Locations on a line at x = 0, 1, 2, 3.
        let n = weights.len();
        let v = max_weight.len();
        let distance_matrix = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        ProblemInstance::new(ProblemData {
            distance_matrix,
            volume_demands: vec![0.0; n],
            weight_demands: weights,
            max_weight,
            max_volume: vec![1.0; v],
            fixed_costs: vec![10.0; v],
            per_km_costs: vec![1.0; v],
            num_vehicles: v,
            depot: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn strategy_parses_from_config_strings() {
        assert_eq!(
            "PATH-CHEAPEST-ARC".parse::<FirstSolutionStrategy>(),
            Ok(FirstSolutionStrategy::PathCheapestArc)
        );
        assert!("savings".parse::<FirstSolutionStrategy>().is_err());
    }

    #[test]
    fn insertion_fills_one_vehicle_when_it_fits() {
        let problem = line_problem(vec![10.0, 10.0], vec![0.0, 1.0, 1.0, 1.0]);
        let model = RoutingModel::new(&problem);
        let solution = construct(&model, FirstSolutionStrategy::CheapestInsertion).unwrap();

        assert!(solution.covers_all(model.manager()));
        assert_eq!(solution.vehicles_used(), 1);
        assert_eq!(solution.objective(), 10.0 + 6.0);
    }

    #[test]
    fn insertion_respects_capacity() {
        let problem = line_problem(vec![2.0, 2.0], vec![0.0, 1.0, 1.0, 1.0]);
        let model = RoutingModel::new(&problem);
        for strategy in [
            FirstSolutionStrategy::CheapestInsertion,
            FirstSolutionStrategy::PathCheapestArc,
        ] {
            let solution = construct(&model, strategy).unwrap();
            assert!(solution.covers_all(model.manager()));
            for vehicle in 0..2 {
                assert!(model.check_route(vehicle, solution.route(vehicle)).is_ok());
            }
            assert_eq!(solution.vehicles_used(), 2);
        }
    }

    #[test]
    fn bin_packing_failure_is_no_solution_found() {
        // Aggregate capacity suffices (12 >= 12) but each vehicle holds a single 4.
        let problem = line_problem(vec![5.0, 7.0], vec![0.0, 4.0, 4.0, 4.0]);
        let model = RoutingModel::new(&problem);
        assert!(model.check_feasibility().is_ok());
        let result = construct(&model, FirstSolutionStrategy::CheapestInsertion);
        assert!(matches!(result, Err(SolverError::NoSolutionFound(_))));
    }
}
