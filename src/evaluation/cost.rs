use itertools::Itertools;

use crate::domain::types::ProblemInstance;

pub fn dist_between(from_loc: usize, to_loc: usize, dm: &[Vec<f64>]) -> f64 {
    dm[from_loc][to_loc]
}

/// Arc cost of one vehicle: `per_km_cost * distance`. Bound by value per vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCostEvaluator {
    vehicle: usize,
    per_km_cost: f64,
}

impl ArcCostEvaluator {
    pub fn new(vehicle: usize, per_km_cost: f64) -> Self {
        Self {
            vehicle,
            per_km_cost,
        }
    }

    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    pub fn evaluate(&self, from: usize, to: usize, dm: &[Vec<f64>]) -> f64 {
        self.per_km_cost * dist_between(from, to, dm)
    }
}

/// Objective of a set of routes: per-vehicle arc costs plus the fixed cost of
/// every vehicle whose route visits at least one location.
#[derive(Debug, Clone)]
pub struct CostModel<'p> {
    distance_matrix: &'p [Vec<f64>],
    evaluators: Vec<ArcCostEvaluator>,
    fixed_costs: Vec<f64>,
    depot: usize,
}

impl<'p> CostModel<'p> {
    pub fn from_problem(problem: &'p ProblemInstance) -> Self {
        let evaluators = problem
            .vehicles()
            .iter()
            .enumerate()
            .map(|(vehicle, v)| ArcCostEvaluator::new(vehicle, v.per_km_cost))
            .collect();
        let fixed_costs = problem.vehicles().iter().map(|v| v.fixed_cost).collect();

        Self {
            distance_matrix: problem.distance_matrix(),
            evaluators,
            fixed_costs,
            depot: problem.depot(),
        }
    }

    pub fn evaluator(&self, vehicle: usize) -> &ArcCostEvaluator {
        &self.evaluators[vehicle]
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        dist_between(from, to, self.distance_matrix)
    }

    pub fn arc_cost(&self, vehicle: usize, from: usize, to: usize) -> f64 {
        self.evaluators[vehicle].evaluate(from, to, self.distance_matrix)
    }

    pub fn fixed_cost(&self, vehicle: usize) -> f64 {
        self.fixed_costs[vehicle]
    }

    /// Arcs of a closed tour `depot -> locations... -> depot`. Empty routes have no arcs.
    pub fn route_arcs<'a>(&self, locations: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let depot = self.depot;
        let closed = !locations.is_empty();
        std::iter::once(depot)
            .chain(locations.iter().copied())
            .chain(std::iter::once(depot))
            .tuple_windows()
            .filter(move |_| closed)
    }

    pub fn route_distance(&self, locations: &[usize]) -> f64 {
        self.route_arcs(locations)
            .map(|(from, to)| self.distance(from, to))
            .sum()
    }

    pub fn route_arc_cost(&self, vehicle: usize, locations: &[usize]) -> f64 {
        self.route_arcs(locations)
            .map(|(from, to)| self.arc_cost(vehicle, from, to))
            .sum()
    }

    pub fn route_cost(&self, vehicle: usize, locations: &[usize]) -> f64 {
        if locations.is_empty() {
            return 0.0;
        }
        self.fixed_cost(vehicle) + self.route_arc_cost(vehicle, locations)
    }
}
