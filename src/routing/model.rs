use tracing::{debug, info};

use crate::config::constant::CAPACITY_EPSILON;
use crate::domain::solution::Solution;
use crate::domain::types::{ProblemInstance, Resource};
use crate::error::{SolverError, SolverResult};
use crate::evaluation::cost::CostModel;
use crate::evaluation::dimension::{CapacityDimension, DimensionViolation};
use crate::routing::index_manager::RouteIndexManager;

/// The routing graph a solve runs on: index manager, capacity dimensions and
/// per-vehicle cost model, all built over one borrowed problem.
#[derive(Debug, Clone)]
pub struct RoutingModel<'p> {
    problem: &'p ProblemInstance,
    manager: RouteIndexManager,
    dimensions: Vec<CapacityDimension>,
    cost: CostModel<'p>,
}

impl<'p> RoutingModel<'p> {
    pub fn new(problem: &'p ProblemInstance) -> Self {
        let manager = RouteIndexManager::new(
            problem.num_locations(),
            problem.num_vehicles(),
            problem.depot(),
        );
        let dimensions = Resource::ALL
            .iter()
            .map(|&resource| CapacityDimension::from_problem(problem, resource))
            .collect();

        debug!(
            "Routing model: {} positions, {} vehicles",
            manager.num_positions(),
            manager.num_vehicles()
        );

        Self {
            problem,
            manager,
            dimensions,
            cost: CostModel::from_problem(problem),
        }
    }

    pub fn problem(&self) -> &'p ProblemInstance {
        self.problem
    }

    pub fn manager(&self) -> &RouteIndexManager {
        &self.manager
    }

    pub fn dimensions(&self) -> &[CapacityDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, resource: Resource) -> &CapacityDimension {
        &self.dimensions[resource.index()]
    }

    pub fn cost(&self) -> &CostModel<'p> {
        &self.cost
    }

    pub fn num_vehicles(&self) -> usize {
        self.manager.num_vehicles()
    }

    pub fn location(&self, position: usize) -> usize {
        self.manager.position_to_location(position)
    }

    pub fn locations(&self, positions: &[usize]) -> Vec<usize> {
        positions.iter().map(|&p| self.location(p)).collect()
    }

    pub fn route_cost(&self, vehicle: usize, positions: &[usize]) -> f64 {
        self.cost.route_cost(vehicle, &self.locations(positions))
    }

    pub fn solution_cost(&self, solution: &Solution) -> f64 {
        solution
            .routes()
            .iter()
            .enumerate()
            .map(|(vehicle, route)| self.route_cost(vehicle, route))
            .sum()
    }

    /// Final cumul of each dimension, in dimension order.
    pub fn route_loads(&self, positions: &[usize]) -> Vec<f64> {
        self.dimensions
            .iter()
            .map(|dim| dim.route_load(positions.iter().map(|&p| self.location(p))))
            .collect()
    }

    pub fn check_route(&self, vehicle: usize, positions: &[usize]) -> Result<(), DimensionViolation> {
        for dim in &self.dimensions {
            dim.check_route(vehicle, positions.iter().map(|&p| self.location(p)))?;
        }
        Ok(())
    }

    /// Whether a vehicle already carrying `loads` can also take `extra`.
    pub fn fits_with(&self, vehicle: usize, loads: &[f64], extra: &[f64]) -> bool {
        self.dimensions
            .iter()
            .zip(loads.iter().zip(extra))
            .all(|(dim, (load, add))| dim.fits(vehicle, load + add))
    }

    pub fn location_demands(&self, location: usize) -> Vec<f64> {
        self.dimensions.iter().map(|dim| dim.demand(location)).collect()
    }

    /// Rejects instances that no assignment can satisfy, before any search.
    pub fn check_feasibility(&self) -> SolverResult<()> {
        for dim in &self.dimensions {
            let demand = dim.total_demand();
            let capacity = dim.total_capacity();
            if demand > capacity + CAPACITY_EPSILON {
                return Err(SolverError::infeasible(format!(
                    "total {} demand {} exceeds fleet capacity {}",
                    dim.name(),
                    demand,
                    capacity
                )));
            }
        }

        let empty = vec![0.0; self.dimensions.len()];
        for location in self.problem.customers() {
            let demands = self.location_demands(location);
            let fits_somewhere =
                (0..self.num_vehicles()).any(|vehicle| self.fits_with(vehicle, &empty, &demands));
            if !fits_somewhere {
                return Err(SolverError::infeasible(format!(
                    "location {} ({}) does not fit any vehicle",
                    location,
                    self.problem.location_name(location)
                )));
            }
        }

        info!("Instance passed feasibility pre-checks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProblemData;

    fn problem(max_weight: Vec<f64>) -> ProblemInstance {
        let v = max_weight.len();
        ProblemInstance::new(ProblemData {
            distance_matrix: vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]],
            weight_demands: vec![0.0, 6.0, 6.0],
            volume_demands: vec![0.0, 1.0, 1.0],
            max_weight,
            max_volume: vec![10.0; v],
            fixed_costs: vec![0.0; v],
            per_km_costs: vec![1.0; v],
            num_vehicles: v,
            depot: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn registers_weight_and_volume_dimensions() {
        let p = problem(vec![10.0, 10.0]);
        let model = RoutingModel::new(&p);
        let names: Vec<&str> = model.dimensions().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Weight", "Volume"]);
        assert!(model.check_feasibility().is_ok());
    }

    #[test]
    fn aggregate_overflow_is_infeasible() {
        let p = problem(vec![5.0, 6.0]);
        let model = RoutingModel::new(&p);
        assert!(matches!(
            model.check_feasibility(),
            Err(SolverError::InfeasibleInstance(_))
        ));
    }

    #[test]
    fn oversized_location_is_infeasible() {
        let p = problem(vec![5.0, 5.0, 5.0]);
        let model = RoutingModel::new(&p);
        assert!(matches!(
            model.check_feasibility(),
            Err(SolverError::InfeasibleInstance(_))
        ));
    }

    #[test]
    fn check_route_uses_every_dimension() {
        let p = problem(vec![10.0, 10.0]);
        let model = RoutingModel::new(&p);
        let positions: Vec<usize> = model.manager().customer_positions().collect();
        let violation = model.check_route(0, &positions).unwrap_err();
        assert_eq!(violation.resource, Resource::Weight);
        assert_eq!(model.route_loads(&positions), vec![12.0, 2.0]);
    }
}
