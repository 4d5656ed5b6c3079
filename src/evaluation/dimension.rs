use std::fmt::Display;

use crate::config::constant::CAPACITY_EPSILON;
use crate::domain::types::{ProblemInstance, Resource};

/// Cumulative resource tracker attached to every route.
///
/// The cumul is zero at each route start and grows by the demand of each visited
/// location. There is no slack: nothing is carried between arcs or between vehicles.
/// Demands are non-negative, so the cumul is non-decreasing along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityDimension {
    resource: Resource,
    demands: Vec<f64>,
    capacities: Vec<f64>,
}

/// A route whose cumul exceeds the vehicle's capacity at some visit.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionViolation {
    pub resource: Resource,
    pub vehicle: usize,
    pub visit: usize,
    pub cumul: f64,
    pub capacity: f64,
}

impl Display for DimensionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cumul {} exceeds capacity {} of vehicle {} at visit {}",
            self.resource, self.cumul, self.capacity, self.vehicle, self.visit
        )
    }
}

impl CapacityDimension {
    pub fn new(resource: Resource, demands: Vec<f64>, capacities: Vec<f64>) -> Self {
        Self {
            resource,
            demands,
            capacities,
        }
    }

    pub fn from_problem(problem: &ProblemInstance, resource: Resource) -> Self {
        Self::new(
            resource,
            problem.demands(resource).to_vec(),
            problem.capacities(resource),
        )
    }

    pub fn name(&self) -> &'static str {
        self.resource.name()
    }

    pub fn demand(&self, location: usize) -> f64 {
        self.demands[location]
    }

    pub fn capacity(&self, vehicle: usize) -> f64 {
        self.capacities[vehicle]
    }

    pub fn total_demand(&self) -> f64 {
        self.demands.iter().sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.capacities.iter().sum()
    }

    pub fn fits(&self, vehicle: usize, load: f64) -> bool {
        load <= self.capacities[vehicle] + CAPACITY_EPSILON
    }

    /// Cumul after each visit of `locations`, preceded by the zero start cumul.
    pub fn cumuls<I>(&self, locations: I) -> Vec<f64>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut cumul = 0.0;
        let mut out = vec![cumul];
        for location in locations {
            cumul += self.demands[location];
            out.push(cumul);
        }
        out
    }

    pub fn route_load<I>(&self, locations: I) -> f64
    where
        I: IntoIterator<Item = usize>,
    {
        locations.into_iter().map(|loc| self.demands[loc]).sum()
    }

    /// Walks the route and reports the first visit whose cumul exceeds capacity.
    pub fn check_route<I>(&self, vehicle: usize, locations: I) -> Result<(), DimensionViolation>
    where
        I: IntoIterator<Item = usize>,
    {
        let capacity = self.capacities[vehicle];
        let mut cumul = 0.0;
        for (visit, location) in locations.into_iter().enumerate() {
            cumul += self.demands[location];
            if cumul > capacity + CAPACITY_EPSILON {
                return Err(DimensionViolation {
                    resource: self.resource,
                    vehicle,
                    visit,
                    cumul,
                    capacity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight() -> CapacityDimension {
        CapacityDimension::new(Resource::Weight, vec![0.0, 3.0, 4.0, 5.0], vec![10.0, 6.0])
    }

    #[test]
    fn cumul_starts_at_zero_and_is_monotone() {
        let cumuls = weight().cumuls([2, 1, 3]);
        assert_eq!(cumuls, vec![0.0, 4.0, 7.0, 12.0]);
        assert!(cumuls.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn check_route_reports_first_overflow() {
        let dim = weight();
        assert!(dim.check_route(0, [1, 2]).is_ok());

        let violation = dim.check_route(1, [1, 2, 3]).unwrap_err();
        assert_eq!(violation.vehicle, 1);
        assert_eq!(violation.visit, 1);
        assert_eq!(violation.cumul, 7.0);
        assert_eq!(violation.capacity, 6.0);
    }

    #[test]
    fn exact_capacity_fits() {
        let dim = weight();
        assert!(dim.fits(1, 6.0));
        assert!(!dim.fits(1, 6.5));
        assert_eq!(dim.route_load([1, 3]), 8.0);
        assert_eq!(dim.total_capacity(), 16.0);
        assert_eq!(dim.total_demand(), 12.0);
    }
}
