use tracing::trace;

use crate::routing::index_manager::RouteIndexManager;

/// One route per vehicle, stored as the customer positions visited in order.
/// Start and end sentinels are implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    routes: Vec<Vec<usize>>,
    objective: f64,
}

impl Solution {
    pub fn new(routes: Vec<Vec<usize>>, objective: f64) -> Self {
        Self { routes, objective }
    }

    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> &[usize] {
        &self.routes[vehicle]
    }

    pub(crate) fn routes_mut(&mut self) -> &mut Vec<Vec<usize>> {
        &mut self.routes
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub(crate) fn set_objective(&mut self, objective: f64) {
        self.objective = objective;
    }

    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    pub fn is_used(&self, vehicle: usize) -> bool {
        !self.routes[vehicle].is_empty()
    }

    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    pub fn num_visits(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Full position walk of a vehicle, sentinels included.
    pub fn walk(&self, vehicle: usize, manager: &RouteIndexManager) -> Vec<usize> {
        let mut walk = Vec::with_capacity(self.routes[vehicle].len() + 2);
        walk.push(manager.location_start_position(vehicle));
        walk.extend_from_slice(&self.routes[vehicle]);
        walk.push(manager.location_end_position(vehicle));
        walk
    }

    /// Physical locations visited by a vehicle, depot excluded.
    pub fn route_locations(&self, vehicle: usize, manager: &RouteIndexManager) -> Vec<usize> {
        self.routes[vehicle]
            .iter()
            .map(|&p| manager.position_to_location(p))
            .collect()
    }

    /// Every customer position appears in exactly one route exactly once.
    pub fn covers_all(&self, manager: &RouteIndexManager) -> bool {
        let mut seen = vec![false; manager.num_positions()];
        for (vehicle, route) in self.routes.iter().enumerate() {
            for &position in route {
                if let Some(owner) = manager.terminal_vehicle(position) {
                    trace!("Route of vehicle {} holds a sentinel of vehicle {}", vehicle, owner);
                    return false;
                }
                if position >= seen.len() || seen[position] {
                    return false;
                }
                seen[position] = true;
            }
        }
        manager.customer_positions().all(|p| seen[p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_wraps_route_in_sentinels() {
        let manager = RouteIndexManager::new(4, 2, 0);
        let solution = Solution::new(vec![vec![2, 0], vec![1]], 0.0);

        let walk = solution.walk(0, &manager);
        assert_eq!(walk.first(), Some(&manager.location_start_position(0)));
        assert_eq!(walk.last(), Some(&manager.location_end_position(0)));
        assert_eq!(solution.route_locations(0, &manager), vec![3, 1]);
        assert_eq!(solution.vehicles_used(), 2);
        assert_eq!(solution.num_visits(), 3);
    }

    #[test]
    fn coverage_detects_missing_and_duplicate_visits() {
        let manager = RouteIndexManager::new(4, 2, 0);
        assert!(Solution::new(vec![vec![2, 0], vec![1]], 0.0).covers_all(&manager));
        assert!(!Solution::new(vec![vec![2, 0], vec![]], 0.0).covers_all(&manager));
        assert!(!Solution::new(vec![vec![2, 0], vec![1, 0]], 0.0).covers_all(&manager));
    }

    #[test]
    fn coverage_rejects_sentinels_inside_routes() {
        let manager = RouteIndexManager::new(4, 2, 0);
        let sentinel = manager.location_end_position(1);
        assert!(!Solution::new(vec![vec![2, 0, sentinel], vec![1]], 0.0).covers_all(&manager));
    }
}
