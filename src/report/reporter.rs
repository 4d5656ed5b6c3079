use serde::Serialize;

use crate::domain::solution::Solution;
use crate::domain::types::Resource;
use crate::routing::model::RoutingModel;

/// One stop of a route with the cumuls after servicing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitReport {
    pub location: usize,
    pub name: String,
    pub cumulative_weight: f64,
    pub cumulative_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub route_id: usize,
    pub vehicle_id: usize,
    /// Start depot, visits, end depot.
    pub visits: Vec<VisitReport>,
    pub route_distance: f64,
    pub distance_cost: f64,
    pub fixed_cost: f64,
    pub route_cost: f64,
    pub route_weight: f64,
    pub route_volume: f64,
    pub veh_max_weight: f64,
    pub veh_max_volume: f64,
}

impl RouteReport {
    pub fn is_used(&self) -> bool {
        self.visits.len() > 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total_distance: f64,
    pub total_cost: f64,
    pub total_weight: f64,
    pub total_volume: f64,
    pub vehicles_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReport {
    pub objective: f64,
    pub routes: Vec<RouteReport>,
    pub summary: FleetSummary,
}

/// Recomputes every per-route figure from the routing model. Never touches the solution.
pub fn build_report(model: &RoutingModel, solution: &Solution) -> SolutionReport {
    let problem = model.problem();
    let manager = model.manager();
    let cost = model.cost();

    let routes: Vec<RouteReport> = (0..solution.num_vehicles())
        .map(|vehicle| {
            let walk: Vec<usize> = solution
                .walk(vehicle, manager)
                .into_iter()
                .map(|p| manager.position_to_location(p))
                .collect();
            let visited = &walk[1..walk.len() - 1];

            let weight_cumuls = model.dimension(Resource::Weight).cumuls(visited.iter().copied());
            let volume_cumuls = model.dimension(Resource::Volume).cumuls(visited.iter().copied());
            // the end sentinel repeats the cumul of the last visit
            let visits = walk
                .iter()
                .enumerate()
                .map(|(step, &location)| {
                    let at = step.min(visited.len());
                    VisitReport {
                        location,
                        name: problem.location_name(location).to_string(),
                        cumulative_weight: weight_cumuls[at],
                        cumulative_volume: volume_cumuls[at],
                    }
                })
                .collect();
            let weight = weight_cumuls[visited.len()];
            let volume = volume_cumuls[visited.len()];

            let route_distance = cost.route_distance(visited);
            let distance_cost = cost.route_arc_cost(vehicle, visited);
            let fixed_cost = if visited.is_empty() {
                0.0
            } else {
                cost.fixed_cost(vehicle)
            };
            let truck = problem.vehicle(vehicle);

            RouteReport {
                route_id: vehicle,
                vehicle_id: vehicle,
                visits,
                route_distance,
                distance_cost,
                fixed_cost,
                route_cost: distance_cost + fixed_cost,
                route_weight: weight,
                route_volume: volume,
                veh_max_weight: truck.max_weight,
                veh_max_volume: truck.max_volume,
            }
        })
        .collect();

    let summary = FleetSummary {
        total_distance: routes.iter().map(|r| r.route_distance).sum(),
        total_cost: routes.iter().map(|r| r.route_cost).sum(),
        total_weight: routes.iter().map(|r| r.route_weight).sum(),
        total_volume: routes.iter().map(|r| r.route_volume).sum(),
        vehicles_used: routes.iter().filter(|r| r.is_used()).count(),
    };

    SolutionReport {
        objective: solution.objective(),
        routes,
        summary,
    }
}
