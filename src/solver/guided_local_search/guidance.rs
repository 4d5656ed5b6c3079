use tracing::{debug, trace};

use crate::evaluation::penalty::ArcPenalties;
use crate::routing::model::RoutingModel;

/// Route cost as seen by the local search: true cost plus the weighted penalties
/// of every arc the route uses.
pub struct AugmentedObjective<'a, 'p> {
    model: &'a RoutingModel<'p>,
    penalties: &'a ArcPenalties,
}

impl<'a, 'p> AugmentedObjective<'a, 'p> {
    pub fn new(model: &'a RoutingModel<'p>, penalties: &'a ArcPenalties) -> Self {
        Self { model, penalties }
    }

    pub fn route_cost(&self, vehicle: usize, positions: &[usize]) -> f64 {
        let locations = self.model.locations(positions);
        let cost = self.model.cost();
        let penalty: f64 = cost
            .route_arcs(&locations)
            .map(|(from, to)| self.penalties.arc_penalty(from, to))
            .sum();
        cost.route_cost(vehicle, &locations) + penalty
    }

    pub fn route_costs(&self, routes: &[Vec<usize>]) -> Vec<f64> {
        routes
            .iter()
            .enumerate()
            .map(|(vehicle, route)| self.route_cost(vehicle, route))
            .collect()
    }
}

/// Raises the penalty of the maximum-utility arcs of a local optimum.
///
/// On the first call lambda is fixed to `coefficient * arc_cost / arcs`, the mean
/// arc cost of that local optimum scaled by the coefficient. Returns the number of
/// arcs penalised.
pub fn penalize_local_optimum(
    model: &RoutingModel,
    routes: &[Vec<usize>],
    penalties: &mut ArcPenalties,
    coefficient: f64,
) -> usize {
    let cost = model.cost();
    let mut features: Vec<(usize, usize, f64)> = vec![];
    for (vehicle, route) in routes.iter().enumerate() {
        let locations = model.locations(route);
        features.extend(
            cost.route_arcs(&locations)
                .map(|(from, to)| (from, to, cost.arc_cost(vehicle, from, to))),
        );
    }
    if features.is_empty() {
        return 0;
    }

    if penalties.lambda() == 0.0 {
        let arc_cost: f64 = features.iter().map(|f| f.2).sum();
        let lambda = if arc_cost > 0.0 {
            coefficient * arc_cost / features.len() as f64
        } else {
            coefficient
        };
        penalties.set_lambda(lambda);
        debug!("GLS lambda set to {:.4} from {} arcs", lambda, features.len());
    }

    let utilities: Vec<f64> = features
        .iter()
        .map(|&(from, to, c)| penalties.utility(from, to, c))
        .collect();
    let max_utility = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut penalised = 0;
    for (&(from, to, _), utility) in features.iter().zip(utilities) {
        if utility >= max_utility - f64::EPSILON * max_utility.abs().max(1.0) {
            penalties.increment(from, to);
            penalised += 1;
            trace!("Penalised arc {} -> {}", from, to);
        }
    }
    penalised
}
