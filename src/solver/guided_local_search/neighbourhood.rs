use rayon::prelude::*;

use crate::routing::model::RoutingModel;

use super::guidance::AugmentedObjective;

/// Smallest objective decrease that counts as an improvement.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// A local move over the current routes. Indices refer to positions inside routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Move `len` consecutive visits (Or-opt; a single visit when `len == 1`).
    /// `to_index` is the insertion slot in the target route after the segment left.
    Relocate {
        from_vehicle: usize,
        from_index: usize,
        len: usize,
        to_vehicle: usize,
        to_index: usize,
    },
    /// Swap two visits.
    Exchange {
        first_vehicle: usize,
        first_index: usize,
        second_vehicle: usize,
        second_index: usize,
    },
    /// Reverse `route[start..=end]` of one vehicle.
    TwoOpt {
        vehicle: usize,
        start: usize,
        end: usize,
    },
}

impl Move {
    pub fn kind(&self) -> &'static str {
        match self {
            Move::Relocate { len: 1, .. } => "relocate",
            Move::Relocate { .. } => "or-opt",
            Move::Exchange { .. } => "exchange",
            Move::TwoOpt { .. } => "2-opt",
        }
    }

    /// The routes touched by the move, with their new contents.
    pub fn apply(&self, routes: &[Vec<usize>]) -> Vec<(usize, Vec<usize>)> {
        match *self {
            Move::Relocate {
                from_vehicle,
                from_index,
                len,
                to_vehicle,
                to_index,
            } => {
                let mut from = routes[from_vehicle].clone();
                let segment: Vec<usize> = from.drain(from_index..from_index + len).collect();
                if from_vehicle == to_vehicle {
                    from.splice(to_index..to_index, segment);
                    vec![(from_vehicle, from)]
                } else {
                    let mut to = routes[to_vehicle].clone();
                    to.splice(to_index..to_index, segment);
                    vec![(from_vehicle, from), (to_vehicle, to)]
                }
            }
            Move::Exchange {
                first_vehicle,
                first_index,
                second_vehicle,
                second_index,
            } => {
                if first_vehicle == second_vehicle {
                    let mut route = routes[first_vehicle].clone();
                    route.swap(first_index, second_index);
                    vec![(first_vehicle, route)]
                } else {
                    let mut first = routes[first_vehicle].clone();
                    let mut second = routes[second_vehicle].clone();
                    std::mem::swap(&mut first[first_index], &mut second[second_index]);
                    vec![(first_vehicle, first), (second_vehicle, second)]
                }
            }
            Move::TwoOpt {
                vehicle,
                start,
                end,
            } => {
                let mut route = routes[vehicle].clone();
                route[start..=end].reverse();
                vec![(vehicle, route)]
            }
        }
    }
}

/// Every move of the neighbourhood in a fixed scan order:
/// relocate/or-opt, then exchange, then 2-opt, each nested by vehicle and index.
pub fn generate_moves(routes: &[Vec<usize>], max_segment: usize) -> Vec<Move> {
    let vehicles = routes.len();
    let mut moves = vec![];

    for from_vehicle in 0..vehicles {
        let from_len = routes[from_vehicle].len();
        for from_index in 0..from_len {
            for len in 1..=max_segment.min(from_len - from_index) {
                for to_vehicle in 0..vehicles {
                    if to_vehicle == from_vehicle {
                        for to_index in 0..=(from_len - len) {
                            if to_index != from_index {
                                moves.push(Move::Relocate {
                                    from_vehicle,
                                    from_index,
                                    len,
                                    to_vehicle,
                                    to_index,
                                });
                            }
                        }
                    } else {
                        for to_index in 0..=routes[to_vehicle].len() {
                            moves.push(Move::Relocate {
                                from_vehicle,
                                from_index,
                                len,
                                to_vehicle,
                                to_index,
                            });
                        }
                    }
                }
            }
        }
    }

    for first_vehicle in 0..vehicles {
        for first_index in 0..routes[first_vehicle].len() {
            for second_vehicle in first_vehicle..vehicles {
                let second_start = if second_vehicle == first_vehicle {
                    // adjacent swaps are covered by 2-opt
                    first_index + 2
                } else {
                    0
                };
                for second_index in second_start..routes[second_vehicle].len() {
                    moves.push(Move::Exchange {
                        first_vehicle,
                        first_index,
                        second_vehicle,
                        second_index,
                    });
                }
            }
        }
    }

    for (vehicle, route) in routes.iter().enumerate() {
        for start in 0..route.len() {
            for end in start + 1..route.len() {
                moves.push(Move::TwoOpt {
                    vehicle,
                    start,
                    end,
                });
            }
        }
    }

    moves
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    pub delta: f64,
}

/// Augmented objective change of a move, or `None` when a touched route would
/// break a capacity dimension.
fn evaluate_move(
    mv: &Move,
    routes: &[Vec<usize>],
    route_costs: &[f64],
    model: &RoutingModel,
    objective: &AugmentedObjective,
) -> Option<f64> {
    let mut delta = 0.0;
    for (vehicle, route) in mv.apply(routes) {
        if model.check_route(vehicle, &route).is_err() {
            return None;
        }
        delta += objective.route_cost(vehicle, &route) - route_costs[vehicle];
    }
    Some(delta)
}

/// Scores the neighbourhood in parallel and returns the minimum-delta feasible
/// move. Ties go to the earliest move in scan order.
pub fn best_candidate(
    moves: &[Move],
    routes: &[Vec<usize>],
    route_costs: &[f64],
    model: &RoutingModel,
    objective: &AugmentedObjective,
) -> Option<Candidate> {
    let deltas: Vec<Option<f64>> = moves
        .par_iter()
        .map(|mv| evaluate_move(mv, routes, route_costs, model, objective))
        .collect();

    let mut best: Option<Candidate> = None;
    for (mv, delta) in moves.iter().zip(deltas) {
        let Some(delta) = delta else { continue };
        if best.map_or(true, |b| delta < b.delta) {
            best = Some(Candidate { mv: *mv, delta });
        }
    }
    best
}
