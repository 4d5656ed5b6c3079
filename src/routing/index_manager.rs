//! Mapping between search positions and physical locations.
//!
//! Every non-depot location owns exactly one position. Each vehicle additionally
//! owns a start and an end sentinel; all sentinels denote the depot location but
//! remain distinguishable by position. Layout of the position space:
//!
//! `[customers in canonical order | start sentinel per vehicle | end sentinel per vehicle]`

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIndexManager {
    position_to_location: Vec<usize>,
    location_to_position: Vec<Option<usize>>,
    num_customers: usize,
    num_vehicles: usize,
    depot: usize,
}

impl RouteIndexManager {
    pub fn new(num_locations: usize, num_vehicles: usize, depot: usize) -> Self {
        debug_assert!(depot < num_locations, "depot {depot} out of range");

        let mut position_to_location = Vec::with_capacity(num_locations - 1 + 2 * num_vehicles);
        let mut location_to_position = vec![None; num_locations];
        for location in (0..num_locations).filter(|&loc| loc != depot) {
            location_to_position[location] = Some(position_to_location.len());
            position_to_location.push(location);
        }
        let num_customers = position_to_location.len();
        position_to_location.extend(std::iter::repeat(depot).take(2 * num_vehicles));

        Self {
            position_to_location,
            location_to_position,
            num_customers,
            num_vehicles,
            depot,
        }
    }

    pub fn num_positions(&self) -> usize {
        self.position_to_location.len()
    }

    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Positions that stand for real (non-depot) visits.
    pub fn customer_positions(&self) -> Range<usize> {
        0..self.num_customers
    }

    pub fn position_to_location(&self, position: usize) -> usize {
        self.position_to_location[position]
    }

    /// `None` for the depot, which is only reachable through sentinels.
    pub fn location_to_position(&self, location: usize) -> Option<usize> {
        self.location_to_position.get(location).copied().flatten()
    }

    pub fn location_start_position(&self, vehicle: usize) -> usize {
        debug_assert!(vehicle < self.num_vehicles);
        self.num_customers + vehicle
    }

    pub fn location_end_position(&self, vehicle: usize) -> usize {
        debug_assert!(vehicle < self.num_vehicles);
        self.num_customers + self.num_vehicles + vehicle
    }

    pub fn is_start(&self, position: usize) -> bool {
        (self.num_customers..self.num_customers + self.num_vehicles).contains(&position)
    }

    pub fn is_end(&self, position: usize) -> bool {
        (self.num_customers + self.num_vehicles..self.num_positions()).contains(&position)
    }

    pub fn is_terminal(&self, position: usize) -> bool {
        position >= self.num_customers && position < self.num_positions()
    }

    /// Owner of a start or end sentinel.
    pub fn terminal_vehicle(&self, position: usize) -> Option<usize> {
        if self.is_start(position) {
            Some(position - self.num_customers)
        } else if self.is_end(position) {
            Some(position - self.num_customers - self.num_vehicles)
        } else {
            None
        }
    }
}
