use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::constant::{FIXTURE_LOCATION_COUNT, FIXTURE_VEHICLE_COUNT};
use crate::setup::init_types::InputData;

/// Generates random depot-centred coordinates on a 100 x 100 grid.
/// The depot is always the first point.
fn generate_points(rng: &mut ChaCha8Rng, num_locations: usize) -> Vec<(f64, f64)> {
    let mut points = vec![(50.0, 50.0)];
    for _ in 1..num_locations {
        points.push((
            rng.gen_range(0..=100) as f64,
            rng.gen_range(0..=100) as f64,
        ));
    }
    points
}

/// Symmetric euclidean distances rounded to one decimal.
fn distance_matrix(points: &[(f64, f64)]) -> Vec<Vec<f64>> {
    points
        .iter()
        .map(|a| {
            points
                .iter()
                .map(|b| {
                    let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                    (d * 10.0).round() / 10.0
                })
                .collect()
        })
        .collect()
}

/// Generates a random instance in the input-file layout.
///
/// Every customer gets one to three shipments. Each vehicle holds at least twice
/// its even share of the total demand plus the largest location, per resource,
/// so greedy insertion always places every location.
pub fn generate_random_input(num_locations: usize, num_vehicles: usize, seed: u64) -> InputData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points = generate_points(&mut rng, num_locations);

    let locations: Vec<String> = (0..num_locations).map(|i| format!("loc{i}")).collect();
    let mut location_matrix = vec![];
    let mut weight_matrix = vec![];
    let mut volume_matrix = vec![];
    let mut location_weight = vec![0.0; num_locations];
    let mut location_volume = vec![0.0; num_locations];

    for loc in 1..num_locations {
        for _ in 0..rng.gen_range(1..=3) {
            let weight = rng.gen_range(5..=60) as f64;
            let volume = rng.gen_range(1..=12) as f64;
            location_matrix.push(locations[loc].clone());
            weight_matrix.push(weight);
            volume_matrix.push(volume);
            location_weight[loc] += weight;
            location_volume[loc] += volume;
        }
    }

    let fleet = num_vehicles.max(1) as f64;
    let total_weight: f64 = location_weight.iter().sum();
    let total_volume: f64 = location_volume.iter().sum();
    let heaviest = location_weight.iter().copied().fold(0.0, f64::max);
    let bulkiest = location_volume.iter().copied().fold(0.0, f64::max);
    let weight_cap = (2.0 * total_weight / fleet + heaviest).ceil();
    let volume_cap = (2.0 * total_volume / fleet + bulkiest).ceil();

    let mut max_weight = vec![];
    let mut max_volume = vec![];
    let mut fixed_costs = vec![];
    let mut per_km_costs = vec![];
    for _ in 0..num_vehicles {
        // larger trucks cost more to dispatch but less per km
        let size = rng.gen_range(0..=2) as f64;
        max_weight.push(weight_cap * (1.0 + 0.5 * size));
        max_volume.push(volume_cap * (1.0 + 0.5 * size));
        fixed_costs.push(rng.gen_range(100..=200) as f64 * (1.0 + size));
        per_km_costs.push(rng.gen_range(10..=30) as f64 / 10.0 / (1.0 + 0.25 * size));
    }

    info!(
        "Generated random instance: {} locations, {} shipments, {} vehicles (seed {})",
        num_locations,
        location_matrix.len(),
        num_vehicles,
        seed
    );

    InputData {
        weight_matrix,
        volume_matrix,
        location_matrix,
        distance: distance_matrix(&points),
        max_weight,
        max_volume,
        fixed_cost_per_vehicle: fixed_costs,
        per_km_cost_per_vehicle: per_km_costs,
        locations: Some(locations),
    }
}

/// The instance used when no input file is available: depot plus seven locations, six vehicles.
pub fn default_fixture(seed: u64) -> InputData {
    generate_random_input(FIXTURE_LOCATION_COUNT, FIXTURE_VEHICLE_COUNT, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_instance() {
        assert_eq!(generate_random_input(10, 3, 7), generate_random_input(10, 3, 7));
        assert_ne!(generate_random_input(10, 3, 7), generate_random_input(10, 3, 8));
    }

    #[test]
    fn shapes_are_consistent() {
        let input = default_fixture(12345);
        assert_eq!(input.distance.len(), FIXTURE_LOCATION_COUNT);
        assert!(input.distance.iter().all(|row| row.len() == FIXTURE_LOCATION_COUNT));
        assert_eq!(input.fleet_size(), FIXTURE_VEHICLE_COUNT);
        assert_eq!(input.shipments().unwrap().len(), input.location_matrix.len());
        assert!(!input.location_matrix.contains(&"loc0".to_string()));
    }

    #[test]
    fn fleet_can_carry_total_demand() {
        let input = generate_random_input(20, 4, 99);
        let total: f64 = input.weight_matrix.iter().sum();
        let capacity: f64 = input.max_weight.iter().sum();
        assert!(capacity >= total);
    }
}
