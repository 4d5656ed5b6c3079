use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info, span, Level};

use crate::config::SolverConfig;
use crate::domain::types::{ProblemData, ProblemInstance};
use crate::error::{SolverError, SolverResult};
use crate::setup::aggregate::aggregate_demands;
use crate::setup::init_types::InputData;

/// Reads an instance file: shipment columns, distance matrix and fleet vectors.
pub fn load_input(path: &Path) -> SolverResult<InputData> {
    let reader = BufReader::new(File::open(path)?);
    let input: InputData = serde_json::from_reader(reader)?;
    info!(
        "Loaded {} shipments and {} vehicles from {}",
        input.location_matrix.len(),
        input.fleet_size(),
        path.display()
    );
    Ok(input)
}

/// Aggregates shipments and validates the result into a frozen instance.
pub fn build_problem(input: InputData, config: &SolverConfig) -> SolverResult<ProblemInstance> {
    let span = span!(Level::INFO, "setup");
    let _guard = span.enter();

    let num_vehicles = input.fleet_size();
    if let Some(configured) = config.num_vehicles {
        if configured != num_vehicles {
            return Err(SolverError::validation(format!(
                "configured vehicle count {configured} disagrees with {num_vehicles} vehicle capacities"
            )));
        }
    }

    let canonical = input.canonical_locations();
    let (weight_demands, volume_demands) = aggregate_demands(&input.shipments()?, &canonical)?;
    debug!("Weight demands: {:?}", weight_demands);
    debug!("Volume demands: {:?}", volume_demands);
    print_dist_matrix(&input.distance);

    let problem = ProblemInstance::new(ProblemData {
        location_names: canonical,
        distance_matrix: input.distance,
        weight_demands,
        volume_demands,
        max_weight: input.max_weight,
        max_volume: input.max_volume,
        fixed_costs: input.fixed_cost_per_vehicle,
        per_km_costs: input.per_km_cost_per_vehicle,
        num_vehicles,
        depot: config.depot,
    })?;

    info!(
        "Setup completed: {} locations, {} vehicles, depot {}",
        problem.num_locations(),
        problem.num_vehicles(),
        problem.depot()
    );
    Ok(problem)
}

// Print distance matrix for debugging
pub fn print_dist_matrix(dist_m: &[Vec<f64>]) {
    debug!("Distance matrix:");
    for row in dist_m {
        debug!("{:?}", row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Resource;

    fn input() -> InputData {
        InputData {
            weight_matrix: vec![2.0, 3.0, 1.0],
            volume_matrix: vec![1.0, 1.0, 4.0],
            location_matrix: vec!["b".into(), "c".into(), "b".into()],
            distance: vec![
                vec![0.0, 5.0, 7.0],
                vec![5.0, 0.0, 2.0],
                vec![7.0, 2.0, 0.0],
            ],
            max_weight: vec![10.0, 10.0],
            max_volume: vec![10.0, 10.0],
            fixed_cost_per_vehicle: vec![50.0, 60.0],
            per_km_cost_per_vehicle: vec![1.0, 1.5],
            locations: Some(vec!["a".into(), "b".into(), "c".into()]),
        }
    }

    #[test]
    fn builds_problem_from_named_locations() {
        let problem = build_problem(input(), &SolverConfig::default()).unwrap();
        assert_eq!(problem.demands(Resource::Weight), &[0.0, 3.0, 3.0]);
        assert_eq!(problem.demands(Resource::Volume), &[0.0, 5.0, 1.0]);
        assert_eq!(problem.location_name(1), "b");
        assert_eq!(problem.num_vehicles(), 2);
    }

    #[test]
    fn configured_vehicle_count_must_match() {
        let config = SolverConfig {
            num_vehicles: Some(6),
            ..SolverConfig::default()
        };
        assert!(matches!(
            build_problem(input(), &config),
            Err(SolverError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("cvrp-no-such-input.json");
        assert!(matches!(load_input(&path), Err(SolverError::Io(_))));
    }
}
