use std::collections::HashMap;

use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// One raw shipment as it appears in the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRecord {
    pub location: String,
    pub weight: f64,
    pub volume: f64,
}

impl ShipmentRecord {
    pub fn new(location: impl Into<String>, weight: f64, volume: f64) -> Self {
        Self {
            location: location.into(),
            weight,
            volume,
        }
    }
}

/// Sums shipment weight and volume per location, indexed by the canonical order.
///
/// Locations without shipments get zero demand. A record naming a location
/// outside `canonical_locations` is rejected.
pub fn aggregate_demands(
    records: &[ShipmentRecord],
    canonical_locations: &[String],
) -> SolverResult<(Vec<f64>, Vec<f64>)> {
    let index: HashMap<&str, usize> = canonical_locations
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    if index.len() != canonical_locations.len() {
        return Err(SolverError::validation(
            "canonical location list contains duplicate identifiers",
        ));
    }

    let mut weights = vec![0.0; canonical_locations.len()];
    let mut volumes = vec![0.0; canonical_locations.len()];

    for record in records {
        let Some(&slot) = index.get(record.location.as_str()) else {
            return Err(SolverError::validation(format!(
                "shipment references unknown location '{}'",
                record.location
            )));
        };
        weights[slot] += record.weight;
        volumes[slot] += record.volume;
    }

    debug!(
        "Aggregated {} shipments into {} locations",
        records.len(),
        canonical_locations.len()
    );
    Ok((weights, volumes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> Vec<String> {
        (0..4).map(|i| format!("loc{i}")).collect()
    }

    #[test]
    fn sums_repeated_locations() {
        let records = vec![
            ShipmentRecord::new("loc2", 3.0, 1.0),
            ShipmentRecord::new("loc1", 4.0, 2.0),
            ShipmentRecord::new("loc2", 5.0, 0.5),
        ];
        let (weights, volumes) = aggregate_demands(&records, &canonical()).unwrap();
        assert_eq!(weights, vec![0.0, 4.0, 8.0, 0.0]);
        assert_eq!(volumes, vec![0.0, 2.0, 1.5, 0.0]);
    }

    #[test]
    fn absent_locations_default_to_zero() {
        let (weights, volumes) = aggregate_demands(&[], &canonical()).unwrap();
        assert_eq!(weights, vec![0.0; 4]);
        assert_eq!(volumes, vec![0.0; 4]);
    }

    #[test]
    fn unknown_location_is_rejected() {
        let records = vec![ShipmentRecord::new("loc9", 1.0, 1.0)];
        assert!(matches!(
            aggregate_demands(&records, &canonical()),
            Err(SolverError::Validation(_))
        ));
    }

    #[test]
    fn duplicate_canonical_names_are_rejected() {
        let names = vec!["a".to_string(), "a".to_string()];
        assert!(matches!(
            aggregate_demands(&[], &names),
            Err(SolverError::Validation(_))
        ));
    }
}
