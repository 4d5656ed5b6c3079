use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

use super::aggregate::ShipmentRecord;

/// Struct to match the JSON structure of an instance file.
///
/// `weight_matrix`, `volume_matrix` and `location_matrix` are parallel
/// per-shipment columns, not matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    pub weight_matrix: Vec<f64>,
    pub volume_matrix: Vec<f64>,
    pub location_matrix: Vec<String>,
    pub distance: Vec<Vec<f64>>,
    pub max_weight: Vec<f64>,
    pub max_volume: Vec<f64>,
    #[serde(rename = "fixedCostPerVehicle")]
    pub fixed_cost_per_vehicle: Vec<f64>,
    #[serde(rename = "perKmCostPerVehicle")]
    pub per_km_cost_per_vehicle: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
}

impl InputData {
    /// Zips the three shipment columns into records.
    pub fn shipments(&self) -> SolverResult<Vec<ShipmentRecord>> {
        let n = self.location_matrix.len();
        if self.weight_matrix.len() != n || self.volume_matrix.len() != n {
            return Err(SolverError::validation(format!(
                "shipment columns disagree: {} locations, {} weights, {} volumes",
                n,
                self.weight_matrix.len(),
                self.volume_matrix.len()
            )));
        }
        Ok(izip!(&self.location_matrix, &self.weight_matrix, &self.volume_matrix)
            .map(|(location, &weight, &volume)| ShipmentRecord::new(location.clone(), weight, volume))
            .collect())
    }

    /// Explicit location order, or `loc0..loc{N-1}` over the distance matrix.
    pub fn canonical_locations(&self) -> Vec<String> {
        match &self.locations {
            Some(locations) => locations.clone(),
            None => (0..self.distance.len()).map(|i| format!("loc{i}")).collect(),
        }
    }

    pub fn fleet_size(&self) -> usize {
        self.max_weight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{
        "weight_matrix": [4, 6.5],
        "volume_matrix": [1, 2],
        "location_matrix": ["loc1", "loc2"],
        "distance": [[0, 1, 2], [1, 0, 1], [2, 1, 0]],
        "max_weight": [10, 10],
        "max_volume": [5, 5],
        "fixedCostPerVehicle": [100, 200],
        "perKmCostPerVehicle": [1, 2]
    }"#;

    #[test]
    fn parses_camel_case_cost_keys() {
        let input: InputData = serde_json::from_str(RAW).unwrap();
        assert_eq!(input.fixed_cost_per_vehicle, vec![100.0, 200.0]);
        assert_eq!(input.per_km_cost_per_vehicle, vec![1.0, 2.0]);
        assert_eq!(input.fleet_size(), 2);
        assert_eq!(input.canonical_locations(), vec!["loc0", "loc1", "loc2"]);
        assert_eq!(
            input.shipments().unwrap()[1],
            ShipmentRecord::new("loc2", 6.5, 2.0)
        );
    }

    #[test]
    fn ragged_shipment_columns_are_rejected() {
        let mut input: InputData = serde_json::from_str(RAW).unwrap();
        input.volume_matrix.pop();
        assert!(matches!(input.shipments(), Err(SolverError::Validation(_))));
    }
}
