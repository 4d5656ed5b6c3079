use std::fmt::Display;

use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};

/// A cumulative resource carried by every vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Weight,
    Volume,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::Weight, Resource::Volume];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Weight => "Weight",
            Resource::Volume => "Volume",
        }
    }

    /// Slot of this resource in per-dimension vectors, following `ALL`.
    pub fn index(&self) -> usize {
        match self {
            Resource::Weight => 0,
            Resource::Volume => 1,
        }
    }

    pub fn capacity_of(&self, vehicle: &Vehicle) -> f64 {
        match self {
            Resource::Weight => vehicle.max_weight,
            Resource::Volume => vehicle.max_volume,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    pub max_weight: f64,
    pub max_volume: f64,
    pub fixed_cost: f64,
    pub per_km_cost: f64,
}

/// Raw, unchecked instance data as handed over by a loader.
#[derive(Debug, Clone, Default)]
pub struct ProblemData {
    pub location_names: Vec<String>,
    pub distance_matrix: Vec<Vec<f64>>,
    pub weight_demands: Vec<f64>,
    pub volume_demands: Vec<f64>,
    pub max_weight: Vec<f64>,
    pub max_volume: Vec<f64>,
    pub fixed_costs: Vec<f64>,
    pub per_km_costs: Vec<f64>,
    pub num_vehicles: usize,
    pub depot: usize,
}

/// Validated, frozen instance. Every accessor is read-only.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    location_names: Vec<String>,
    distance_matrix: Vec<Vec<f64>>,
    weight_demands: Vec<f64>,
    volume_demands: Vec<f64>,
    vehicles: Vec<Vehicle>,
    depot: usize,
}

impl ProblemInstance {
    pub fn new(data: ProblemData) -> SolverResult<Self> {
        let n = data.distance_matrix.len();
        if n == 0 {
            return Err(SolverError::validation("distance matrix is empty"));
        }
        if let Some((row, r)) = data
            .distance_matrix
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n)
        {
            return Err(SolverError::validation(format!(
                "distance matrix is not square: row {row} has {} entries, expected {n}",
                r.len()
            )));
        }
        check_non_negative("distance matrix", data.distance_matrix.iter().flatten())?;
        for (i, row) in data.distance_matrix.iter().enumerate() {
            if row[i] != 0.0 {
                warn!("Distance matrix diagonal entry {} is {}, self-arcs are never used", i, row[i]);
            }
        }

        check_len("weight demand vector", data.weight_demands.len(), n, "matrix size")?;
        check_len("volume demand vector", data.volume_demands.len(), n, "matrix size")?;
        check_non_negative("weight demands", data.weight_demands.iter())?;
        check_non_negative("volume demands", data.volume_demands.iter())?;

        if data.num_vehicles == 0 {
            return Err(SolverError::validation("vehicle count must be positive"));
        }
        let v = data.num_vehicles;
        check_len("max weight vector", data.max_weight.len(), v, "vehicle count")?;
        check_len("max volume vector", data.max_volume.len(), v, "vehicle count")?;
        check_len("fixed cost vector", data.fixed_costs.len(), v, "vehicle count")?;
        check_len("per-km cost vector", data.per_km_costs.len(), v, "vehicle count")?;
        check_non_negative("max weight", data.max_weight.iter())?;
        check_non_negative("max volume", data.max_volume.iter())?;
        check_non_negative("fixed costs", data.fixed_costs.iter())?;
        check_non_negative("per-km costs", data.per_km_costs.iter())?;

        if data.depot >= n {
            return Err(SolverError::validation(format!(
                "depot index {} is out of range for {n} locations",
                data.depot
            )));
        }
        if data.weight_demands[data.depot] != 0.0 || data.volume_demands[data.depot] != 0.0 {
            return Err(SolverError::validation(format!(
                "depot location {} must have zero demand",
                data.depot
            )));
        }

        let location_names = if data.location_names.is_empty() {
            (0..n).map(|i| format!("loc{i}")).collect()
        } else {
            check_len("location name list", data.location_names.len(), n, "matrix size")?;
            data.location_names
        };

        let vehicles = (0..v)
            .map(|i| Vehicle {
                max_weight: data.max_weight[i],
                max_volume: data.max_volume[i],
                fixed_cost: data.fixed_costs[i],
                per_km_cost: data.per_km_costs[i],
            })
            .collect();

        debug!("Validated instance with {} locations and {} vehicles", n, v);

        Ok(Self {
            location_names,
            distance_matrix: data.distance_matrix,
            weight_demands: data.weight_demands,
            volume_demands: data.volume_demands,
            vehicles,
            depot: data.depot,
        })
    }

    pub fn num_locations(&self) -> usize {
        self.distance_matrix.len()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    pub fn distance_matrix(&self) -> &[Vec<f64>] {
        &self.distance_matrix
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, vehicle: usize) -> &Vehicle {
        &self.vehicles[vehicle]
    }

    pub fn location_name(&self, location: usize) -> &str {
        &self.location_names[location]
    }

    pub fn demands(&self, resource: Resource) -> &[f64] {
        match resource {
            Resource::Weight => &self.weight_demands,
            Resource::Volume => &self.volume_demands,
        }
    }

    pub fn demand(&self, resource: Resource, location: usize) -> f64 {
        self.demands(resource)[location]
    }

    pub fn capacities(&self, resource: Resource) -> Vec<f64> {
        self.vehicles.iter().map(|v| resource.capacity_of(v)).collect()
    }

    /// Non-depot locations in canonical order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_locations()).filter(move |&loc| loc != self.depot)
    }
}

fn check_len(what: &str, actual: usize, expected: usize, against: &str) -> SolverResult<()> {
    if actual != expected {
        return Err(SolverError::validation(format!(
            "{what} has length {actual} but {against} is {expected}"
        )));
    }
    Ok(())
}

fn check_non_negative<'a>(what: &str, values: impl Iterator<Item = &'a f64>) -> SolverResult<()> {
    for value in values {
        if !value.is_finite() || *value < 0.0 {
            return Err(SolverError::validation(format!(
                "{what} must be finite and non-negative, found {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ProblemData {
        ProblemData {
            location_names: vec![],
            distance_matrix: vec![
                vec![0.0, 4.0, 6.0],
                vec![4.0, 0.0, 3.0],
                vec![6.0, 3.0, 0.0],
            ],
            weight_demands: vec![0.0, 5.0, 7.0],
            volume_demands: vec![0.0, 1.0, 2.0],
            max_weight: vec![10.0, 20.0],
            max_volume: vec![5.0, 5.0],
            fixed_costs: vec![100.0, 300.0],
            per_km_costs: vec![1.0, 2.5],
            num_vehicles: 2,
            depot: 0,
        }
    }

    #[test]
    fn accepts_consistent_instance() {
        let problem = ProblemInstance::new(data()).unwrap();
        assert_eq!(problem.num_locations(), 3);
        assert_eq!(problem.num_vehicles(), 2);
        assert_eq!(problem.vehicle(1).per_km_cost, 2.5);
        assert_eq!(problem.demand(Resource::Volume, 2), 2.0);
        assert_eq!(problem.capacities(Resource::Weight), vec![10.0, 20.0]);
        assert_eq!(problem.location_name(2), "loc2");
        assert_eq!(problem.customers().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn rejects_non_square_matrix() {
        let mut d = data();
        d.distance_matrix[1].pop();
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));
    }

    #[test]
    fn rejects_demand_length_mismatch() {
        let mut d = data();
        d.volume_demands.push(1.0);
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));
    }

    #[test]
    fn rejects_vehicle_vector_mismatch() {
        let mut d = data();
        d.fixed_costs.pop();
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));

        let mut d = data();
        d.num_vehicles = 3;
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));
    }

    #[test]
    fn rejects_depot_out_of_range() {
        let mut d = data();
        d.depot = 3;
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));
    }

    #[test]
    fn rejects_negative_values() {
        let mut d = data();
        d.per_km_costs[0] = -1.0;
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));

        let mut d = data();
        d.distance_matrix[0][2] = f64::NAN;
        assert!(matches!(ProblemInstance::new(d), Err(SolverError::Validation(_))));
    }
}
