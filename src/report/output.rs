use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use colored::*;
use csv::Writer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SolverResult;
use crate::solver::guided_local_search::ProgressPoint;

use super::reporter::{RouteReport, SolutionReport};

/// Persisted per-vehicle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: usize,
    pub route_weight: f64,
    pub route_volume: f64,
    pub vehicle_id: usize,
    pub veh_max_weight: f64,
    pub veh_max_volume: f64,
    pub route_cost: f64,
    pub route_distance: f64,
}

impl From<&RouteReport> for RouteRecord {
    fn from(route: &RouteReport) -> Self {
        Self {
            route_id: route.route_id,
            route_weight: route.route_weight,
            route_volume: route.route_volume,
            vehicle_id: route.vehicle_id,
            veh_max_weight: route.veh_max_weight,
            veh_max_volume: route.veh_max_volume,
            route_cost: route.route_cost,
            route_distance: route.route_distance,
        }
    }
}

pub fn route_records(report: &SolutionReport) -> Vec<RouteRecord> {
    report.routes.iter().map(RouteRecord::from).collect()
}

pub fn write_routes_json(path: &Path, report: &SolutionReport) -> SolverResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &route_records(report))?;
    info!("Wrote {} route records to {}", report.routes.len(), path.display());
    Ok(())
}

pub fn save_progress_csv(path: &Path, progress: &[ProgressPoint]) -> SolverResult<()> {
    let mut wtr = Writer::from_path(path)?;
    for point in progress {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    debug!("Wrote {} progress points to {}", progress.len(), path.display());
    Ok(())
}

/// Console rendering of every route with cumuls at each stop, then fleet totals.
pub fn print_report(report: &SolutionReport) {
    info!("Objective: {:.2}", report.objective);

    for route in &report.routes {
        let stops = route
            .visits
            .iter()
            .map(|v| {
                format!(
                    "{} Weight({}) Volume({})",
                    v.location, v.cumulative_weight, v.cumulative_volume
                )
            })
            .collect::<Vec<_>>()
            .join(" -> ");
        let header = format!("Route for vehicle {}:", route.vehicle_id);
        let header = if route.is_used() {
            header.green()
        } else {
            header.dimmed()
        };

        info!("{}", header);
        info!(" {}", stops);
        info!(
            "Distance of the route: {:.2}, cost of the route: {:.2}",
            route.route_distance, route.route_cost
        );
        info!(
            "Weight of the route: {} / {}, volume of the route: {} / {}",
            route.route_weight, route.veh_max_weight, route.route_volume, route.veh_max_volume
        );
    }

    let summary = &report.summary;
    info!(
        "{}",
        format!(
            "Total distance: {:.2}, total cost: {:.2}, total weight: {}, total volume: {}, vehicles used: {}",
            summary.total_distance,
            summary.total_cost,
            summary.total_weight,
            summary.total_volume,
            summary.vehicles_used
        )
        .bold()
    );
}
