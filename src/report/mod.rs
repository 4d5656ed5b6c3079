pub mod output;
pub mod reporter;

pub use output::{print_report, route_records, save_progress_csv, write_routes_json, RouteRecord};
pub use reporter::{build_report, FleetSummary, RouteReport, SolutionReport, VisitReport};
