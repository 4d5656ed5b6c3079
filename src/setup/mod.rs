pub mod aggregate;
pub mod init;
pub mod init_types;

pub use aggregate::{aggregate_demands, ShipmentRecord};
pub use init::{build_problem, load_input};
pub use init_types::InputData;
