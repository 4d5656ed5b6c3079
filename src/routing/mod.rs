pub mod index_manager;
pub mod model;

pub use index_manager::RouteIndexManager;
pub use model::RoutingModel;
