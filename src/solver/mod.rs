pub mod construction;
pub mod guided_local_search;
pub mod pipeline;
