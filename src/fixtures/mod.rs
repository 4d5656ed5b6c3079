pub mod data_generator;

pub use data_generator::{default_fixture, generate_random_input};
