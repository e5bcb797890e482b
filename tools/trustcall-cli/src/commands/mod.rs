pub mod config;
pub mod scan;
pub mod snapshot;
pub mod synthetic;
