pub mod capacity;
pub mod collector;
pub mod platform;
pub mod provider;
pub mod snapshot;
pub mod task;
pub mod utilization;
