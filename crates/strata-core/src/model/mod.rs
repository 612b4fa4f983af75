//! Fleet domain entities
//!
//! Concrete record types persisted with history. Each declares its business
//! keys and scd1 attributes through [`TemporalRecord`](crate::record::TemporalRecord).

mod vehicle;
mod vehicle_cluster;
mod vehicle_option;

pub use vehicle::Vehicle;
pub use vehicle_cluster::VehicleCluster;
pub use vehicle_option::VehicleOption;
