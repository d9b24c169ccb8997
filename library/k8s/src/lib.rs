//! Thin wrapper around the Kubernetes API for provisioning, watching, and tearing
//! down sandbox workloads. Nothing above this crate knows that the orchestrator is
//! Kubernetes specifically; everything crosses the boundary as a [workload::Workload].

pub mod client;
pub mod driver;
pub mod errors;
pub mod workload;

pub use driver::{OrchestratorDriver, KERNEL_PORT};
pub use errors::DriverError;
pub use workload::{Workload, WorkloadStatus};
