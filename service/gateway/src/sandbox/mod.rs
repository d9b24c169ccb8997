pub mod ingestor;
pub mod provisioner;
pub mod proxy;
pub mod reaper;
pub mod registry;

pub use ingestor::FileIngestor;
pub use provisioner::Provisioner;
pub use proxy::ExecutionProxy;
pub use registry::Registry;
