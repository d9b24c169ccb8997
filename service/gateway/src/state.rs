use crate::config::Config;
use crate::sandbox::{ExecutionProxy, FileIngestor, Provisioner, Registry};
use k8s::OrchestratorDriver;
use std::sync::Arc;

/// Everything a route handler needs, managed by Rocket as shared application
/// state. Cloning a `Gateway` is cheap — every field is an `Arc` or `Copy` type.
#[derive(Clone)]
pub struct Gateway {
    pub registry: Arc<Registry>,
    pub provisioner: Arc<Provisioner>,
    pub proxy: Arc<ExecutionProxy>,
    pub ingestor: Arc<FileIngestor>,
    pub driver: OrchestratorDriver,
    pub config: Config,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(Registry::new());
        let driver = OrchestratorDriver::new();
        let provisioner = Arc::new(Provisioner::new(registry.clone(), driver, config.clone()));
        let proxy = Arc::new(ExecutionProxy::new(
            registry.clone(),
            provisioner.clone(),
            driver,
            config.reuse_deadline,
        ));
        let ingestor = Arc::new(FileIngestor::new(
            registry.clone(),
            provisioner.clone(),
            driver,
            config.upload_dir.clone(),
        ));
        Self {
            registry,
            provisioner,
            proxy,
            ingestor,
            driver,
            config,
        }
    }
}
