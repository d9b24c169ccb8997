use crate::config::Config;
use crate::errors::GatewayFault;
use crate::sandbox::registry::Registry;
use error::Kind;
use k8s::OrchestratorDriver;
use result::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// `Provisioner` ties the [Registry] to the [OrchestratorDriver], implementing the
/// lazy, single-flight workload creation described for session first-touch.
pub struct Provisioner {
    registry: Arc<Registry>,
    driver: OrchestratorDriver,
    config: Config,
}

impl Provisioner {
    pub fn new(registry: Arc<Registry>, driver: OrchestratorDriver, config: Config) -> Self {
        Self {
            registry,
            driver,
            config,
        }
    }

    /// Returns a ready workload id for `session_id`, creating one if this is the
    /// session's first touch. Concurrent first-touches for the same session are
    /// serialized by the registry's per-session creation lock; the loser of the
    /// race re-checks the registry after acquiring the lock and simply returns
    /// what the winner bound (P1).
    pub async fn ensure_workload(&self, session_id: &str) -> Result<String> {
        if let Some(workload_id) = self.registry.get(session_id).await {
            return Ok(workload_id);
        }

        let lock = self.registry.creation_lock(session_id).await;
        let _guard = lock.lock().await;

        if let Some(workload_id) = self.registry.get(session_id).await {
            return Ok(workload_id);
        }

        match self.create_and_bind(session_id, names::sandbox_name()).await {
            Ok(workload_id) => Ok(workload_id),
            Err(err) => {
                if is_already_exists(&err) {
                    log::warn!("workload name collision, retrying once with a new name");
                    self.create_and_bind(session_id, names::sandbox_name())
                        .await
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn create_and_bind(&self, session_id: &str, pod_name: String) -> Result<String> {
        let service_name = names::service_name(&pod_name);
        let env = BTreeMap::new();

        let create_result = self
            .driver
            .create_workload(&pod_name, &service_name, &self.config.sandbox_image, "python", &env)
            .await;

        if let Err(err) = create_result {
            return Err(err);
        }

        let ready = self
            .driver
            .wait_ready(&pod_name, &service_name, self.config.provision_deadline)
            .await;

        let workload = match ready {
            Ok(workload) => workload,
            Err(err) => {
                log::warn!(
                    "workload {} never became ready, cleaning up: {}",
                    term_colors::red(&pod_name),
                    err
                );
                let _ = self.driver.delete_workload(&pod_name, &service_name).await;
                return Err(err);
            }
        };

        let addr = workload.addr.ok_or_else(|| {
            GatewayFault::internal("workload reported ready with no address assigned")
        })?;

        self.registry
            .bind(session_id, &pod_name, &service_name, &addr)
            .await;

        log::info!(
            "session {} bound to workload {}",
            session_id,
            term_colors::cyan(&pod_name)
        );
        Ok(pod_name)
    }
}

fn is_already_exists(err: &Box<dyn error::GatewayError>) -> bool {
    err.kind() == "DriverError::Conflict"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_detection_ignores_other_errors() {
        let err: Result<()> = Err(GatewayFault::internal("boom").into());
        assert!(!is_already_exists(&err.unwrap_err()));
    }
}
