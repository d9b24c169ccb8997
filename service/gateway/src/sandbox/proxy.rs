use crate::errors::{GatewayFault, UpstreamStatus};
use crate::sandbox::provisioner::Provisioner;
use crate::sandbox::registry::Registry;
use futures::stream::Stream;
use futures_util::StreamExt;
use k8s::{OrchestratorDriver, WorkloadStatus};
use result::Result;
use std::sync::Arc;
use std::time::Duration;

/// `ExecutionProxy` resolves a session to a workload, forwards a code-execution
/// request to that workload's kernel executor, and streams the NDJSON response
/// back unparsed. It never buffers a full response: each upstream chunk is
/// forwarded as soon as it arrives and the workload's activity timestamp is
/// bumped on every successful chunk (I3).
pub struct ExecutionProxy {
    registry: Arc<Registry>,
    provisioner: Arc<Provisioner>,
    driver: OrchestratorDriver,
    reuse_deadline: Duration,
    http: reqwest::Client,
}

impl ExecutionProxy {
    pub fn new(
        registry: Arc<Registry>,
        provisioner: Arc<Provisioner>,
        driver: OrchestratorDriver,
        reuse_deadline: Duration,
    ) -> Self {
        Self {
            registry,
            provisioner,
            driver,
            reuse_deadline,
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client builds with static config"),
        }
    }

    /// Resolves and forwards `code` to `session_id`'s workload, returning a stream
    /// of raw byte chunks that is a faithful pass-through of the upstream NDJSON
    /// body (P5). The workload is provisioned on demand if this is the session's
    /// first touch.
    pub async fn execute(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<impl Stream<Item = std::result::Result<bytes::Bytes, std::io::Error>>> {
        if code.is_empty() {
            return Err(GatewayFault::invalid_argument("Missing 'code' field").into());
        }

        let workload_id = self.provisioner.ensure_workload(session_id).await?;
        let entry = self.registry.entry(&workload_id).await.ok_or_else(|| {
            GatewayFault::not_found(format!("workload '{}' was not found", workload_id))
        })?;

        // §4.4 step 3: a workload the registry already knows about is not
        // re-probed on every call (I5 — readiness is one-way, not re-demoted just
        // because it's been a while), but if its last-known status isn't Running
        // we wait on it again, bounded by `reuse_deadline`, before forwarding.
        let current = self
            .driver
            .read_workload(&workload_id, &entry.service_name)
            .await?;
        if current.status != WorkloadStatus::Running {
            self.driver
                .wait_ready(&workload_id, &entry.service_name, self.reuse_deadline)
                .await?;
        }

        let url = format!("http://{}/execute", entry.addr);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await
            .map_err(|err| classify_send_error(&workload_id, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(UpstreamStatus::new(status.as_u16(), reason).into());
        }

        let registry = self.registry.clone();
        let workload_id_for_touch = workload_id.clone();
        let byte_stream = response.bytes_stream().then(move |chunk| {
            let registry = registry.clone();
            let workload_id = workload_id_for_touch.clone();
            async move {
                match chunk {
                    Ok(bytes) => {
                        registry.touch(&workload_id).await;
                        Ok(bytes)
                    }
                    Err(err) => Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        err.to_string(),
                    )),
                }
            }
        });

        Ok(byte_stream)
    }
}

/// Classifies a `reqwest` transport failure per the upstream failure table: a
/// connection refused or DNS failure becomes `Unavailable`, a timeout becomes
/// `DeadlineExceeded`, and anything else (mid-stream reset, etc.) becomes
/// `UpstreamProtocol`.
fn classify_send_error(workload_id: &str, err: reqwest::Error) -> Box<dyn error::GatewayError> {
    if err.is_timeout() {
        GatewayFault::deadline_exceeded(format!(
            "timed out waiting on workload '{}'",
            workload_id
        ))
        .into()
    } else if err.is_connect() {
        GatewayFault::unavailable(format!("sandbox '{}' not reachable", workload_id)).into()
    } else {
        GatewayFault::upstream_protocol(format!(
            "connection to workload '{}' failed mid-stream: {}",
            workload_id, err
        ))
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sandbox::registry::Registry;
    use error::Kind;
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            sandbox_image: "kernel-executor:test".to_string(),
            is_sandbox: false,
            idle_timeout: Duration::from_secs(3600),
            check_interval: Duration::from_secs(3600),
            upload_dir: "/app".to_string(),
            provision_deadline: Duration::from_secs(300),
            reuse_deadline: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn rejects_empty_code_before_any_network_call() {
        let registry = Arc::new(Registry::new());
        let driver = OrchestratorDriver::new();
        let config = test_config();
        let provisioner = Arc::new(Provisioner::new(registry.clone(), driver, config.clone()));
        let proxy = ExecutionProxy::new(registry, provisioner, driver, config.reuse_deadline);

        let err = proxy
            .execute("session-a", "")
            .await
            .expect_err("empty code must be rejected");
        assert_eq!(err.kind(), "GatewayFault::InvalidArgument");
    }
}
