use crate::client;
use crate::errors::DriverError;
use crate::workload::{self, Workload};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{AttachParams, DeleteParams, ListParams, PostParams};
use result::Result;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// The port the kernel executor listens on inside every sandbox container.
pub const KERNEL_PORT: i32 = 8000;

/// `OrchestratorDriver` is the only component in the gateway that speaks the
/// Kubernetes API directly. Everything above it — the registry, the provisioner,
/// the proxy — deals in [Workload] values and never touches `kube` types.
#[derive(Clone, Copy, Default)]
pub struct OrchestratorDriver;

impl OrchestratorDriver {
    pub fn new() -> Self {
        OrchestratorDriver
    }

    /// Creates the pod and its fronting service for a new workload. Pod creation
    /// happens first; if the service creation that follows fails, the pod is
    /// deleted best-effort so a half-provisioned workload doesn't linger invisible
    /// to the registry that asked for it.
    pub async fn create_workload(
        &self,
        pod_name: &str,
        service_name: &str,
        image: &str,
        lang: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<Workload> {
        let pods = client::pods().await?;
        let services = client::services().await?;

        let pod_manifest = workload::pod_manifest(pod_name, image, KERNEL_PORT, lang, env);
        let pod = pods
            .create(&PostParams::default(), &pod_manifest)
            .await
            .map_err(|err| to_driver_error(pod_name, err))?;

        let service_manifest =
            workload::service_manifest(pod_name, service_name, KERNEL_PORT);
        if let Err(err) = services
            .create(&PostParams::default(), &service_manifest)
            .await
        {
            log::warn!(
                "service creation failed for {}, deleting orphaned pod {}",
                term_colors::red(service_name),
                term_colors::red(pod_name)
            );
            let _ = pods.delete(pod_name, &DeleteParams::default()).await;
            return Err(to_driver_error(service_name, err).into());
        }

        let addr = Some(workload::service_dns(
            service_name,
            &client::namespace(),
            KERNEL_PORT,
        ));
        Ok(workload::from_pod(&pod, addr))
    }

    /// Reads back the current view of a workload. `addr` is populated whenever the
    /// sibling service still exists, independent of whatever the pod's own IP is
    /// doing.
    pub async fn read_workload(&self, pod_name: &str, service_name: &str) -> Result<Workload> {
        let pods = client::pods().await?;
        let services = client::services().await?;

        let pod = pods.get(pod_name).await.map_err(DriverError::from)?;
        let addr = match services.get(service_name).await {
            Ok(_) => Some(workload::service_dns(
                service_name,
                &client::namespace(),
                KERNEL_PORT,
            )),
            Err(kube::Error::Api(response)) if response.code == 404 => None,
            Err(err) => return Err(DriverError::from(err).into()),
        };
        Ok(workload::from_pod(&pod, addr))
    }

    /// Polls [read_workload](Self::read_workload) with exponential backoff until the
    /// workload reports ready, or `deadline` elapses. Mirrors the polling shape of a
    /// health-check loop, swapped from a gRPC health probe to this driver's own pod
    /// status read, since readiness here means "the probe-gated pod phase is Running
    /// and the service exists," not a single RPC round-trip.
    pub async fn wait_ready(
        &self,
        pod_name: &str,
        service_name: &str,
        deadline: Duration,
    ) -> Result<Workload> {
        let start = Instant::now();
        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            max_elapsed_time: Some(deadline),
            ..ExponentialBackoff::default()
        };

        loop {
            let workload = self.read_workload(pod_name, service_name).await?;
            if workload.ready && workload.addr.is_some() {
                return Ok(workload);
            }
            if workload.status == workload::WorkloadStatus::Failed {
                return Err(DriverError::Forbidden {
                    reason: format!("workload '{}' entered Failed phase", pod_name),
                }
                .into());
            }
            match backoff.next_backoff() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => {
                    return Err(DriverError::DeadlineExceeded {
                        name: pod_name.to_string(),
                        elapsed: format!("{:.1}s", start.elapsed().as_secs_f32()),
                    }
                    .into())
                }
            }
        }
    }

    /// Lists every pod this gateway manages, identified by the shared
    /// `app=sandbox,sbx=1` label pair rather than by name, so the reaper can find
    /// stray workloads even if its own registry has forgotten about them (e.g. after
    /// a restart).
    pub async fn list_labelled(&self) -> Result<Vec<Pod>> {
        let pods = client::pods().await?;
        let list = pods
            .list(&ListParams::default().labels(workload::LABEL_SELECTOR))
            .await
            .map_err(DriverError::from)?;
        Ok(list.items)
    }

    /// Deletes a workload's pod and service. Idempotent: a missing pod or service is
    /// not an error, since the caller's intent ("this workload should not exist") is
    /// already satisfied.
    pub async fn delete_workload(&self, pod_name: &str, service_name: &str) -> Result<()> {
        let pods = client::pods().await?;
        let services = client::services().await?;

        match pods.delete(pod_name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(kube::Error::Api(response)) if response.code == 404 => {}
            Err(err) => return Err(DriverError::from(err).into()),
        }
        match services.delete(service_name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(kube::Error::Api(response)) if response.code == 404 => {}
            Err(err) => return Err(DriverError::from(err).into()),
        }
        log::info!("deleted workload {}", term_colors::cyan(pod_name));
        Ok(())
    }

    /// Writes `contents` into `path` inside the workload's container by piping a
    /// base64-encoded payload through `sh -c` via the Kubernetes exec API, the same
    /// upload mechanism the kernel-executor's own ingestion endpoint uses when no
    /// in-process upload route is available.
    pub async fn exec_write_file(&self, pod_name: &str, path: &str, contents: &[u8]) -> Result<()> {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(contents);
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("echo {} | base64 -d > {}", encoded, path),
        ];
        self.exec(pod_name, command).await.map(|_| ())
    }

    /// Runs an arbitrary command inside the workload's container and returns its
    /// combined stdout. Used for both file upload (via `sh -c`) and file listing
    /// (`ls -la`).
    pub async fn exec(&self, pod_name: &str, command: Vec<String>) -> Result<String> {
        let pods = client::pods().await?;
        let attach_params = AttachParams::default().stdout(true).stderr(true);
        let mut process = pods
            .exec(pod_name, command, &attach_params)
            .await
            .map_err(|err| DriverError::ExecFailed {
                name: pod_name.to_string(),
                reason: err.to_string(),
            })?;

        let mut stdout = process
            .stdout()
            .ok_or_else(|| DriverError::ExecFailed {
                name: pod_name.to_string(),
                reason: "no stdout stream attached".to_string(),
            })?;
        let mut output = Vec::new();
        stdout
            .read_to_end(&mut output)
            .await
            .map_err(|err| DriverError::ExecFailed {
                name: pod_name.to_string(),
                reason: err.to_string(),
            })?;

        if let Some(mut stdin) = process.stdin() {
            let _ = stdin.shutdown().await;
        }
        process.join().await.map_err(|err| DriverError::ExecFailed {
            name: pod_name.to_string(),
            reason: err.to_string(),
        })?;

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

/// Converts a `kube::Error` from a creation call into a `DriverError`, substituting
/// `name` (the resource this call actually tried to create) for a 409 response
/// rather than trusting the Kubernetes API's own opaque conflict message.
fn to_driver_error(name: &str, err: kube::Error) -> DriverError {
    match &err {
        kube::Error::Api(response) if response.code == 409 => DriverError::Conflict {
            name: name.to_string(),
        },
        _ => DriverError::from(err),
    }
}
