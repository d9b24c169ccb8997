use k8s_openapi::api::core::v1::{Pod, Service};
use kind::Kind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mirrors the `status` field of the §3 data model: `Pending`, `Running`, `Failed`,
/// or `Unknown` when the orchestrator's phase doesn't map cleanly onto the other three.
#[derive(Serialize, Kind, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadStatus {
    Pending,
    Running,
    Failed,
    Unknown,
}

impl From<Option<&str>> for WorkloadStatus {
    fn from(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => WorkloadStatus::Pending,
            Some("Running") => WorkloadStatus::Running,
            Some("Failed") => WorkloadStatus::Failed,
            _ => WorkloadStatus::Unknown,
        }
    }
}

/// A `Workload` is the orchestrator-agnostic view of a sandbox: the pieces the rest
/// of the gateway actually needs, stripped of Kubernetes-specific structure.
#[derive(Serialize, Kind, Debug, Clone)]
pub struct Workload {
    pub id: String,
    pub status: WorkloadStatus,
    pub ready: bool,
    /// The service DNS name routable from inside the cluster, once assigned.
    /// This is never the pod IP — restarts invalidate the pod IP but not the
    /// service's stable DNS entry.
    pub addr: Option<String>,
    pub labels: BTreeMap<String, String>,
}

pub const LABEL_APP: &str = "app";
pub const LABEL_APP_VALUE: &str = "sandbox";
pub const LABEL_SBX: &str = "sbx";
pub const LABEL_SBX_VALUE: &str = "1";
pub const LABEL_LANG: &str = "sbx_lang";
pub const LABEL_POD_NAME: &str = "pod-name";

/// The selector used to discover every workload this process (or a predecessor
/// instance of it) has ever created, regardless of which session it is bound to.
pub const LABEL_SELECTOR: &str = "app=sandbox,sbx=1";

fn labels(pod_name: &str, lang: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_APP.to_string(), LABEL_APP_VALUE.to_string()),
        (LABEL_SBX.to_string(), LABEL_SBX_VALUE.to_string()),
        (LABEL_LANG.to_string(), lang.to_string()),
        (LABEL_POD_NAME.to_string(), pod_name.to_string()),
    ])
}

/// Builds the pod manifest for a new sandbox workload.
///
/// The pod is never restarted (`restartPolicy: Never`) — a crashed sandbox is
/// reaped and re-provisioned, not resurrected in place. Readiness is gated on the
/// kernel executor's `/health` endpoint; liveness uses the same path on a longer
/// cadence so a wedged kernel eventually gets killed too.
pub fn pod_manifest(
    name: &str,
    image: &str,
    port: i32,
    lang: &str,
    env: &BTreeMap<String, String>,
) -> Pod {
    let mut env_vars: Vec<serde_json::Value> = env
        .iter()
        .map(|(k, v)| serde_json::json!({"name": k, "value": v}))
        .collect();
    env_vars.push(serde_json::json!({"name": "IS_SANDBOX", "value": "1"}));
    env_vars.push(serde_json::json!({"name": "PORT", "value": port.to_string()}));

    let manifest = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "labels": labels(name, lang),
        },
        "spec": {
            "containers": [{
                "name": "kernel-executor",
                "image": image,
                "ports": [{"containerPort": port, "protocol": "TCP"}],
                "env": env_vars,
                "readinessProbe": {
                    "httpGet": {"path": "/health", "port": port},
                    "initialDelaySeconds": 2,
                    "periodSeconds": 3,
                    "timeoutSeconds": 5,
                },
                "livenessProbe": {
                    "httpGet": {"path": "/health", "port": port},
                    "initialDelaySeconds": 15,
                    "periodSeconds": 10,
                    "timeoutSeconds": 5,
                },
            }],
            "restartPolicy": "Never",
        }
    });
    serde_json::from_value(manifest).expect("pod manifest is always well-formed JSON")
}

/// Builds the service manifest fronting the pod of the same logical workload. The
/// service selects the pod by its unique `pod-name` label, so its DNS name stays
/// stable across pod restarts — this is the only address the execution proxy uses.
pub fn service_manifest(pod_name: &str, service_name: &str, port: i32) -> Service {
    let manifest = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": service_name,
            "labels": {
                LABEL_APP: LABEL_APP_VALUE,
                LABEL_SBX: LABEL_SBX_VALUE,
            },
        },
        "spec": {
            "selector": {
                LABEL_APP: LABEL_APP_VALUE,
                LABEL_SBX: LABEL_SBX_VALUE,
                LABEL_POD_NAME: pod_name,
            },
            "ports": [{"port": port, "targetPort": port, "protocol": "TCP"}],
            "type": "ClusterIP",
        }
    });
    serde_json::from_value(manifest).expect("service manifest is always well-formed JSON")
}

/// The fully-qualified in-cluster DNS name of a service, given its name and the
/// namespace it lives in.
pub fn service_dns(service_name: &str, namespace: &str, port: i32) -> String {
    format!(
        "{}.{}.svc.cluster.local:{}",
        service_name, namespace, port
    )
}

/// Extracts the [Workload](crate::workload::Workload) view from a raw pod object.
/// `addr` is populated only once a matching service has also been observed, since
/// the service DNS — not the pod IP — is what routability actually means here.
pub fn from_pod(pod: &Pod, addr: Option<String>) -> Workload {
    let status = pod.status.as_ref();
    let phase = status.and_then(|s| s.phase.as_deref());
    let container_statuses = status
        .and_then(|s| s.container_statuses.as_ref())
        .map(|v| v.as_slice())
        .unwrap_or(&[]);
    let containers_ready =
        !container_statuses.is_empty() && container_statuses.iter().all(|c| c.ready);
    let ready = phase == Some("Running") && containers_ready;
    Workload {
        id: pod.metadata.name.clone().unwrap_or_default(),
        status: WorkloadStatus::from(phase),
        ready,
        addr,
        labels: pod
            .metadata
            .labels
            .clone()
            .unwrap_or_default()
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_has_never_restart_policy() {
        let env = BTreeMap::new();
        let pod = pod_manifest("sandbox-deadbeef", "img:latest", 8000, "python", &env);
        assert_eq!(
            pod.spec.as_ref().unwrap().restart_policy.as_deref(),
            Some("Never")
        );
    }

    #[test]
    fn manifest_carries_discovery_labels() {
        let env = BTreeMap::new();
        let pod = pod_manifest("sandbox-deadbeef", "img:latest", 8000, "python", &env);
        let labels = pod.metadata.labels.unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some("sandbox"));
        assert_eq!(labels.get("sbx").map(String::as_str), Some("1"));
        assert_eq!(
            labels.get("pod-name").map(String::as_str),
            Some("sandbox-deadbeef")
        );
    }

    #[test]
    fn service_selects_pod_by_name_label() {
        let svc = service_manifest("sandbox-deadbeef", "sandbox-deadbeef-service", 8000);
        let selector = svc.spec.unwrap().selector.unwrap();
        assert_eq!(
            selector.get("pod-name").map(String::as_str),
            Some("sandbox-deadbeef")
        );
    }

    #[test]
    fn service_dns_uses_cluster_local() {
        assert_eq!(
            service_dns("sandbox-deadbeef-service", "app", 8000),
            "sandbox-deadbeef-service.app.svc.cluster.local:8000"
        );
    }
}
