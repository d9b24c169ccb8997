use crate::sandbox::registry::Registry;
use k8s::OrchestratorDriver;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;

/// Runs the idle-reaping loop forever, ticking every `check_interval`. Intended to
/// be spawned once at startup and left running for the life of the process; it
/// never returns.
pub async fn run(registry: Arc<Registry>, driver: OrchestratorDriver, check_interval: Duration, idle_timeout: Duration) {
    let mut interval = tokio::time::interval(check_interval);
    // The first tick fires immediately; skip it so a freshly started gateway
    // doesn't reap workloads that another instance just finished provisioning.
    interval.tick().await;
    loop {
        interval.tick().await;
        tick(&registry, &driver, idle_timeout).await;
    }
}

/// A single reaper pass: discover every labelled workload, destroy the ones with
/// no registry entry (stray) and the ones idle past the threshold, per I4.
async fn tick(registry: &Arc<Registry>, driver: &OrchestratorDriver, idle_timeout: Duration) {
    let pods = match driver.list_labelled().await {
        Ok(pods) => pods,
        Err(err) => {
            log::error!("reaper tick: failed to list workloads: {}", err);
            return;
        }
    };

    let known = registry.known_workload_ids().await;
    let expired = registry.snapshot_expired(idle_timeout).await;
    let expired: std::collections::HashSet<String> = expired.into_iter().collect();

    for pod in pods {
        let pod_name = pod.name_any();
        let service_name = names::service_name(&pod_name);

        let stray = !known.contains(&pod_name);
        let idle = expired.contains(&pod_name);

        if !stray && !idle {
            continue;
        }

        log::info!(
            "reaper destroying workload {} ({})",
            term_colors::orange(&pod_name),
            if stray { "stray" } else { "idle" }
        );

        if let Err(err) = driver.delete_workload(&pod_name, &service_name).await {
            log::error!("reaper: failed to delete workload {}: {}", pod_name, err);
            continue;
        }
        registry.unbind(&pod_name).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_set_contains_only_workloads_past_threshold() {
        let registry = Arc::new(Registry::new());
        registry
            .bind("session-a", "sandbox-aaaa1111", "svc", "svc:8000")
            .await;
        let expired = registry.snapshot_expired(Duration::from_secs(0)).await;
        assert_eq!(expired, vec!["sandbox-aaaa1111".to_string()]);
    }
}
