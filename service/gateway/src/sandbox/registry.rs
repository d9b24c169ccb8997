use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Everything the registry knows about one workload besides its last-activity
/// timestamp: enough to route to it (`service_name`) and to clean it up
/// (`pod_name` — identical to the workload id, kept as a field for clarity at call
/// sites that read entries rather than ids).
#[derive(Clone, Debug)]
pub struct SandboxEntry {
    pub pod_name: String,
    pub service_name: String,
    pub addr: String,
    pub created_at: Instant,
    last_active: Instant,
}

impl SandboxEntry {
    pub fn last_active(&self) -> Instant {
        self.last_active
    }
}

#[derive(Default)]
struct Inner {
    /// session_id -> workload_id. I1: at most one entry per session.
    sessions: HashMap<String, String>,
    /// workload_id -> entry. Per I2, a workload id appears here iff it appears as
    /// a session value or was created directly by this process.
    workloads: HashMap<String, SandboxEntry>,
    /// Per-session single-flight locks for first-touch provisioning. A lock is
    /// created on demand and left in place; it is cheap (an empty `Mutex<()>`) and
    /// its presence does not imply a workload exists.
    creation_locks: HashMap<String, Arc<Mutex<()>>>,
}

/// The `Registry` is the only mutable shared state in the gateway: a session →
/// workload map, a workload → last-activity map, and the single-flight locks that
/// serialize first-touch creation. Every method takes and releases the lock within
/// its own body — nothing here is ever held across an `.await` outside of the
/// `creation_lock` guard itself, which callers hold only across their own
/// provisioning logic, not registry internals.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.sessions.get(session_id).cloned()
    }

    pub async fn entry(&self, workload_id: &str) -> Option<SandboxEntry> {
        let inner = self.inner.lock().await;
        inner.workloads.get(workload_id).cloned()
    }

    /// Returns the per-session creation lock, creating it if this is the first
    /// caller to ever touch this session. Holding this lock across a provisioning
    /// attempt is what makes first-touch creation single-flight: a second caller
    /// blocks on the same `Arc<Mutex<()>>` and, once unblocked, re-checks the
    /// registry and finds the winner's entry already bound.
    pub async fn creation_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().await;
        inner
            .creation_locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn bind(&self, session_id: &str, pod_name: &str, service_name: &str, addr: &str) {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        inner.workloads.insert(
            pod_name.to_string(),
            SandboxEntry {
                pod_name: pod_name.to_string(),
                service_name: service_name.to_string(),
                addr: addr.to_string(),
                created_at: now,
                last_active: now,
            },
        );
        inner
            .sessions
            .insert(session_id.to_string(), pod_name.to_string());
    }

    pub async fn touch(&self, workload_id: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.workloads.get_mut(workload_id) {
            entry.last_active = Instant::now();
        }
    }

    /// Removes a workload by value: its activity entry, and every session mapping
    /// that pointed at it. Used by both explicit delete and the reaper, so a
    /// session whose workload was reaped transparently re-provisions on next use.
    pub async fn unbind(&self, workload_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.workloads.remove(workload_id);
        inner.sessions.retain(|_, v| v != workload_id);
    }

    pub async fn snapshot_expired(&self, threshold: Duration) -> Vec<String> {
        let inner = self.inner.lock().await;
        let now = Instant::now();
        inner
            .workloads
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_active) > threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn known_workload_ids(&self) -> std::collections::HashSet<String> {
        let inner = self.inner.lock().await;
        inner.workloads.keys().cloned().collect()
    }

    pub async fn list(&self) -> Vec<(String, SandboxEntry)> {
        let inner = self.inner.lock().await;
        inner
            .workloads
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_then_get_round_trips() {
        let registry = Registry::new();
        registry
            .bind("session-a", "sandbox-aaaa1111", "svc", "svc:8000")
            .await;
        assert_eq!(
            registry.get("session-a").await,
            Some("sandbox-aaaa1111".to_string())
        );
    }

    #[tokio::test]
    async fn unbind_clears_both_maps() {
        let registry = Registry::new();
        registry
            .bind("session-a", "sandbox-aaaa1111", "svc", "svc:8000")
            .await;
        registry.unbind("sandbox-aaaa1111").await;
        assert_eq!(registry.get("session-a").await, None);
        assert!(registry.entry("sandbox-aaaa1111").await.is_none());
    }

    #[tokio::test]
    async fn snapshot_expired_respects_threshold() {
        let registry = Registry::new();
        registry
            .bind("session-a", "sandbox-aaaa1111", "svc", "svc:8000")
            .await;
        assert!(registry
            .snapshot_expired(Duration::from_secs(0))
            .await
            .contains(&"sandbox-aaaa1111".to_string()));
        assert!(registry
            .snapshot_expired(Duration::from_secs(3600))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn touch_advances_last_active() {
        let registry = Registry::new();
        registry
            .bind("session-a", "sandbox-aaaa1111", "svc", "svc:8000")
            .await;
        let before = registry.entry("sandbox-aaaa1111").await.unwrap().last_active();
        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.touch("sandbox-aaaa1111").await;
        let after = registry.entry("sandbox-aaaa1111").await.unwrap().last_active();
        assert!(after > before);
    }

    #[tokio::test]
    async fn concurrent_sessions_get_distinct_creation_locks() {
        let registry = Registry::new();
        let a = registry.creation_lock("session-a").await;
        let b = registry.creation_lock("session-b").await;
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn same_session_shares_creation_lock() {
        let registry = Registry::new();
        let a = registry.creation_lock("session-a").await;
        let b = registry.creation_lock("session-a").await;
        assert!(Arc::ptr_eq(&a, &b));
    }
}
