use std::time::Duration;

/// Deployment-time settings, all read from the environment at process start. None
/// of these are re-read after boot; a config change requires a restart.
#[derive(Clone, Debug)]
pub struct Config {
    /// Container image reference for the kernel executor, used for every newly
    /// created workload.
    pub sandbox_image: String,
    /// Whether this process is itself running inside a workload. When set, only
    /// `/execute` and `/health` are mounted — the rest of the gateway surface makes
    /// no sense from inside a sandbox.
    pub is_sandbox: bool,
    /// How long a workload may sit untouched before the reaper destroys it.
    pub idle_timeout: Duration,
    /// How often the reaper scans for idle and stray workloads.
    pub check_interval: Duration,
    /// Directory inside the workload that uploaded files are written to. Left
    /// configurable rather than hard-coded: the upload target has varied between
    /// `/app` and `/uploaded_files` across past deployments, and which one is
    /// correct is a decision made at deploy time, not compile time.
    pub upload_dir: String,
    /// Deadline for a freshly created workload to become ready.
    pub provision_deadline: Duration,
    /// Deadline used when an already-bound workload is found not-Running and must
    /// be waited on again before forwarding a request.
    pub reuse_deadline: Duration,
}

fn env_duration_secs(key: &str, default_secs: u64) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            sandbox_image: std::env::var("SANDBOX_IMAGE")
                .unwrap_or_else(|_| "kernel-executor:latest".to_string()),
            is_sandbox: std::env::var("IS_SANDBOX").is_ok(),
            idle_timeout: env_duration_secs("IDLE_TIMEOUT", 3600),
            check_interval: env_duration_secs("CHECK_INTERVAL", 3600),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "/app".to_string()),
            provision_deadline: env_duration_secs("PROVISION_DEADLINE", 300),
            reuse_deadline: env_duration_secs("REUSE_DEADLINE", 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        std::env::remove_var("SANDBOX_IMAGE");
        std::env::remove_var("IS_SANDBOX");
        std::env::remove_var("IDLE_TIMEOUT");
        let config = Config::from_env();
        assert!(!config.is_sandbox);
        assert_eq!(config.idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.upload_dir, "/app");
    }
}
