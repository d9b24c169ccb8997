use crate::errors::GatewayFault;
use crate::sandbox::provisioner::Provisioner;
use crate::sandbox::registry::Registry;
use k8s::OrchestratorDriver;
use result::Result;
use std::sync::Arc;

/// Writes a file into a session's workload over the orchestrator's exec channel.
/// Shares the driver and provisioner with the rest of the sandbox subsystem; it
/// has no state of its own beyond the target directory.
pub struct FileIngestor {
    registry: Arc<Registry>,
    provisioner: Arc<Provisioner>,
    driver: OrchestratorDriver,
    upload_dir: String,
}

impl FileIngestor {
    pub fn new(
        registry: Arc<Registry>,
        provisioner: Arc<Provisioner>,
        driver: OrchestratorDriver,
        upload_dir: String,
    ) -> Self {
        Self {
            registry,
            provisioner,
            driver,
            upload_dir,
        }
    }

    /// Provisions (if necessary) and writes `bytes` to `filename` inside the
    /// session's workload, returning the absolute path the file landed at.
    pub async fn upload(&self, session_id: &str, filename: &str, bytes: &[u8]) -> Result<String> {
        let filename = names::sanitize_filename(filename)?;
        let workload_id = self.provisioner.ensure_workload(session_id).await?;
        let path = format!("{}/{}", self.upload_dir, filename);

        self.driver
            .exec_write_file(&workload_id, &path, bytes)
            .await?;
        self.registry.touch(&workload_id).await;
        Ok(path)
    }

    /// Lists the contents of the upload directory inside the session's workload via
    /// `ls -la`, returning the raw command output as the kernel executor's own
    /// filesystem does not expose a structured listing endpoint.
    pub async fn list_files(&self, session_id: &str) -> Result<String> {
        let workload_id = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| GatewayFault::not_found(format!("no workload bound to session '{}'", session_id)))?;

        let output = self
            .driver
            .exec(
                &workload_id,
                vec!["ls".to_string(), "-la".to_string(), self.upload_dir.clone()],
            )
            .await?;
        self.registry.touch(&workload_id).await;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal_before_any_exec() {
        assert!(names::sanitize_filename("../etc/passwd").is_err());
    }
}
