use crate::errors::DriverError;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::api::ObjectMeta;
use kube::core::Resource;
use kube::Api;
use result::Result;

/// The namespace the gateway provisions workloads into. Configurable via
/// `KUBERNETES_NAMESPACE`; defaults to `app` per the external interface contract.
pub fn namespace() -> String {
    std::env::var("KUBERNETES_NAMESPACE").unwrap_or_else(|_| "app".to_string())
}

/// Returns a new Kubernetes client scoped to [namespace](self::namespace).
///
/// Constructing a client is itself a blocking-ish, fallible operation (it reads the
/// in-cluster service account token or the local kubeconfig); callers on the
/// cooperative scheduler should not hold the registry lock across this call.
pub async fn new<K>() -> Result<Api<K>>
where
    <K as Resource>::DynamicType: Default,
    K: k8s_openapi::Metadata<Ty = ObjectMeta>,
{
    let client = kube::Client::try_default()
        .await
        .map_err(DriverError::from)?;
    Ok(Api::namespaced(client, &namespace()))
}

pub async fn pods() -> Result<Api<Pod>> {
    new().await
}

pub async fn services() -> Result<Api<Service>> {
    new().await
}
