use crate::errors::GatewayFault;
use crate::state::Gateway;
use kind::Kind;
use response::Response;
use result::Result;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize)]
pub struct CreateSandboxRequest {
    lang: String,
}

#[derive(Serialize, Kind)]
pub struct SandboxCreated {
    id: String,
    name: String,
    status: String,
}

#[derive(Serialize, Kind)]
pub struct SandboxSummary {
    id: String,
    name: String,
    status: String,
    ready: bool,
}

#[derive(Serialize, Kind)]
pub struct SandboxList {
    sandboxes: Vec<SandboxSummary>,
}

#[derive(Serialize, Kind)]
pub struct SandboxDetail {
    id: String,
    name: String,
    status: String,
    ip: Option<String>,
    ready: bool,
}

#[derive(Serialize, Kind)]
pub struct Deleted {
    message: String,
}

/// Creates a new sandbox workload and returns immediately with `status: "creating"`
/// — it does not wait for readiness. The new workload is self-bound in the
/// registry under its own id as a session key, so a subsequent
/// `/sandboxes/{id}/execute` call against the returned `id` finds it already
/// provisioned instead of lazily creating a second one.
#[rocket::post("/sandboxes", data = "<req>")]
pub async fn create_sandbox(
    gateway: &State<Gateway>,
    req: Json<CreateSandboxRequest>,
) -> Result<Response<SandboxCreated>> {
    if req.lang.to_lowercase() != "python" {
        return Err(GatewayFault::invalid_argument("Only Python sandboxes are supported.").into());
    }

    let pod_name = names::sandbox_name();
    let service_name = names::service_name(&pod_name);
    let workload = gateway
        .driver
        .create_workload(
            &pod_name,
            &service_name,
            &gateway.config.sandbox_image,
            "python",
            &BTreeMap::new(),
        )
        .await?;

    let addr = workload
        .addr
        .unwrap_or_else(|| format!("{}:{}", service_name, k8s::KERNEL_PORT));
    gateway
        .registry
        .bind(&pod_name, &pod_name, &service_name, &addr)
        .await;

    Ok(SandboxCreated {
        id: pod_name.clone(),
        name: pod_name,
        status: "creating".to_string(),
    }
    .into())
}

#[rocket::get("/sandboxes")]
pub async fn list_sandboxes(gateway: &State<Gateway>) -> Result<Response<SandboxList>> {
    let pods = gateway.driver.list_labelled().await?;
    let sandboxes = pods
        .iter()
        .map(|pod| {
            let workload = k8s::workload::from_pod(pod, None);
            SandboxSummary {
                id: workload.id.clone(),
                name: workload.id,
                status: format!("{:?}", workload.status),
                ready: workload.ready,
            }
        })
        .collect();
    Ok(SandboxList { sandboxes }.into())
}

#[rocket::get("/sandboxes/<id>")]
pub async fn get_sandbox(gateway: &State<Gateway>, id: String) -> Result<Response<SandboxDetail>> {
    let service_name = names::service_name(&id);
    let workload = gateway.driver.read_workload(&id, &service_name).await?;
    Ok(SandboxDetail {
        id: workload.id.clone(),
        name: workload.id,
        status: format!("{:?}", workload.status),
        ip: workload.addr,
        ready: workload.ready,
    }
    .into())
}

#[rocket::delete("/sandboxes/<id>")]
pub async fn delete_sandbox(gateway: &State<Gateway>, id: String) -> Result<Response<Deleted>> {
    let service_name = names::service_name(&id);
    gateway.driver.delete_workload(&id, &service_name).await?;
    gateway.registry.unbind(&id).await;
    Ok(Deleted {
        message: format!("Sandbox {} deleted", id),
    }
    .into())
}
