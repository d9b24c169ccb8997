use crate::state::Gateway;
use kind::Kind;
use response::Response;
use result::Result;
use rocket::State;
use serde::Serialize;

#[derive(Serialize, Kind)]
pub struct SessionInitialized {
    status: String,
    session_id: String,
    sandbox_id: String,
}

/// Binds `id` to a ready workload, creating one if this is the session's first
/// call. A second call against the same session id is a no-op that reports the
/// existing binding rather than provisioning again (scenario 6).
#[rocket::post("/sessions/<id>/initialize")]
pub async fn initialize(gateway: &State<Gateway>, id: String) -> Result<Response<SessionInitialized>> {
    let already_bound = gateway.registry.get(&id).await.is_some();
    let workload_id = gateway.provisioner.ensure_workload(&id).await?;
    let status = if already_bound { "exists" } else { "created" };
    Ok(SessionInitialized {
        status: status.to_string(),
        session_id: id,
        sandbox_id: workload_id,
    }
    .into())
}
