use crate::errors::GatewayFault;
use crate::state::Gateway;
use kind::Kind;
use response::Response;
use result::Result;
use rocket::fs::TempFile;
use rocket::form::Form;
use rocket::State;
use serde::Serialize;

#[derive(rocket::FromForm)]
pub struct UploadForm<'r> {
    file: TempFile<'r>,
}

#[derive(Serialize, Kind)]
pub struct Uploaded {
    filename: String,
    size: usize,
    path: String,
}

#[derive(Serialize, Kind)]
pub struct FileListing {
    files: String,
}

/// Accepts a multipart file upload and writes it into the session's workload at
/// the configured upload directory, provisioning the workload on demand.
#[rocket::post("/sandboxes/<id>/upload", data = "<form>")]
pub async fn upload(
    gateway: &State<Gateway>,
    id: String,
    mut form: Form<UploadForm<'_>>,
) -> Result<Response<Uploaded>> {
    let filename = form
        .file
        .raw_name()
        .and_then(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| GatewayFault::invalid_argument("upload is missing a filename"))?;

    let path = form
        .file
        .path()
        .ok_or_else(|| GatewayFault::internal("uploaded file has no backing path"))?
        .to_path_buf();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| GatewayFault::internal(format!("failed to read uploaded file: {}", err)))?;
    let size = bytes.len();

    let path = gateway.ingestor.upload(&id, &filename, &bytes).await?;
    Ok(Uploaded {
        filename,
        size,
        path,
    }
    .into())
}

#[rocket::get("/sandboxes/<id>/files")]
pub async fn list_files(gateway: &State<Gateway>, id: String) -> Result<Response<FileListing>> {
    let files = gateway.ingestor.list_files(&id).await?;
    Ok(FileListing { files }.into())
}
