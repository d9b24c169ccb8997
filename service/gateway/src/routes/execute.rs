use crate::state::Gateway;
use bytes::Bytes;
use futures::stream::Stream;
use result::Result;
use rocket::http::ContentType;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use tokio_util::io::StreamReader;

#[derive(Deserialize)]
pub struct ExecuteRequest {
    code: String,
}

/// Wraps a pass-through NDJSON byte stream as a Rocket response body. The stream
/// is forwarded to the client exactly as it arrives from the workload's kernel
/// executor — no buffering, no re-framing (P5).
pub struct Ndjson<S>(StreamReader<S, Bytes>);

impl<S> Ndjson<S>
where
    S: Stream<Item = std::io::Result<Bytes>>,
{
    fn new(stream: S) -> Self {
        Self(StreamReader::new(stream))
    }
}

impl<'r, 'o: 'r, S> Responder<'r, 'o> for Ndjson<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'o,
{
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        let mut builder = rocket::Response::build();
        builder.header(ContentType::new("application", "x-ndjson"));
        builder.streamed_body(self.0);
        Ok(builder.finalize())
    }
}

/// Forwards `code` to the session's workload and streams the NDJSON response back
/// unmodified. The workload is provisioned lazily if `id` has never been used as a
/// session before.
#[rocket::post("/sandboxes/<id>/execute", data = "<req>")]
pub async fn execute(
    gateway: &State<Gateway>,
    id: String,
    req: Json<ExecuteRequest>,
) -> Result<Ndjson<impl Stream<Item = std::io::Result<Bytes>>>> {
    let stream = gateway.proxy.execute(&id, &req.code).await?;
    Ok(Ndjson::new(stream))
}
