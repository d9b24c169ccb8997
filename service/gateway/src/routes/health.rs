use kind::Kind;
use response::Response;
use serde::Serialize;

#[derive(Serialize, Kind)]
pub struct Health {
    status: String,
    timestamp: f64,
}

#[rocket::get("/health")]
pub async fn health() -> Response<Health> {
    Health {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
    }
    .into()
}
