pub use error_derive::GatewayError;
pub use httpcode;
pub use httpcode::{HttpCode, Status};
pub use kind::Kind;
use rocket::request::Request;
use rocket::response::Responder;
use serde::{Serialize, Serializer};
use serde_json::{json, to_string_pretty};
pub use thiserror;
pub use thiserror::Error;

/// A `GatewayError` is the trait every error returned by any gateway component must
/// implement. It carries enough information to become an HTTP response on its own:
/// an [HttpCode](httpcode::HttpCode) for the status line, a [Kind](kind::Kind) for the
/// machine-readable discriminant, and whatever human-readable `message` its
/// [Display](std::fmt::Display) implementation produces.
///
/// The easiest way to implement this trait is through the derive macros re-exported
/// by this crate: [Error](thiserror::Error), [GatewayError](error_derive::GatewayError),
/// [HttpCode](httpcode::HttpCode), and [Kind](kind::Kind).
///
/// ```
/// use error::*;
///
/// #[derive(Error, GatewayError, HttpCode, Kind, Debug)]
/// #[error("sandbox {id} could not be found")]
/// #[code(Status::NotFound)]
/// struct SandboxNotFound {
///     id: String,
/// }
/// ```
pub trait GatewayError: std::error::Error + HttpCode + Kind + Send + Sync {}

/// Supports automatic boxing of any type implementing [GatewayError](crate::GatewayError).
impl<T: 'static + GatewayError> From<T> for Box<dyn GatewayError> {
    fn from(err: T) -> Self {
        Box::new(err)
    }
}

/// Serializes a boxed `GatewayError` as the JSON object `{"kind", "message", "cause"}`.
impl Serialize for Box<dyn GatewayError> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        json!({
            "kind": self.kind(),
            "message": format!("{}", self),
            "cause": self.source().map(|cause| format!("{}", cause)),
        })
        .serialize(serializer)
    }
}

/// Setting the HTTP status to the status declared by the error's `#[code(..)]`
/// attribute, content-type to JSON, and serializing the error as the response body.
impl<'r, 'o: 'r> Responder<'r, 'o> for Box<dyn GatewayError> {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'o> {
        let mut response = rocket::Response::build();
        response.header(rocket::http::ContentType::JSON);
        response.status(self.http_code());
        let json = json!({
            "payload": null,
            "error": self,
        });
        let json =
            to_string_pretty(&json).unwrap_or_else(|_| panic!("failed to pretty print {}", json));
        response.sized_body(json.len(), std::io::Cursor::new(json));
        Ok(response.finalize())
    }
}

/// A convenient way to lift a raw string into a first-class `GatewayError`, most
/// useful as a `#[source]` for a higher level error.
#[derive(Error, GatewayError, Kind, HttpCode, Debug)]
#[code(Status::InternalServerError)]
#[error("{inner}")]
pub struct StringError {
    inner: String,
}

impl<T: AsRef<str>> From<T> for StringError {
    fn from(inner: T) -> Self {
        Self {
            inner: inner.as_ref().to_string(),
        }
    }
}

impl From<Box<dyn GatewayError>> for StringError {
    fn from(inner: Box<dyn GatewayError>) -> Self {
        Self {
            inner: format!("{:?}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::get;
    use rocket::local::blocking::Client;
    use rocket::routes;

    #[derive(GatewayError, Error, Kind, HttpCode, Debug)]
    #[error("not today")]
    #[code(rocket::http::Status::BadGateway)]
    struct TooBad {}

    #[get("/")]
    async fn fail_without_cause() -> std::result::Result<(), Box<dyn GatewayError>> {
        Err(TooBad {}.into())
    }

    #[test]
    fn without_cause() {
        let client =
            Client::tracked(rocket::build().mount("/", routes![fail_without_cause])).unwrap();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), rocket::http::Status::BadGateway);
        let got: serde_json::Value = response.into_json().unwrap();
        let want = serde_json::json!({
            "payload": null,
            "error": {
                "kind": "TooBad",
                "message": "not today",
                "cause": null
            }
        });
        assert_eq!(got, want)
    }

    #[derive(GatewayError, Error, Kind, HttpCode, Debug)]
    #[error("upstream refused")]
    #[code(rocket::http::Status::NotFound)]
    struct TooBadWithCause {
        #[from]
        bad_guy: TooBad,
    }

    #[get("/")]
    async fn fail_with_cause() -> std::result::Result<(), Box<dyn GatewayError>> {
        Err(TooBadWithCause::from(TooBad {}).into())
    }

    #[test]
    fn with_cause() {
        let client = Client::tracked(rocket::build().mount("/", routes![fail_with_cause])).unwrap();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), rocket::http::Status::NotFound);
        let got: serde_json::Value = response.into_json().unwrap();
        let want = serde_json::json!({
            "payload": null,
            "error": {
                "kind": "TooBadWithCause",
                "message": "upstream refused",
                "cause": "not today"
            }
        });
        assert_eq!(got, want)
    }
}
