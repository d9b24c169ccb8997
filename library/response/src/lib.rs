use kind::Kind;
use rocket::request::Request;
use rocket::response::Responder;
use serde::Serialize;
use serde_json::{json, to_string_pretty};

/// A `Response` may be constructed from any type implementing both
/// [Serialize](serde::Serialize) and [Kind](kind::Kind), and handed straight back
/// to the HTTP framework, which sets content headers, serializes the payload, and
/// returns a 200.
///
/// ```
/// use serde::Serialize;
/// use response::Response;
/// use result::Result;
/// use kind::Kind;
/// use rocket::get;
///
/// #[derive(Serialize, Kind)]
/// struct Sandbox {}
///
/// #[get("/")]
/// async fn create() -> Result<Response<Sandbox>> {
///     Ok(Sandbox{}.into())
/// }
/// ```
pub struct Response<T> {
    payload: T,
}

impl<T: Serialize + Kind> From<T> for Response<T> {
    fn from(payload: T) -> Self {
        Self { payload }
    }
}

/// Serializes as `{"payload": {"kind": ..., "object": ...}, "error": null}`.
impl<'r, 'o: 'r, T: Serialize + Kind> Responder<'r, 'o> for Response<T> {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'o> {
        let mut response = rocket::Response::build();
        response.header(rocket::http::ContentType::JSON);
        response.status(rocket::http::Status::Ok);
        let json = json!({
            "payload": {
                "kind": self.payload.kind(),
                "object": self.payload
            },
            "error": null,
        });
        let json = to_string_pretty(&json)
            .unwrap_or_else(|_| panic!("failed to pretty print {}", json));
        response.sized_body(json.len(), std::io::Cursor::new(json));
        Ok(response.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use result::Result;
    use rocket::get;
    use rocket::local::blocking::Client;
    use rocket::routes;

    #[get("/")]
    async fn greet() -> Result<Response<String>> {
        Ok("hello, gateway".to_string().into())
    }

    #[test]
    fn test_string() {
        let client = Client::tracked(rocket::build().mount("/", routes![greet])).unwrap();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), rocket::http::Status::Ok);
        let got: serde_json::Value = response.into_json().unwrap();
        let want = serde_json::json!({
            "payload": {
                "kind": "String",
                "object": "hello, gateway"
            },
            "error": null
        });
        assert_eq!(got, want)
    }

    #[derive(Serialize, Kind)]
    struct Sandbox {
        id: String,
        status: String,
    }

    #[get("/")]
    async fn get_sandbox() -> Result<Response<Sandbox>> {
        Ok(Sandbox {
            id: "sandbox-deadbeef".to_string(),
            status: "Running".to_string(),
        }
        .into())
    }

    #[test]
    fn test_struct() {
        let client = Client::tracked(rocket::build().mount("/", routes![get_sandbox])).unwrap();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), rocket::http::Status::Ok);
        let got: serde_json::Value = response.into_json().unwrap();
        let want = serde_json::json!({
            "payload": {
                "kind": "Sandbox",
                "object": {
                    "id": "sandbox-deadbeef",
                    "status": "Running"
                }
            },
            "error": null
        });
        assert_eq!(got, want)
    }
}
