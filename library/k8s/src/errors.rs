use error::*;

/// `DriverError` is the taxonomy of failures the [driver](crate::driver) surfaces to the
/// rest of the gateway. It intentionally does not distinguish between every possible
/// Kubernetes API failure mode — the orchestrator is treated as partially available,
/// and anything that isn't one of the named cases below collapses into `Unavailable`
/// without retry; the caller decides what to do next.
#[derive(Error, Kind, GatewayError, HttpCode, Debug)]
pub enum DriverError {
    #[error("a workload named '{name}' already exists")]
    #[code(Status::Conflict)]
    Conflict { name: String },

    #[error("the orchestrator refused the request: {reason}")]
    #[code(Status::Forbidden)]
    Forbidden { reason: String },

    #[error("workload '{name}' was not found")]
    #[code(Status::NotFound)]
    NotFound { name: String },

    #[error("workload '{name}' did not become ready within {elapsed}")]
    #[code(Status::GatewayTimeout)]
    DeadlineExceeded { name: String, elapsed: String },

    #[error("exec into workload '{name}' failed: {reason}")]
    #[code(Status::ServiceUnavailable)]
    ExecFailed { name: String, reason: String },

    #[error("the orchestrator API is unavailable")]
    #[code(Status::ServiceUnavailable)]
    Unavailable(#[source] kube::Error),
}

impl From<kube::Error> for DriverError {
    fn from(err: kube::Error) -> Self {
        match &err {
            // 409 Conflict is deliberately not handled here: the opaque Kubernetes
            // API message doesn't carry the resource name the caller attempted to
            // create. Callers with that name in scope (e.g. `create_workload`)
            // construct `DriverError::Conflict` directly instead.
            kube::Error::Api(response) if response.code == 403 => DriverError::Forbidden {
                reason: response.message.clone(),
            },
            kube::Error::Api(response) if response.code == 404 => DriverError::NotFound {
                name: response.message.clone(),
            },
            // Every other transport/API failure is treated as a transient
            // unavailability of the orchestrator. No retry is attempted here;
            // that decision belongs to the caller.
            _ => DriverError::Unavailable(err),
        }
    }
}
