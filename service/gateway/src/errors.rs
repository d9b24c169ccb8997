use error::*;

/// The error taxonomy surfaced to HTTP clients, per the gateway's error-handling
/// design: every component translates whatever it fails with into one of these
/// before it crosses a component boundary.
#[derive(Error, Kind, GatewayError, HttpCode, Debug)]
pub enum GatewayFault {
    #[error("{message}")]
    #[code(Status::BadRequest)]
    InvalidArgument { message: String },

    #[error("{message}")]
    #[code(Status::NotFound)]
    NotFound { message: String },

    #[error("{message}")]
    #[code(Status::ServiceUnavailable)]
    Unavailable { message: String },

    #[error("{message}")]
    #[code(Status::GatewayTimeout)]
    DeadlineExceeded { message: String },

    #[error("{message}")]
    #[code(Status::BadGateway)]
    UpstreamProtocol { message: String },

    #[error("{message}")]
    #[code(Status::InternalServerError)]
    Internal { message: String },
}

/// Carries a non-2xx upstream HTTP status straight through to the caller, per
/// §4.4 step 6 ("propagate upstream HTTP failure status as `UpstreamError`") and
/// the failure-classification table's "Non-2xx HTTP response → passthrough of
/// status with reason" row. The status isn't one of the six fixed kinds above —
/// it's whatever the kernel executor actually answered with — so `HttpCode` is
/// implemented by hand instead of via `#[code(...)]`, which only supports a
/// status fixed at the variant, not one carried in a field.
#[derive(Error, Kind, GatewayError, Debug)]
#[error("upstream responded {status}: {reason}")]
pub struct UpstreamStatus {
    status: u16,
    reason: String,
}

impl UpstreamStatus {
    pub fn new(status: u16, reason: String) -> Self {
        Self { status, reason }
    }
}

impl HttpCode for UpstreamStatus {
    fn http_code(&self) -> Status {
        Status::from_code(self.status).unwrap_or(Status::BadGateway)
    }
}

impl GatewayFault {
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable<T: Into<String>>(message: T) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn deadline_exceeded<T: Into<String>>(message: T) -> Self {
        Self::DeadlineExceeded {
            message: message.into(),
        }
    }

    pub fn upstream_protocol<T: Into<String>>(message: T) -> Self {
        Self::UpstreamProtocol {
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
