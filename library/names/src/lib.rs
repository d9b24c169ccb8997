use error::*;
use result::Result;
use uuid::Uuid;

const SANDBOX_PREFIX: &str = "sandbox-";

/// Returns a new, unique sandbox identifier of the form `sandbox-<8 hex chars>`.
///
/// This satisfies Kubernetes' RFC 1123 DNS subdomain requirements for pod and
/// service names (lowercase alphanumerics and `-`, starting with a letter) with
/// a very large margin to spare, so no further sanitisation is performed on it.
pub fn sandbox_name() -> String {
    let hex = hex8();
    format!("{}{}", SANDBOX_PREFIX, hex)
}

fn hex8() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    uuid[..8].to_string()
}

/// Returns the name of the sibling service that fronts a given pod name.
pub fn service_name<P: AsRef<str>>(pod_name: P) -> String {
    format!("{}-service", pod_name.as_ref())
}

#[derive(Error, GatewayError, Kind, HttpCode, Debug)]
#[error("filename '{filename}' is not acceptable: {reason}")]
#[code(Status::BadRequest)]
pub struct BadFilename {
    filename: String,
    reason: String,
}

/// Rejects filenames that are empty, contain a path separator, or reference a
/// parent directory. The in-sandbox upload target is a single flat directory, so
/// none of these are ever legitimate.
pub fn sanitize_filename<T: AsRef<str>>(filename: T) -> Result<String> {
    let filename = filename.as_ref();
    if filename.is_empty() {
        return Err(BadFilename {
            filename: filename.to_string(),
            reason: "filename is empty".to_string(),
        }
        .into());
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(BadFilename {
            filename: filename.to_string(),
            reason: "filename contains a path separator".to_string(),
        }
        .into());
    }
    if filename == "." || filename == ".." {
        return Err(BadFilename {
            filename: filename.to_string(),
            reason: "filename references a directory, not a file".to_string(),
        }
        .into());
    }
    Ok(filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_name_shape() {
        let name = sandbox_name();
        assert!(name.starts_with("sandbox-"));
        assert_eq!(name.len(), "sandbox-".len() + 8);
        assert!(name[8..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn sandbox_names_are_unique() {
        let a = sandbox_name();
        let b = sandbox_name();
        assert_ne!(a, b);
    }

    #[test]
    fn service_name_suffix() {
        assert_eq!(service_name("sandbox-deadbeef"), "sandbox-deadbeef-service");
    }

    #[test]
    fn rejects_empty_filename() {
        assert!(sanitize_filename("").is_err());
    }

    #[test]
    fn rejects_path_separators() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("a/b").is_err());
        assert!(sanitize_filename("a\\b").is_err());
    }

    #[test]
    fn rejects_bare_dots() {
        assert!(sanitize_filename(".").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn accepts_normal_filename() {
        assert_eq!(sanitize_filename("data.csv").unwrap(), "data.csv");
    }
}
