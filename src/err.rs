use chrono::NaiveDate;

/// Infrastructure faults inside the document store. These never reach the
/// license or parameter resolvers directly: the store collapses them to
/// "document unavailable" after logging.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("parse error: {0}")]
    ParseErr(String),
}

/// Terminal outcomes of a license check. Each reason stays distinct so
/// callers can branch on it; none are ever coalesced into a plain boolean.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// The license table could not be fetched, or was structurally invalid
    /// (missing `users` or `apps`).
    #[error("license table unavailable")]
    DocumentUnavailable,
    /// `min_version` or the declared client version is not an integer.
    #[error("malformed version value")]
    MalformedVersion,
    #[error("client version {current} is below the required minimum {minimum}")]
    VersionTooOld { current: i64, minimum: i64 },
    /// No `users` entry matches the local machine identity. Carries the
    /// identity so it can be surfaced for manual registration.
    #[error("machine identity {hwid} is not registered")]
    IdentityNotFound { hwid: String },
    #[error("application '{0}' is not listed in the license table")]
    ApplicationUnknown(String),
    #[error("user '{user}' has no license for '{app}'")]
    UserNotEntitled { user: String, app: String },
    /// Not active and no expiry date to fall back on.
    #[error("license is inactive")]
    LicenseInactive,
    #[error("malformed expiry date '{0}'")]
    MalformedExpiry(String),
    #[error("license expired on {0}")]
    LicenseExpired(NaiveDate),
}

impl Denial {
    /// Stable machine-readable code for UIs and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Denial::DocumentUnavailable => "DOCUMENT_UNAVAILABLE",
            Denial::MalformedVersion => "MALFORMED_VERSION",
            Denial::VersionTooOld { .. } => "VERSION_TOO_OLD",
            Denial::IdentityNotFound { .. } => "IDENTITY_NOT_FOUND",
            Denial::ApplicationUnknown(_) => "APPLICATION_UNKNOWN",
            Denial::UserNotEntitled { .. } => "USER_NOT_ENTITLED",
            Denial::LicenseInactive => "LICENSE_INACTIVE",
            Denial::MalformedExpiry(_) => "MALFORMED_EXPIRY",
            Denial::LicenseExpired(_) => "LICENSE_EXPIRED",
        }
    }
}
