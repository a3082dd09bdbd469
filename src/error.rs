use std::path::PathBuf;
use std::time::Duration;

/// Failures reported by a browser session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Nothing on the current page matches the locator
    #[error("no element matches {0}")]
    NoSuchElement(String),

    /// The driver itself failed (lost session, protocol error, ...)
    #[error("browser driver error: {0}")]
    Driver(String),
}

impl SessionError {
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, SessionError::NoSuchElement(_))
    }
}

/// Errors that abort a scraping run.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A readiness predicate never became true
    #[error("{page} did not become ready within {waited:?}")]
    PageLoadTimeout { page: String, waited: Duration },

    /// An expected control vanished after its page was already loaded
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error(transparent)]
    Session(SessionError),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid one-time password secret: {0}")]
    InvalidSecret(String),

    #[error("receipts directory {0} does not exist")]
    ReceiptsDirMissing(PathBuf),

    #[error("invalid order id {0:?}")]
    InvalidOrderId(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::PageLoadTimeout { .. })
    }
}

impl From<SessionError> for ScrapeError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoSuchElement(locator) => ScrapeError::ElementNotFound(locator),
            other => ScrapeError::Session(other),
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_becomes_element_not_found() {
        let err: ScrapeError = SessionError::NoSuchElement("#ap_email".to_string()).into();
        assert!(matches!(err, ScrapeError::ElementNotFound(ref l) if l == "#ap_email"));
    }

    #[test]
    fn test_driver_error_stays_a_session_error() {
        let err: ScrapeError = SessionError::Driver("session gone".to_string()).into();
        assert!(matches!(err, ScrapeError::Session(SessionError::Driver(_))));
        assert!(!err.is_timeout());
    }
}
