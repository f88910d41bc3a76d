/// All error types that can occur when discovering or controlling Key Lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// An HTTP request to a light failed before a response was received.
    #[error("http {action} error: {err}")]
    Http { action: String, err: reqwest::Error },

    /// A light answered with a non-success HTTP status.
    #[error("unexpected status {status} from {path}")]
    Status { path: String, status: u16 },

    /// The port part of a light address is not a valid TCP port.
    #[error("port must be a number between 1 and 65535 (got {port})")]
    InvalidPort { port: String },

    /// The light address could not be used at all.
    #[error("invalid light address {0:?}")]
    InvalidAddress(String),

    /// The operation deadline elapsed while discovery was still listening.
    #[error("timed out while discovering devices")]
    DiscoveryTimeout,

    /// The operation was interrupted before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation deadline elapsed while talking to a light.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// The discovery transport failed.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// A light reported a failure that is not tied to a transport.
    #[error("device error: {0}")]
    Device(String),
}

impl Error {
    /// Process exit code used when the operation deadline elapses during discovery.
    pub const DISCOVERY_TIMEOUT_EXIT_CODE: u8 = 3;

    /// Create a new http error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new unexpected status error
    pub fn status(path: &str, status: u16) -> Self {
        Error::Status {
            path: path.to_string(),
            status,
        }
    }

    /// Create a new invalid port error
    pub fn invalid_port(port: &str) -> Self {
        Error::InvalidPort {
            port: port.to_string(),
        }
    }

    /// Create a new discovery transport error
    pub fn discovery(reason: impl ToString) -> Self {
        Error::Discovery(reason.to_string())
    }

    /// Exit code a command line front end should terminate with.
    ///
    /// Interruption is a clean exit; a discovery timeout has its own code so
    /// scripts can tell "no devices answered in time" apart from other failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylight_rs::Error;
    ///
    /// assert_eq!(Error::Cancelled.exit_code(), 0);
    /// assert_eq!(Error::DiscoveryTimeout.exit_code(), 3);
    /// assert_eq!(Error::invalid_port("0").exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Cancelled => 0,
            Error::DiscoveryTimeout => Self::DISCOVERY_TIMEOUT_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
