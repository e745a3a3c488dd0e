//! Error types shared by the search engine, the transport and the feed parser

use thiserror::Error;

/// A response body that could not be turned into feed items
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not a readable feed document
    #[error("malformed feed: {0}")]
    Malformed(String),
}

/// A request that never produced an HTTP status line
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or client construction failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The configured request timeout is negative, NaN or too large
    #[error("invalid request timeout: {0} seconds")]
    InvalidTimeout(f64),
    /// Failure reported by a custom transport
    #[error("{0}")]
    Other(String),
}

/// Errors that abort a whole search batch
///
/// Per-subject failures (non-200 responses, unreachable hosts) are not errors at
/// this level: they are recorded in the engine's error map and the batch goes on.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A 200 response carried a body the parser rejected
    #[error("failed to parse feed for '{subject}': {source}")]
    Parse {
        subject: String,
        #[source]
        source: ParseError,
    },
    /// A request worker panicked before reporting its outcome
    #[error("search worker for '{subject}' panicked: {message}")]
    Worker { subject: String, message: String },
    /// The configured endpoint does not form a valid URL
    #[error("invalid search endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    /// The default HTTP transport could not be built
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The blocking fetch could not start its runtime
    #[error("failed to start fetch runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_subject() {
        let err = SearchError::Parse {
            subject: "Foo".to_string(),
            source: ParseError::Malformed("unexpected end of input".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse feed for 'Foo': malformed feed: unexpected end of input"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = SearchError::from(TransportError::Other("connection reset".to_string()));
        assert_eq!(err.to_string(), "connection reset");
    }
}
