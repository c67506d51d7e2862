//! Vidavox RAG Client Library
//!
//! HTTP client for the Vidavox RAG document service: folders, file uploads,
//! and semantic search, plus name-based operations that resolve folder names
//! through the service's folder tree.
//!
//! ```rust,no_run
//! use vidavox_rs::{Client, ClientConfig, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> vidavox_rs::Result<()> {
//!     let client = Client::from_config(&ClientConfig::new("http://localhost:8002", "my-key"))?;
//!     client.create_folder("Papers", None).await?;
//!     client.upload_files_to_folder("Papers", &["paper.pdf"]).await?;
//!     let answer = client
//!         .search_in_folder("Papers", &SearchRequest::new("What is the introduction?"))
//!         .await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```

mod client;

pub use client::Client;
pub use vidavox_core::tree::{self, NodeType, TreeError, TreeNode};
pub use vidavox_core::{
    ClientConfig, ConfigError, DeleteOutcome, File, FileList, FileScope, Folder, FolderList,
    PromptType, SearchDocument, SearchHistory, SearchRequest, SearchResponse, TreeFetcher,
    UploadResponse, UploadResult,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Request validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed folder tree: {0}")]
    MalformedTree(#[from] TreeError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Map an error status and its extracted message to a variant
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ClientError::Validation(message),
            401 => ClientError::Authentication(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            429 => ClientError::RateLimited(message),
            500..=599 => ClientError::Server { status, message },
            _ => ClientError::Http { status, message },
        }
    }

    /// HTTP status behind this error, when the service answered at all.
    ///
    /// Folder names missing from the tree also report 404.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Validation(_) => Some(400),
            ClientError::Authentication(_) => Some(401),
            ClientError::NotFound(_) => Some(404),
            ClientError::Conflict(_) => Some(409),
            ClientError::RateLimited(_) => Some(429),
            ClientError::Server { status, .. } | ClientError::Http { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        let msg = || "boom".to_string();
        assert!(matches!(ClientError::from_status(400, msg()), ClientError::Validation(_)));
        assert!(matches!(
            ClientError::from_status(401, msg()),
            ClientError::Authentication(_)
        ));
        assert!(ClientError::from_status(404, msg()).is_not_found());
        assert!(matches!(ClientError::from_status(409, msg()), ClientError::Conflict(_)));
        assert!(matches!(ClientError::from_status(429, msg()), ClientError::RateLimited(_)));
        assert!(matches!(
            ClientError::from_status(503, msg()),
            ClientError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ClientError::from_status(418, msg()),
            ClientError::Http { status: 418, .. }
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [400u16, 401, 404, 409, 429, 500, 502, 418] {
            assert_eq!(
                ClientError::from_status(status, String::new()).status(),
                Some(status)
            );
        }
        assert_eq!(ClientError::Timeout.status(), None);
        assert_eq!(
            ClientError::Config(ConfigError::InvalidApiKey).status(),
            None
        );
        assert_eq!(
            ClientError::InvalidResponse("bad body".to_string()).status(),
            None
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = ClientError::from_status(502, "upstream down".to_string());
        assert_eq!(err.to_string(), "Server error: 502 - upstream down");
    }
}
