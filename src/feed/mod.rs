pub mod client;
pub mod schema;

use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// The feeds the backend serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FeedKind {
    People,
    Frequencies,
    Duplicates,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::People, FeedKind::Frequencies, FeedKind::Duplicates];

    /// Endpoint path used when the config does not override it
    pub fn default_path(self) -> &'static str {
        match self {
            FeedKind::People => "/people",
            FeedKind::Frequencies => "/people/emails/char-frequencies",
            FeedKind::Duplicates => "/people/emails/duplicates",
        }
    }

    /// Region title in the dashboard
    pub fn title(self) -> &'static str {
        match self {
            FeedKind::People => "People",
            FeedKind::Frequencies => "Email Character Frequencies",
            FeedKind::Duplicates => "Possible Duplicates",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FeedKind::People => "people",
            FeedKind::Frequencies => "frequencies",
            FeedKind::Duplicates => "duplicates",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a feed request produced no payload
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed url {url}: {reason}")]
    Url { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Payload state for one feed region.
///
/// The payload starts unset and is replaced wholesale by every successful
/// fetch. A failed fetch leaves it exactly as it was.
#[derive(Debug, Clone)]
pub struct Feed<T> {
    kind: FeedKind,
    endpoint: String,
    payload: Option<Vec<T>>,
    pending: usize,
    last_error: Option<String>,
    updated_at: Option<Instant>,
}

impl<T> Feed<T> {
    pub fn new(kind: FeedKind, endpoint: impl Into<String>) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            payload: None,
            pending: 0,
            last_error: None,
            updated_at: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current payload, empty when nothing has been fetched yet
    pub fn payload(&self) -> &[T] {
        self.payload.as_deref().unwrap_or(&[])
    }

    /// Whether at least one fetch has succeeded
    pub fn is_loaded(&self) -> bool {
        self.payload.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }

    /// Record that a request for this feed has been sent
    pub fn mark_pending(&mut self) {
        self.pending += 1;
    }

    /// Apply the outcome of one request.
    ///
    /// On success the payload is replaced; on failure it is kept and the error
    /// is handed back to the caller.
    pub fn apply(&mut self, result: Result<Vec<T>, FeedError>) -> Result<(), FeedError> {
        self.pending = self.pending.saturating_sub(1);
        match result {
            Ok(payload) => {
                tracing::debug!(feed = %self.kind, items = payload.len(), "Replacing payload");
                self.payload = Some(payload);
                self.last_error = None;
                self.updated_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
