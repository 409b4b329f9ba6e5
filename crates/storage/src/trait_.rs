//! Cache and source trait abstractions.

use async_trait::async_trait;
use devpulse_core::{Project, Time};

use crate::json_storage::CachedProjects;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistent cache of an organization's project list.
///
/// This trait allows different cache backends to be plugged in.
#[async_trait]
pub trait ProjectCache: Send + Sync {
    /// Load the cached entry regardless of age; `None` when absent or unreadable.
    async fn load(&self) -> Result<Option<CachedProjects>>;

    /// Replace the cached entry.
    async fn save(&self, projects: &[Project], timestamp: Time) -> Result<()>;

    /// Load the cached projects only when younger than the cache's maximum age.
    async fn load_fresh(&self, now: Time) -> Result<Option<Vec<Project>>>;
}

/// Accessor for a fresh project list, typically the tracking service.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch all projects.
    async fn fetch_projects(&self) -> Result<Vec<Project>>;
}
