//! JSON file storage implementation.
//!
//! Stores the project list as a single JSON document stamped with the time it
//! was fetched. Entries older than the configured age are treated as stale.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use devpulse_core::{Project, Time};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use super::{ProjectCache, ProjectSource, Result, StorageError};

/// Default maximum cache age.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// On-disk layout of the project cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProjects {
    /// When the list was fetched
    pub timestamp: Time,

    /// Organization the list belongs to
    #[serde(default)]
    pub organization: String,

    /// Number of projects, stored for quick inspection
    #[serde(default)]
    pub project_count: usize,

    /// The projects
    pub projects: Vec<Project>,
}

impl CachedProjects {
    /// Whether the entry is younger than `max_age` at `now`.
    pub fn is_fresh(&self, now: Time, max_age: Duration) -> bool {
        now - self.timestamp < max_age
    }
}

/// File-based JSON project cache.
pub struct JsonProjectCache {
    path: PathBuf,
    organization: String,
    max_age: Duration,
}

impl JsonProjectCache {
    /// Create a cache at `path` for `organization` with the default 24h age.
    pub fn new(path: impl AsRef<Path>, organization: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            organization: organization.into(),
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
        }
    }

    /// Override the maximum age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Cache file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ProjectCache for JsonProjectCache {
    async fn load(&self) -> Result<Option<CachedProjects>> {
        match read_json::<CachedProjects>(&self.path).await {
            Ok(entry) => Ok(entry),
            Err(StorageError::Json(e)) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable project cache");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, projects: &[Project], timestamp: Time) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let entry = CachedProjects {
            timestamp,
            organization: self.organization.clone(),
            project_count: projects.len(),
            projects: projects.to_vec(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(&self.path, json.as_bytes()).await?;

        debug!(path = %self.path.display(), count = projects.len(), "Saved project cache");
        Ok(())
    }

    async fn load_fresh(&self, now: Time) -> Result<Option<Vec<Project>>> {
        let Some(entry) = self.load().await? else {
            return Ok(None);
        };
        if entry.is_fresh(now, self.max_age) {
            Ok(Some(entry.projects))
        } else {
            debug!(path = %self.path.display(), fetched = %entry.timestamp, "Project cache is stale");
            Ok(None)
        }
    }
}

/// Project source backed by a JSON file holding an array of projects.
pub struct JsonProjectSource {
    path: PathBuf,
}

impl JsonProjectSource {
    /// Create a source reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl ProjectSource for JsonProjectSource {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        read_json(&self.path)
            .await?
            .ok_or_else(|| StorageError::NotFound(self.path.display().to_string()))
    }
}

/// Return cached projects when fresh, otherwise fetch from `source` and
/// refresh the cache. `refresh` bypasses the cache read. A failure to write
/// the cache is logged and does not fail the call.
pub async fn cached_projects(
    cache: &dyn ProjectCache,
    source: &dyn ProjectSource,
    refresh: bool,
) -> Result<Vec<Project>> {
    let now = Utc::now();

    if !refresh {
        match cache.load_fresh(now).await {
            Ok(Some(projects)) => {
                debug!(count = projects.len(), "Using cached project list");
                return Ok(projects);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Project cache unavailable"),
        }
    }

    let projects = source.fetch_projects().await?;
    info!(count = projects.len(), "Fetched project list");

    if let Err(e) = cache.save(&projects, now).await {
        warn!(error = %e, "Failed to save project cache");
    }
    Ok(projects)
}

/// Keep projects whose name matches one of `names` exactly; all when `names` is empty.
pub fn filter_projects_by_name(projects: Vec<Project>, names: &[String]) -> Vec<Project> {
    if names.is_empty() {
        return projects;
    }
    projects
        .into_iter()
        .filter(|p| names.iter().any(|n| n == &p.name))
        .collect()
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
