//! Series and index loading
//!
//! Documents are read through a `DataSource`, either a local directory or
//! an HTTP base URL. Batch loads fan out one fetch per entity and wait for
//! all of them; a failed entity is logged and left out of the result.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use heatmap_common::config::DataRoot;
use heatmap_common::model::{EntityIndex, EntityKind, Metric};
use heatmap_common::normalize::{normalize_state_series, StateSeriesDocument};
use heatmap_common::SeriesMetadata;

const USER_AGENT: &str = concat!("heatmap-compare/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Loading errors for a single document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid entity code: {0:?}")]
    InvalidCode(String),

    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    #[error("Invalid document {path}: {message}")]
    Parse { path: String, message: String },
}

/// Read access to the exported JSON documents
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Text of the document at `path`, relative to the data root
    async fn fetch_text(&self, path: &str) -> Result<String, LoadError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Documents under a local directory
#[derive(Debug, Clone)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for FsDataSource {
    async fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LoadError::NotFound(path.to_string()))
            }
            Err(e) => Err(LoadError::Io {
                path: full.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents served from an HTTP base URL
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| LoadError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Fetching document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
                url,
            });
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Data source for a configured data root
pub fn data_source_for(root: &DataRoot) -> Result<Arc<dyn DataSource>, LoadError> {
    Ok(match root {
        DataRoot::Directory(dir) => Arc::new(FsDataSource::new(dir.clone())),
        DataRoot::Url(url) => Arc::new(HttpDataSource::new(url)?),
    })
}

/// Entity codes are lowercase slugs such as `united-states` or `new_york`
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Load one entity's series, normalizing state documents
pub async fn fetch_series(
    source: &dyn DataSource,
    kind: EntityKind,
    metric: Metric,
    code: &str,
) -> Result<SeriesMetadata, LoadError> {
    if !is_valid_code(code) {
        return Err(LoadError::InvalidCode(code.to_string()));
    }
    let path = kind.series_path(metric, code);
    let text = source.fetch_text(&path).await?;

    let parsed = match kind {
        EntityKind::Country => SeriesMetadata::from_json(&text),
        EntityKind::State => StateSeriesDocument::from_json(&text).map(normalize_state_series),
    };
    parsed.map_err(|e| LoadError::Parse {
        path,
        message: e.to_string(),
    })
}

pub async fn fetch_index(source: &dyn DataSource, kind: EntityKind) -> Result<EntityIndex, LoadError> {
    let path = kind.index_path();
    let text = source.fetch_text(path).await?;
    EntityIndex::from_json(&text).map_err(|e| LoadError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Load several entities concurrently
///
/// Every fetch is issued up front and awaited together. Entities that fail
/// to load are logged and omitted; the others are returned keyed by code.
pub async fn load_series_batch(
    source: &dyn DataSource,
    kind: EntityKind,
    metric: Metric,
    codes: &[String],
) -> BTreeMap<String, SeriesMetadata> {
    let fetches = codes.iter().map(|code| async move {
        let result = fetch_series(source, kind, metric, code).await;
        (code, result)
    });

    let mut loaded = BTreeMap::new();
    for (code, result) in join_all(fetches).await {
        match result {
            Ok(series) => {
                debug!(
                    entity = %code,
                    metric = %metric,
                    cells = series.data.len(),
                    "Loaded series"
                );
                loaded.insert(code.clone(), series);
            }
            Err(e) => {
                warn!(
                    entity = %code,
                    metric = %metric,
                    error = %e,
                    "Failed to load series; omitting from comparison"
                );
            }
        }
    }
    loaded
}
