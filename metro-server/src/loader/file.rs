//! JSON-on-disk network store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::domain::{NetworkId, NetworkSummary, RawNetwork};

use super::error::LoaderError;
use super::{Catalog, Loader};

/// Just the display name of a network file.
#[derive(Debug, Deserialize)]
struct NetworkHeader {
    #[serde(default)]
    name: Option<String>,
}

/// Store that keeps one `<network_id>.json` file per network.
///
/// Each file holds a serialized [`RawNetwork`].
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a store over the given directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn network_path(&self, network: &NetworkId) -> PathBuf {
        self.data_dir.join(format!("{}.json", network.as_str()))
    }
}

impl Loader for FileStore {
    async fn fetch_network(&self, network: &NetworkId) -> Result<RawNetwork, LoaderError> {
        let path = self.network_path(network);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoaderError::NotFound(network.clone()));
            }
            Err(e) => {
                return Err(LoaderError::Unavailable {
                    message: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| LoaderError::Malformed {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

impl Catalog for FileStore {
    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, LoaderError> {
        let mut entries =
            tokio::fs::read_dir(&self.data_dir)
                .await
                .map_err(|e| LoaderError::Unavailable {
                    message: format!(
                        "failed to read data directory {}: {}",
                        self.data_dir.display(),
                        e
                    ),
                })?;

        let mut networks = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(LoaderError::Unavailable {
                        message: format!("failed to read directory entry: {}", e),
                    });
                }
            };

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // Files whose stem is not a valid network id are not networks
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NetworkId::parse(s).ok())
            else {
                continue;
            };

            let name = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => match serde_json::from_str::<NetworkHeader>(&contents) {
                    Ok(header) => header.name,
                    Err(e) => {
                        warn!(network = %id, error = %e, "Unreadable network file in catalog");
                        None
                    }
                },
                Err(e) => {
                    warn!(network = %id, error = %e, "Failed to read network file for catalog");
                    None
                }
            };

            networks.push(NetworkSummary {
                name: name.unwrap_or_else(|| id.to_string()),
                id,
            });
        }

        networks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(networks)
    }
}
