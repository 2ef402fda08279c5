//! Benchmark profile: the TOML file declaring one test group.
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::backend::{BackendKind, BackendSpec, PeerDescriptor};
use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::DEFAULT_KEY_WINDOW;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub test: TestSection,
    pub backend: BackendSection,
    /// Ordered peer hosts; ordinals are assigned by list position.
    pub peers: Vec<String>,
    #[serde(default)]
    pub storage: Option<StorageSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSection {
    pub client_count: u64,
    pub request_count: u64,
    #[serde(default = "default_key_window")]
    pub key_window: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    pub kind: String,
    pub binary: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    pub client_port: u16,
    pub peer_port: u16,
    #[serde(default = "default_tick_time_ms")]
    pub tick_time_ms: u64,
    #[serde(default = "default_init_limit")]
    pub init_limit: u64,
    #[serde(default = "default_sync_limit")]
    pub sync_limit: u64,
    #[serde(default = "default_snapshot_count")]
    pub snapshot_count: u64,
    #[serde(default = "default_max_client_connections")]
    pub max_client_connections: u64,
    #[serde(default = "default_election_timeout_ms")]
    pub election_timeout_ms: u64,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_cluster_token")]
    pub cluster_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
}

const fn default_key_window() -> u64 {
    DEFAULT_KEY_WINDOW
}
const fn default_tick_time_ms() -> u64 {
    2000
}
const fn default_init_limit() -> u64 {
    5
}
const fn default_sync_limit() -> u64 {
    5
}
const fn default_snapshot_count() -> u64 {
    100_000
}
const fn default_max_client_connections() -> u64 {
    5000
}
const fn default_election_timeout_ms() -> u64 {
    1000
}
const fn default_heartbeat_interval_ms() -> u64 {
    100
}
fn default_cluster_token() -> String {
    "dbbench-cluster".to_owned()
}

impl Profile {
    /// Loads and validates a profile from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed, or fails
    /// validation.
    pub async fn load(path: &Path) -> AppResult<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| {
                AppError::config(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            })?;
        let profile: Self = toml::from_str(&contents)
            .map_err(|source| AppError::config(ConfigError::Parse { source }))?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> AppResult<()> {
        if self.peers.is_empty() {
            return Err(AppError::config(ConfigError::NoPeers));
        }
        if self.test.client_count == 0 {
            return Err(AppError::config(ConfigError::InvalidValue {
                field: "test.client_count",
                message: "must be >= 1".to_owned(),
            }));
        }
        if self.test.key_window == 0 {
            return Err(AppError::config(ConfigError::InvalidValue {
                field: "test.key_window",
                message: "must be >= 1".to_owned(),
            }));
        }
        self.kind()?;
        Ok(())
    }

    /// Parsed backend kind.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized kind string.
    pub fn kind(&self) -> AppResult<BackendKind> {
        BackendKind::from_str(&self.backend.kind).map_err(|_| {
            AppError::config(ConfigError::UnknownBackend {
                value: self.backend.kind.clone(),
            })
        })
    }

    /// One spec per peer, ordinals assigned by list position. Every agent
    /// receives the identical peer list.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend kind does not parse.
    pub fn backend_specs(&self) -> AppResult<Vec<BackendSpec>> {
        let kind = self.kind()?;
        let peers = PeerDescriptor::from_hosts(&self.peers);
        Ok(peers
            .iter()
            .map(|peer| BackendSpec {
                kind,
                ordinal: peer.ordinal,
                binary: self.backend.binary.clone(),
                data_dir: self.backend.data_dir.clone(),
                config_path: self.backend.config_path.clone(),
                work_dir: self.backend.work_dir.clone(),
                client_port: self.backend.client_port,
                peer_port: self.backend.peer_port,
                peers: peers.clone(),
                tick_time_ms: self.backend.tick_time_ms,
                init_limit: self.backend.init_limit,
                sync_limit: self.backend.sync_limit,
                snapshot_count: self.backend.snapshot_count,
                max_client_connections: self.backend.max_client_connections,
                election_timeout_ms: self.backend.election_timeout_ms,
                heartbeat_interval_ms: self.backend.heartbeat_interval_ms,
                cluster_token: self.backend.cluster_token.clone(),
            })
            .collect())
    }
}
