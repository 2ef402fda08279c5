//! Backend config templates: each supported database engine renders its
//! on-disk configuration and launch invocation from a generic [`BackendSpec`].
mod consul;
mod etcd;
mod registry;
mod zookeeper;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TemplateError;

pub use registry::{TemplateRegistry, template_registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Etcd,
    Zookeeper,
    Consul,
}

impl BackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Etcd => "etcd",
            Self::Zookeeper => "zookeeper",
            Self::Consul => "consul",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "etcd" => Ok(Self::Etcd),
            "zookeeper" => Ok(Self::Zookeeper),
            "consul" => Ok(Self::Consul),
            other => Err(format!("unknown backend kind: {:?}", other)),
        }
    }
}

/// One peer of the test group. Ordinals are 1-based and strictly
/// list-position based, so every agent renders the same topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDescriptor {
    pub ordinal: u32,
    pub host: String,
}

impl PeerDescriptor {
    /// Assigns 1-based ordinals to `hosts` in list order.
    #[must_use]
    pub fn from_hosts(hosts: &[String]) -> Vec<Self> {
        hosts
            .iter()
            .enumerate()
            .map(|(index, host)| Self {
                ordinal: index as u32 + 1,
                host: host.clone(),
            })
            .collect()
    }
}

/// Generic tunables a backend template renders from. Immutable once built;
/// the coordinator owns it and hands copies to agents.
#[derive(Debug, Clone)]
pub struct BackendSpec {
    pub kind: BackendKind,
    /// 1-based quorum member id of the agent this spec is for.
    pub ordinal: u32,
    pub binary: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub work_dir: Option<PathBuf>,
    pub client_port: u16,
    pub peer_port: u16,
    pub peers: Vec<PeerDescriptor>,
    pub tick_time_ms: u64,
    pub init_limit: u64,
    pub sync_limit: u64,
    pub snapshot_count: u64,
    pub max_client_connections: u64,
    pub election_timeout_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub cluster_token: String,
}

impl BackendSpec {
    /// The peer entry matching this agent's ordinal.
    pub(crate) fn own_peer(&self) -> Result<&PeerDescriptor, TemplateError> {
        if self.peers.is_empty() {
            return Err(TemplateError::NoPeers { kind: self.kind });
        }
        self.peers
            .iter()
            .find(|peer| peer.ordinal == self.ordinal)
            .ok_or(TemplateError::InvalidOrdinal {
                ordinal: self.ordinal,
                peers: self.peers.len(),
            })
    }
}

/// A file the backend requires on disk before launch, e.g. the zookeeper
/// `myid` membership file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Result of rendering a backend template: pure data, no I/O performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLaunch {
    /// Config file text; empty when the backend is configured by flags only.
    pub config_text: String,
    /// Arguments passed to the backend binary, config path included.
    pub launch_args: Vec<String>,
    /// Working directory the process must be launched from, when the
    /// backend requires one. Always passed explicitly to process creation,
    /// never applied to the ambient process state.
    pub work_dir: Option<PathBuf>,
    pub identity_file: Option<IdentityFile>,
}

/// Renders a backend's config text and launch command from a generic spec.
/// Implementations must be deterministic: same spec, byte-identical output.
pub trait BackendTemplate: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Renders the config and launch plan for `spec`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when required fields are absent, e.g. an
    /// empty peer list for a quorum backend.
    fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError>;
}
