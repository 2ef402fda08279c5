use std::fmt::Write as _;

use super::{BackendKind, BackendSpec, BackendTemplate, IdentityFile, RenderedLaunch};
use crate::error::TemplateError;

// Quorum peer ports are fixed by zookeeper convention.
const QUORUM_PORT: u16 = 2888;
const ELECTION_PORT: u16 = 3888;

// Valid for zookeeper r3.4.9; update alongside the deployed release.
const CLASSPATH: &str = "zookeeper-3.4.9.jar:lib/slf4j-api-1.6.1.jar:lib/slf4j-log4j12-1.6.1.jar:lib/log4j-1.2.16.jar:conf";
const QUORUM_MAIN: &str = "org.apache.zookeeper.server.quorum.QuorumPeerMain";

pub struct ZookeeperTemplate;

impl BackendTemplate for ZookeeperTemplate {
    fn kind(&self) -> BackendKind {
        BackendKind::Zookeeper
    }

    fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
        spec.own_peer()?;
        let work_dir = spec
            .work_dir
            .clone()
            .ok_or(TemplateError::MissingField {
                kind: self.kind(),
                field: "work_dir",
            })?;

        let mut config = String::new();
        let render_err = |source| TemplateError::Render {
            kind: BackendKind::Zookeeper,
            source,
        };
        writeln!(config, "tickTime={}", spec.tick_time_ms).map_err(render_err)?;
        writeln!(config, "dataDir={}", spec.data_dir.display()).map_err(render_err)?;
        writeln!(config, "clientPort={}", spec.client_port).map_err(render_err)?;
        writeln!(config, "initLimit={}", spec.init_limit).map_err(render_err)?;
        writeln!(config, "syncLimit={}", spec.sync_limit).map_err(render_err)?;
        writeln!(config, "maxClientCnxns={}", spec.max_client_connections).map_err(render_err)?;
        writeln!(config, "snapCount={}", spec.snapshot_count).map_err(render_err)?;
        for peer in &spec.peers {
            writeln!(
                config,
                "server.{}={}:{}:{}",
                peer.ordinal, peer.host, QUORUM_PORT, ELECTION_PORT
            )
            .map_err(render_err)?;
        }

        let launch_args = vec![
            "-cp".to_owned(),
            CLASSPATH.to_owned(),
            QUORUM_MAIN.to_owned(),
            spec.config_path.display().to_string(),
        ];

        Ok(RenderedLaunch {
            config_text: config,
            launch_args,
            work_dir: Some(work_dir),
            identity_file: Some(IdentityFile {
                path: spec.data_dir.join("myid"),
                contents: format!("{}", spec.ordinal),
            }),
        })
    }
}
