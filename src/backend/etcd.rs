use super::{BackendKind, BackendSpec, BackendTemplate, RenderedLaunch};
use crate::error::TemplateError;

pub struct EtcdTemplate;

fn member_name(ordinal: u32) -> String {
    format!("etcd{}", ordinal)
}

impl BackendTemplate for EtcdTemplate {
    fn kind(&self) -> BackendKind {
        BackendKind::Etcd
    }

    fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
        let own = spec.own_peer()?;
        if spec.cluster_token.is_empty() {
            return Err(TemplateError::MissingField {
                kind: self.kind(),
                field: "cluster_token",
            });
        }

        let initial_cluster = spec
            .peers
            .iter()
            .map(|peer| {
                format!(
                    "{}=http://{}:{}",
                    member_name(peer.ordinal),
                    peer.host,
                    spec.peer_port
                )
            })
            .collect::<Vec<String>>()
            .join(",");

        let client_url = format!("http://{}:{}", own.host, spec.client_port);
        let peer_url = format!("http://{}:{}", own.host, spec.peer_port);

        let launch_args = vec![
            "--name".to_owned(),
            member_name(spec.ordinal),
            "--data-dir".to_owned(),
            spec.data_dir.display().to_string(),
            "--listen-client-urls".to_owned(),
            format!("http://0.0.0.0:{}", spec.client_port),
            "--advertise-client-urls".to_owned(),
            client_url,
            "--listen-peer-urls".to_owned(),
            peer_url.clone(),
            "--initial-advertise-peer-urls".to_owned(),
            peer_url,
            "--initial-cluster-token".to_owned(),
            spec.cluster_token.clone(),
            "--initial-cluster".to_owned(),
            initial_cluster,
            "--initial-cluster-state".to_owned(),
            "new".to_owned(),
            "--election-timeout".to_owned(),
            spec.election_timeout_ms.to_string(),
            "--heartbeat-interval".to_owned(),
            spec.heartbeat_interval_ms.to_string(),
            "--snapshot-count".to_owned(),
            spec.snapshot_count.to_string(),
        ];

        // etcd is configured entirely by flags; there is no config file.
        Ok(RenderedLaunch {
            config_text: String::new(),
            launch_args,
            work_dir: None,
            identity_file: None,
        })
    }
}
