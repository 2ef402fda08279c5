use super::{BackendKind, BackendSpec, BackendTemplate, RenderedLaunch};
use crate::error::TemplateError;

pub struct ConsulTemplate;

impl BackendTemplate for ConsulTemplate {
    fn kind(&self) -> BackendKind {
        BackendKind::Consul
    }

    fn render(&self, spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
        let own = spec.own_peer()?;

        let mut launch_args = vec![
            "agent".to_owned(),
            "-server".to_owned(),
            "-data-dir".to_owned(),
            spec.data_dir.display().to_string(),
            "-node".to_owned(),
            format!("consul{}", spec.ordinal),
            "-bind".to_owned(),
            own.host.clone(),
            "-client".to_owned(),
            "0.0.0.0".to_owned(),
        ];

        // First member bootstraps the quorum, the rest join it.
        if spec.ordinal == 1 {
            launch_args.push("-bootstrap-expect".to_owned());
            launch_args.push(spec.peers.len().to_string());
        } else {
            for peer in spec.peers.iter().filter(|peer| peer.ordinal == 1) {
                launch_args.push("-retry-join".to_owned());
                launch_args.push(format!("{}:{}", peer.host, spec.peer_port));
            }
        }

        Ok(RenderedLaunch {
            config_text: String::new(),
            launch_args,
            work_dir: None,
            identity_file: None,
        })
    }
}
