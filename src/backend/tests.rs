use std::path::PathBuf;

use super::{
    BackendKind, BackendSpec, PeerDescriptor, RenderedLaunch, TemplateRegistry, template_registry,
};
use crate::error::TemplateError;

fn peers(hosts: &[&str]) -> Vec<PeerDescriptor> {
    let hosts: Vec<String> = hosts.iter().map(|host| (*host).to_owned()).collect();
    PeerDescriptor::from_hosts(&hosts)
}

fn spec(kind: BackendKind, ordinal: u32, hosts: &[&str]) -> BackendSpec {
    BackendSpec {
        kind,
        ordinal,
        binary: PathBuf::from("/usr/bin/true"),
        data_dir: PathBuf::from("/tmp/dbbench/data"),
        config_path: PathBuf::from("/tmp/dbbench/backend.conf"),
        work_dir: Some(PathBuf::from("/tmp/dbbench/work")),
        client_port: 2181,
        peer_port: 2380,
        peers: peers(hosts),
        tick_time_ms: 2000,
        init_limit: 5,
        sync_limit: 5,
        snapshot_count: 100_000,
        max_client_connections: 5000,
        election_timeout_ms: 1000,
        heartbeat_interval_ms: 100,
        cluster_token: "dbbench-cluster".to_owned(),
    }
}

fn render(spec: &BackendSpec) -> Result<RenderedLaunch, TemplateError> {
    template_registry().render(spec)
}

#[test]
fn ordinals_follow_list_position() {
    let peers = peers(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    assert_eq!(peers[1].ordinal, 2);
    assert_eq!(peers[1].host, "10.0.0.2");
    assert_eq!(peers[2].ordinal, 3);
}

#[test]
fn zookeeper_config_embeds_every_peer_by_ordinal() -> Result<(), TemplateError> {
    let spec = spec(
        BackendKind::Zookeeper,
        2,
        &["10.0.0.1", "10.0.0.2", "10.0.0.3"],
    );
    let rendered = render(&spec)?;
    assert!(rendered.config_text.contains("tickTime=2000\n"));
    assert!(rendered.config_text.contains("clientPort=2181\n"));
    assert!(rendered.config_text.contains("server.1=10.0.0.1:2888:3888\n"));
    assert!(rendered.config_text.contains("server.2=10.0.0.2:2888:3888\n"));
    assert!(rendered.config_text.contains("server.3=10.0.0.3:2888:3888\n"));
    Ok(())
}

#[test]
fn zookeeper_identity_file_carries_member_ordinal() -> Result<(), TemplateError> {
    let spec = spec(BackendKind::Zookeeper, 2, &["a", "b", "c"]);
    let rendered = render(&spec)?;
    let identity = rendered.identity_file.ok_or(TemplateError::MissingField {
        kind: BackendKind::Zookeeper,
        field: "identity_file",
    })?;
    assert_eq!(identity.contents, "2");
    assert!(identity.path.ends_with("myid"));
    Ok(())
}

#[test]
fn zookeeper_requires_work_dir() {
    let mut spec = spec(BackendKind::Zookeeper, 1, &["a"]);
    spec.work_dir = None;
    let result = render(&spec);
    assert!(matches!(
        result,
        Err(TemplateError::MissingField {
            field: "work_dir",
            ..
        })
    ));
}

#[test]
fn rendering_is_deterministic() -> Result<(), TemplateError> {
    let spec = spec(BackendKind::Zookeeper, 1, &["a", "b", "c"]);
    let first = render(&spec)?;
    let second = render(&spec)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn empty_peer_list_is_a_template_error() {
    let spec = spec(BackendKind::Etcd, 1, &[]);
    assert!(matches!(render(&spec), Err(TemplateError::NoPeers { .. })));
}

#[test]
fn ordinal_outside_peer_list_is_rejected() {
    let spec = spec(BackendKind::Etcd, 4, &["a", "b", "c"]);
    assert!(matches!(
        render(&spec),
        Err(TemplateError::InvalidOrdinal {
            ordinal: 4,
            peers: 3
        })
    ));
}

#[test]
fn etcd_renders_initial_cluster_in_list_order() -> Result<(), TemplateError> {
    let spec = spec(BackendKind::Etcd, 2, &["10.0.0.1", "10.0.0.2"]);
    let rendered = render(&spec)?;
    assert!(rendered.config_text.is_empty());
    assert!(rendered.identity_file.is_none());
    let cluster_flag = rendered
        .launch_args
        .iter()
        .position(|arg| arg == "--initial-cluster")
        .and_then(|index| rendered.launch_args.get(index + 1))
        .cloned();
    assert_eq!(
        cluster_flag.as_deref(),
        Some("etcd1=http://10.0.0.1:2380,etcd2=http://10.0.0.2:2380")
    );
    assert!(rendered.launch_args.contains(&"--name".to_owned()));
    assert!(rendered.launch_args.contains(&"etcd2".to_owned()));
    Ok(())
}

#[test]
fn etcd_requires_cluster_token() {
    let mut spec = spec(BackendKind::Etcd, 1, &["a"]);
    spec.cluster_token = String::new();
    assert!(matches!(
        render(&spec),
        Err(TemplateError::MissingField {
            field: "cluster_token",
            ..
        })
    ));
}

#[test]
fn consul_first_member_bootstraps_and_rest_join() -> Result<(), TemplateError> {
    let first = render(&spec(BackendKind::Consul, 1, &["a", "b", "c"]))?;
    assert!(first.launch_args.contains(&"-bootstrap-expect".to_owned()));
    assert!(!first.launch_args.contains(&"-retry-join".to_owned()));

    let second = render(&spec(BackendKind::Consul, 2, &["a", "b", "c"]))?;
    assert!(second.launch_args.contains(&"-retry-join".to_owned()));
    assert!(second.launch_args.contains(&"a:2380".to_owned()));
    Ok(())
}

#[test]
fn unregistered_backend_fails_with_unknown_backend() {
    let registry = TemplateRegistry::empty();
    let spec = spec(BackendKind::Etcd, 1, &["a"]);
    assert!(matches!(
        registry.render(&spec),
        Err(TemplateError::UnknownBackend { .. })
    ));
}

#[test]
fn duplicate_template_registration_is_rejected() {
    let mut registry = TemplateRegistry::empty();
    assert!(registry.register(super::etcd::EtcdTemplate).is_ok());
    assert!(matches!(
        registry.register(super::etcd::EtcdTemplate),
        Err(TemplateError::DuplicateTemplate {
            kind: BackendKind::Etcd
        })
    ));
}

#[test]
fn builtin_registry_covers_all_kinds() {
    let registry = template_registry();
    assert_eq!(registry.registered_kinds_csv(), "consul, etcd, zookeeper");
}
