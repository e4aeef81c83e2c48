// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::{ConfigError, ConversionParams, Fragment, LogLevel, build_config};
use mgmt::frr::reload::{ConfigApplier, FrrErr, FrrPaths, FrrReloader};
use mgmt::frr::renderer::render_config;
use nix::sys::signal::Signal;
use pretty_assertions::assert_eq;
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::process::Command;
use tracing_test::traced_test;

const TENANT_A: &str = r#"
name: tenant-a
routers:
  - asn: 65000
    id: 10.0.0.1
    prefixes: ["192.0.2.0/24", "2001:db8:a::/48"]
    neighbors:
      - asn: 65001
        address: 192.168.1.2
        password: s3cret
        toAdvertise:
          allowed:
            mode: all
          prefixesWithCommunity:
            - prefixes: ["192.0.2.0/24"]
              community: "10:100"
        toReceive:
          allowed:
            prefixes:
              - prefix: 10.0.0.0/8
                le: 24
"#;

const TENANT_B: &str = r#"
name: tenant-b
routers:
  - asn: 65000
    prefixes: ["198.51.100.0/24"]
    neighbors:
      - asn: 65001
        address: 192.168.1.2
        password: s3cret
        holdTime: 180
        toAdvertise:
          allowed:
            prefixes: ["198.51.100.0/24"]
          prefixesWithLocalPref:
            - prefixes: ["198.51.100.0/24"]
              localPref: 200
        toReceive:
          allowed:
            mode: all
raw:
  priority: 10
  config: "line vty"
"#;

fn fragments() -> Vec<Fragment> {
    [TENANT_A, TENANT_B]
        .iter()
        .map(|yaml| serde_yaml_ng::from_str(yaml).expect("Bad fragment"))
        .collect()
}

fn params() -> ConversionParams {
    ConversionParams::new("node-1", LogLevel::Info).set_always_block(&["192.168.0.0/16"])
}

#[test]
#[traced_test]
fn test_fragments_to_frr_config() {
    let config = build_config(&fragments(), &params()).expect("Fragments should merge");
    let mut reversed = fragments();
    reversed.reverse();
    let other = build_config(&reversed, &params()).expect("Fragments should merge");
    assert_eq!(config, other);

    let rendered = render_config(&config).expect("Should render");
    assert_eq!(rendered, render_config(&other).expect("Should render"));

    for line in [
        "hostname node-1",
        "router bgp 65000",
        " bgp router-id 10.0.0.1",
        " neighbor 192.168.1.2 remote-as 65001",
        " neighbor 192.168.1.2 password s3cret",
        "  network 192.0.2.0/24",
        "  network 198.51.100.0/24",
        "  network 2001:db8:a::/48",
        "ip prefix-list 192.168.1.2-blocked-ipv4 seq 5 permit 192.168.0.0/16 le 32",
        " set community 10:100 additive",
        " set local-preference 200",
        "line vty",
    ] {
        assert!(
            rendered.lines().any(|l| l == line),
            "Missing line '{line}' in:\n{rendered}"
        );
    }
    /* default hold time is not rendered and accept-all absorbed the receive filters */
    assert!(!rendered.contains("timers"));
    assert!(!rendered.contains("192.168.1.2-inpl-ipv4"));
}

#[test]
fn test_conflicting_fragments() {
    let mut fragments = fragments();
    fragments[1].routers[0].asn = 65099;
    let Err(ConfigError::VrfAsnMismatch { asn1, asn2, .. }) = build_config(&fragments, &params())
    else {
        unreachable!("Merge should fail");
    };
    assert_eq!((asn1, asn2), (65000, 65099));
}

#[test]
fn test_apply_without_reloader() {
    let dir = tempfile::tempdir().expect("No tempdir");
    let paths = FrrPaths::in_dir(dir.path());
    let config = build_config(&fragments(), &params()).expect("Fragments should merge");
    let mut reloader = FrrReloader::new(paths.clone());

    let result = reloader.apply(&config);
    assert!(matches!(result, Err(FrrErr::PidFile { .. })));

    /* the file is written before signalling */
    let written = fs::read_to_string(&paths.config_file).expect("Config not written");
    assert_eq!(written, render_config(&config).expect("Should render"));
}

#[test]
fn test_apply_signals_reloader() {
    let dir = tempfile::tempdir().expect("No tempdir");
    let paths = FrrPaths::in_dir(dir.path());
    let mut child = Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("Failed to spawn reloader stand-in");
    fs::write(&paths.pid_file, format!("{}\n", child.id())).expect("Write failed");

    let config = build_config(&fragments(), &params()).expect("Fragments should merge");
    let mut reloader = FrrReloader::new(paths);
    reloader.apply(&config).expect("Apply should succeed");

    let status = child.wait().expect("Wait failed");
    assert_eq!(status.signal(), Some(Signal::SIGHUP as i32));
}
