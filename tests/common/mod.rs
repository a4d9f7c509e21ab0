//! Shared testing utilities for vmlaunch CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Shell script standing in for the emulator's `<flag> <token>,?` introspection.
pub const FAKE_EMULATOR: &str = r#"#!/bin/sh
case "$2" in
  "virt,?")
    cat <<'LISTING'
virt-9.0-machine options:
  gic-version=<string>   - Set GIC version. Valid values are 2, 3, 4, host and max
  secure=<bool>          - Set on/off to enable/disable the ARM Security Extensions (TrustZone)
LISTING
    ;;
  "virtio-net-device,?")
    cat <<'LISTING'
virtio-net-device options:
  csum=<bool>            - on/off (default: true)
  mac=<str>              - Ethernet 6-byte MAC Address, example: 52:54:00:12:34:56
  netdev=<str>           - ID of a netdev to use as a backend
this line is not a parameter
LISTING
    ;;
  "stalled-device,?")
    exec sleep 30
    ;;
  *)
    echo "Device '${2%,?}' not found" >&2
    exit 1
    ;;
esac
"#;

/// Testing harness providing an isolated working directory for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");

        Self { root, work_dir }
    }

    /// Path to the working directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for invoking the compiled `vmlaunch` binary in the work directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("vmlaunch").expect("Failed to locate vmlaunch binary");
        cmd.current_dir(&self.work_dir).env_remove("VMLAUNCH_CONFIG").env("VMLAUNCH_LOG", "off");
        cmd
    }

    /// Install the fake emulator script and return its path.
    #[cfg(unix)]
    pub fn install_fake_emulator(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root.path().join("fake-qemu");
        fs::write(&path, FAKE_EMULATOR).expect("Failed to write fake emulator");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark fake emulator executable");
        path
    }

    /// Write `vmlaunch.toml` into the work directory, pointing at `binary`.
    pub fn write_config(&self, binary: &Path, timeout_secs: u64) -> PathBuf {
        let content = format!(
            r#"[emulator]
binary = "{}"
probe_timeout_secs = {}

[machine]
query_flag = "-machine"
header_pattern = '^\S+ options:$'
info_delimiter = " - "
type_strip = "<>"

[device]
query_flag = "-device"
header_pattern = '^\S+ options:$'
info_delimiter = " - "
type_strip = "<>"

[defaults]
memory_mib = 256
"#,
            binary.display(),
            timeout_secs
        );
        let path = self.work_dir.join("vmlaunch.toml");
        fs::write(&path, content).expect("Failed to write config");
        path
    }

    /// Write a session plan into the work directory.
    pub fn write_plan(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        fs::write(&path, content).expect("Failed to write plan");
        path
    }
}

/// Plan answering every step.
pub const FULL_PLAN: &str = r#"
name = "sensor-node"
description = "edge gateway"
machine = "virt"
smp = 2
memory_steps = 1
image = "/images/rootfs.ext4"
interface = "tap0"
ip_address = "192.168.7.2"
subnet_mask = "255.255.255.0"
kernel = "/boot/Image"
application = "/opt/app/sensor"

[machine_settings]
gic-version = 3

[[devices]]
token = "virtio-net-device"
extra = ["id=nic0"]

[devices.settings]
netdev = "net0"

[[devices]]
token = "pl011"
"#;
