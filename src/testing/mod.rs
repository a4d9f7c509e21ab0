mod fake_probe;
mod recording_launcher;

pub use fake_probe::FakeProbe;
pub use recording_launcher::RecordingLauncher;

use crate::domain::AppConfig;
use crate::domain::config::{CONFIG_TEMPLATE, parse_config_content};

/// Configuration parsed from the shipped template.
pub fn test_config() -> AppConfig {
    parse_config_content(CONFIG_TEMPLATE).unwrap()
}

/// Listing shaped like `-device virtio-net-device,?` output.
pub const NET_DEVICE_LISTING: &str = "\
virtio-net-device options:
  csum=<bool>            - on/off (default: true)
  host_mtu=<uint16>      -  (default: 0)
  mac=<str>              - Ethernet 6-byte MAC Address, example: 52:54:00:12:34:56
  netdev=<str>           - ID of a netdev to use as a backend
";

/// Listing shaped like `-machine virt,?` output.
pub const VIRT_MACHINE_LISTING: &str = "\
virt-9.0-machine options:
  gic-version=<string>   - Set GIC version. Valid values are 2, 3, 4, host and max
  secure=<bool>          - Set on/off to enable/disable the ARM Security Extensions (TrustZone)
  virtualization=<bool>  - Set on/off to enable/disable emulating a guest CPU which implements the ARM Virtualization Extensions
";
