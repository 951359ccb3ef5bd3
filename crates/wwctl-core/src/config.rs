use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::{Path, PathBuf};

use wwctl_util::errors::WwError;

/// Netmask assumed when an address is known but no netmask was configured.
pub const DEFAULT_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Host offsets from the network address for the default DHCP range.
const DHCP_RANGE_START_OFFSET: u32 = 50;
const DHCP_RANGE_END_OFFSET: u32 = 99;

/// Configuration state that can be loaded from a file or filled with defaults.
///
/// The resolver only talks to the configuration through this trait, so tests
/// can observe which of the two paths it took.
pub trait ConfigStore {
    /// `true` once the state has been populated from a file.
    fn is_initialized(&self) -> bool;

    /// Replace the state with the contents of `path` and mark it initialized.
    fn read_conf(&mut self, path: &Path) -> miette::Result<()>;

    /// Fill every still-missing field with a value computed from the host.
    /// Calling it repeatedly leaves the state unchanged.
    fn set_dynamic_defaults(&mut self) -> miette::Result<()>;
}

/// The warewulf configuration, normally read from `/etc/warewulf/warewulf.conf`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WarewulfConf {
    #[serde(skip)]
    initialized: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipaddr: Option<Ipv4Addr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<Ipv4Addr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Ipv4Addr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipaddr6: Option<String>,

    #[serde(default)]
    pub warewulf: WarewulfSection,

    #[serde(default)]
    pub dhcp: DhcpConfig,

    #[serde(default)]
    pub tftp: TftpConfig,

    #[serde(default)]
    pub nfs: NfsConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

/// Daemon settings from `[warewulf]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WarewulfSection {
    pub port: u16,
    pub secure: bool,
    pub update_interval: u32,
    pub autobuild_overlays: bool,
    pub host_overlay: bool,
    pub syslog: bool,
}

impl Default for WarewulfSection {
    fn default() -> Self {
        Self {
            port: 9873,
            secure: true,
            update_interval: 60,
            autobuild_overlays: true,
            host_overlay: true,
            syslog: false,
        }
    }
}

/// DHCP service settings from `[dhcp]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DhcpConfig {
    pub enabled: bool,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_start: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_end: Option<Ipv4Addr>,
    pub systemd_name: String,
}

impl Default for DhcpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            template: "default".to_string(),
            range_start: None,
            range_end: None,
            systemd_name: "dhcpd".to_string(),
        }
    }
}

/// TFTP service settings from `[tftp]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TftpConfig {
    pub enabled: bool,
    pub tftproot: PathBuf,
    pub systemd_name: String,
}

impl Default for TftpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tftproot: PathBuf::from("/var/lib/tftpboot"),
            systemd_name: "tftp".to_string(),
        }
    }
}

/// NFS service settings from `[nfs]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NfsConfig {
    pub enabled: bool,
    pub export_paths: Vec<String>,
    pub systemd_name: String,
}

impl Default for NfsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            export_paths: vec!["/home".to_string(), "/opt".to_string()],
            systemd_name: "nfs-server".to_string(),
        }
    }
}

/// Filesystem layout from `[paths]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub sysconfdir: PathBuf,
    pub localstatedir: PathBuf,
    pub wwoverlaydir: PathBuf,
    pub wwchrootdir: PathBuf,
    pub wwprovisiondir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sysconfdir: PathBuf::from("/etc"),
            localstatedir: PathBuf::from("/var/lib"),
            wwoverlaydir: PathBuf::from("/var/lib/warewulf/overlays"),
            wwchrootdir: PathBuf::from("/var/lib/warewulf/chroots"),
            wwprovisiondir: PathBuf::from("/var/lib/warewulf/provision"),
        }
    }
}

impl WarewulfConf {
    /// An empty, uninitialized configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> miette::Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            WwError::Generic {
                message: format!("Failed to serialize configuration: {e}"),
            }
            .into()
        })
    }

    /// Like [`ConfigStore::set_dynamic_defaults`], but with the host address
    /// supplied by `detect` instead of detected from the routing table.
    pub fn set_dynamic_defaults_with(&mut self, detect: impl FnOnce() -> Option<Ipv4Addr>) {
        if self.ipaddr.is_none() {
            self.ipaddr = detect();
            match self.ipaddr {
                Some(ip) => tracing::trace!("Using detected host address {ip}"),
                None => tracing::trace!("No host address configured or detected"),
            }
        }

        if self.ipaddr.is_some() && self.netmask.is_none() {
            self.netmask = Some(DEFAULT_NETMASK);
        }

        if self.network.is_none() {
            if let (Some(ip), Some(mask)) = (self.ipaddr, self.netmask) {
                self.network = Some(network_address(ip, mask));
            }
        }

        if let (Some(network), Some(mask)) = (self.network, self.netmask) {
            match default_dhcp_range(network, mask) {
                Some((start, end)) => {
                    if self.dhcp.range_start.is_none() {
                        self.dhcp.range_start = Some(start);
                    }
                    if self.dhcp.range_end.is_none() {
                        self.dhcp.range_end = Some(end);
                    }
                }
                None => {
                    tracing::debug!("Subnet {network}/{mask} is too small for a default DHCP range")
                }
            }
        }
    }
}

impl ConfigStore for WarewulfConf {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn read_conf(&mut self, path: &Path) -> miette::Result<()> {
        let config_error = |message: String| WwError::Config {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let mut conf: WarewulfConf =
            toml::from_str(&content).map_err(|e| config_error(e.to_string()))?;
        conf.set_dynamic_defaults()?;
        conf.initialized = true;
        *self = conf;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(())
    }

    fn set_dynamic_defaults(&mut self) -> miette::Result<()> {
        self.set_dynamic_defaults_with(primary_ipv4);
        Ok(())
    }
}

/// `ip` with the host bits cleared.
pub fn network_address(ip: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & u32::from(netmask))
}

/// Default DHCP range inside the subnet. The end is clamped below the
/// broadcast address; `None` when the start offset itself does not fit.
fn default_dhcp_range(network: Ipv4Addr, netmask: Ipv4Addr) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let base = u32::from(network);
    let broadcast = base | !u32::from(netmask);
    let start = base.checked_add(DHCP_RANGE_START_OFFSET)?;
    if start >= broadcast {
        return None;
    }
    let end = base.saturating_add(DHCP_RANGE_END_OFFSET).min(broadcast - 1);
    Some((Ipv4Addr::from(start), Ipv4Addr::from(end)))
}

/// Source address the kernel would use for outbound traffic. Connecting a UDP
/// socket sends no packets.
fn primary_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}
