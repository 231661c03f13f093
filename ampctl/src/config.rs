use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    device: DeviceConfig,
}

#[derive(Deserialize, Default)]
struct DeviceConfig {
    host: Option<String>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
}

pub struct Config {
    device: DeviceConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge_device(&mut base.device, user.device),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config { device: base.device }
    }

    /// `host:port` of the amp's access point.
    pub fn device_addr(&self) -> String {
        let host = self.device.host.as_deref().unwrap_or("192.168.4.1");
        let port = self.device.port.unwrap_or(80);
        format!("{}:{}", host, port)
    }

    /// Connect/read/write timeout (clamped to 1..120 seconds).
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.device.timeout_secs.unwrap_or(3).clamp(1, 120))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ampctl").join("config.toml"))
}

fn merge_device(base: &mut DeviceConfig, user: DeviceConfig) {
    if user.host.is_some() {
        base.host = user.host;
    }
    if user.port.is_some() {
        base.port = user.port;
    }
    if user.timeout_secs.is_some() {
        base.timeout_secs = user.timeout_secs;
    }
}
