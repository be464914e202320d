/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for the Courier routing core.
///
/// Loaded from TOML files in XDG-compliant directories. Every section falls back to
/// its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Channel naming for in-process transports
    pub routing: RoutingConfig,
    /// Identity of the local application instance
    pub identity: IdentityConfig,
}

/// Channel naming for in-process transports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Name of the root (broadcast) channel
    pub root_channel: String,
    /// Separator between the root name and an application or instance id
    pub channel_separator: String,
}

/// Identity of the local application instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Application id
    pub app_id: String,
    /// Application-instance id; generated at startup when absent
    pub instance_id: Option<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            root_channel: "root".to_string(),
            channel_separator: ":".to_string(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_id: "courier".to_string(),
            instance_id: None,
        }
    }
}

impl RoutingConfig {
    /// Name of the channel scoped below the root channel by `scope`.
    #[must_use]
    pub fn scoped_channel(&self, scope: &str) -> String {
        format!("{}{}{}", self.root_channel, self.channel_separator, scope)
    }
}

impl CourierConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `courier/config.toml` under `$XDG_CONFIG_HOME` (and the platform
    /// fallbacks). Returns the defaults when no file exists, and logs an error and
    /// returns the defaults when the file cannot be read or parsed.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("courier") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(config_str) => match Self::from_toml(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: CourierConfig = CourierConfig::load();
}
