// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::runtime_paths::RuntimePaths;
use std::fs;
use std::path::Path;

pub struct BootstrapResult {
    pub config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
    pub created_users: bool,
}

/// Prepare the runtime root: seed missing config/users files, then load and
/// validate the configuration and directory layout.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, ConfigError> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|err| {
            ConfigError::ValidationError(format!(
                "Failed to create runtime root '{}': {}",
                root.display(),
                err
            ))
        })?;
    }

    let config_path = root.join("config.yaml");
    let created_config = if config_path.exists() {
        false
    } else {
        let content = serde_yaml::to_string(&Config::default()).map_err(|err| {
            ConfigError::LoadError(format!("Failed to serialize default config: {}", err))
        })?;
        fs::write(&config_path, content).map_err(|err| {
            ConfigError::LoadError(format!(
                "Failed to write '{}': {}",
                config_path.display(),
                err
            ))
        })?;
        log::info!("Created default configuration at {}", config_path.display());
        true
    };

    let users_path = root.join("users.yaml");
    let created_users = if users_path.exists() {
        false
    } else {
        fs::write(&users_path, "{}\n").map_err(|err| {
            ConfigError::LoadError(format!(
                "Failed to write '{}': {}",
                users_path.display(),
                err
            ))
        })?;
        log::info!("Created empty user registry at {}", users_path.display());
        true
    };

    let config = Config::load_and_validate(root)?;
    let runtime_paths = RuntimePaths::from_root(root)?;

    Ok(BootstrapResult {
        config,
        runtime_paths,
        created_config,
        created_users,
    })
}
