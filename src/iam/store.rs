// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{IamError, User, UsersData, YamlUsersData};
use std::path::PathBuf;
use std::sync::RwLock;

pub trait UserStore: Send + Sync {
    fn load(&self) -> Result<UsersData, IamError>;
}

pub struct FileUserStore {
    users_file: PathBuf,
}

impl FileUserStore {
    pub fn new(users_file: PathBuf) -> Result<Self, IamError> {
        if users_file.as_os_str().is_empty() {
            return Err(IamError::ConfigurationError(
                "Users file path is empty".to_string(),
            ));
        }

        Ok(Self { users_file })
    }

    fn parse_users(content: &str) -> Result<UsersData, IamError> {
        let yaml_users: YamlUsersData = serde_yaml::from_str(content)
            .map_err(|e| IamError::ParseError(format!("Failed to parse users file: {}", e)))?;

        let mut users_data = UsersData::new();
        for (email, yaml_user) in yaml_users {
            users_data.insert(email.clone(), yaml_user.into_user(email));
        }

        Ok(users_data)
    }
}

impl UserStore for FileUserStore {
    fn load(&self) -> Result<UsersData, IamError> {
        let content = std::fs::read_to_string(&self.users_file)
            .map_err(|e| IamError::FileError(format!("Failed to read users file: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(UsersData::new());
        }
        Self::parse_users(&content)
    }
}

/// In-memory view over the user registry; the identity middleware resolves
/// forwarded principals against it on every request.
pub struct UserDirectory {
    users: RwLock<UsersData>,
}

impl UserDirectory {
    pub fn load(store: &dyn UserStore) -> Result<Self, IamError> {
        let users = store.load()?;
        Ok(Self {
            users: RwLock::new(users),
        })
    }

    pub fn from_users(users: Vec<User>) -> Self {
        let data = users
            .into_iter()
            .map(|user| (user.email.clone(), user))
            .collect();
        Self {
            users: RwLock::new(data),
        }
    }

    pub fn lookup(&self, email: &str) -> Option<User> {
        match self.users.read() {
            Ok(guard) => guard.get(email).cloned(),
            Err(poisoned) => {
                log::error!("User directory lock poisoned on read; recovering");
                poisoned.into_inner().get(email).cloned()
            }
        }
    }
}
