// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type EntityId = u64;

pub const MAX_NAME_CHARS: usize = 255;

/// Named collection of environment properties applied together to a test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    pub is_active: bool,
    pub manager: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
}

/// A configuration axis such as "OS" or "Browser".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    pub is_active: bool,
}

/// One permissible value of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRecord {
    pub property_id: EntityId,
    pub value: String,
    pub is_active: bool,
}

/// The whole environment dataset as persisted to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvDataset {
    #[serde(default)]
    pub next_id: EntityId,
    #[serde(default)]
    pub groups: BTreeMap<EntityId, GroupRecord>,
    #[serde(default)]
    pub properties: BTreeMap<EntityId, PropertyRecord>,
    #[serde(default)]
    pub values: BTreeMap<EntityId, ValueRecord>,
    #[serde(default)]
    pub group_properties: BTreeSet<(EntityId, EntityId)>,
}

impl EnvDataset {
    pub fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub fn validate_name(label: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new(format!("{} is required", label)));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::new(format!(
            "{} must be at most {} characters",
            label, MAX_NAME_CHARS
        )));
    }
    Ok(())
}
