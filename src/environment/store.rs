// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{EntityId, EnvDataset, GroupRecord, PropertyRecord, ValueRecord};
use crate::yaml_store;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

const ENV_FILE_NAME: &str = "environments.yaml";

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Duplicate,
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::Duplicate => write!(f, "Duplicate record"),
            StoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Relational store for environment groups, properties, values, and the
/// group-property link set. State lives in memory behind a lock and every
/// mutation is written through to the YAML file before it becomes visible.
pub struct EnvStore {
    env_file: PathBuf,
    data: RwLock<EnvDataset>,
}

impl EnvStore {
    pub fn new(state_sys_dir: PathBuf) -> Result<Self, StoreError> {
        let env_file = state_sys_dir.join(ENV_FILE_NAME);
        let data: Option<EnvDataset> = yaml_store::read_yaml_file(&env_file, "environments")
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        Ok(Self {
            env_file,
            data: RwLock::new(data.unwrap_or_default()),
        })
    }

    pub fn snapshot(&self) -> Result<EnvDataset, StoreError> {
        self.data
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Storage("Environment store lock poisoned".to_string()))
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut EnvDataset) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Storage("Environment store lock poisoned".to_string()))?;
        let mut working = guard.clone();
        let output = apply(&mut working)?;
        yaml_store::write_yaml_file(&self.env_file, "environments", &working)
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        *guard = working;
        Ok(output)
    }

    // ---- groups ----

    /// Default listing order: inactive groups first, then by id.
    pub fn list_groups_ordered(&self) -> Result<Vec<(EntityId, GroupRecord)>, StoreError> {
        let data = self.snapshot()?;
        let mut groups: Vec<(EntityId, GroupRecord)> = data.groups.into_iter().collect();
        groups.sort_by_key(|(id, group)| (group.is_active, *id));
        Ok(groups)
    }

    /// Case-insensitive substring search on the group name.
    pub fn search_groups(&self, needle: &str) -> Result<Vec<(EntityId, GroupRecord)>, StoreError> {
        let needle = needle.to_lowercase();
        let data = self.snapshot()?;
        Ok(data
            .groups
            .into_iter()
            .filter(|(_, group)| group.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn get_group(&self, id: EntityId) -> Result<GroupRecord, StoreError> {
        let data = self.snapshot()?;
        data.groups.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    pub fn find_group_by_name(&self, name: &str) -> Result<Option<EntityId>, StoreError> {
        let data = self.snapshot()?;
        Ok(data
            .groups
            .iter()
            .find(|(_, group)| group.name == name)
            .map(|(id, _)| *id))
    }

    pub fn create_group(&self, name: &str, manager: &str) -> Result<EntityId, StoreError> {
        self.mutate(|data| {
            if data.groups.values().any(|group| group.name == name) {
                return Err(StoreError::Duplicate);
            }
            let id = data.allocate_id();
            data.groups.insert(
                id,
                GroupRecord {
                    name: name.to_string(),
                    is_active: true,
                    manager: manager.to_string(),
                    modified_by: None,
                },
            );
            Ok(id)
        })
    }

    /// Removes the group and its property links.
    pub fn delete_group(&self, id: EntityId) -> Result<(), StoreError> {
        self.mutate(|data| {
            if data.groups.remove(&id).is_none() {
                return Err(StoreError::NotFound);
            }
            data.group_properties
                .retain(|(group_id, _)| *group_id != id);
            Ok(())
        })
    }

    pub fn set_group_active(&self, id: EntityId, active: bool) -> Result<GroupRecord, StoreError> {
        self.mutate(|data| {
            let group = data.groups.get_mut(&id).ok_or(StoreError::NotFound)?;
            group.is_active = active;
            Ok(group.clone())
        })
    }

    pub fn update_group(&self, id: EntityId, record: GroupRecord) -> Result<(), StoreError> {
        self.mutate(|data| {
            if !data.groups.contains_key(&id) {
                return Err(StoreError::NotFound);
            }
            if data
                .groups
                .iter()
                .any(|(other_id, other)| *other_id != id && other.name == record.name)
            {
                return Err(StoreError::Duplicate);
            }
            data.groups.insert(id, record);
            Ok(())
        })
    }

    // ---- group-property links ----

    /// Drops every link for the group and recreates one per given property
    /// id. Ids that do not resolve to a property are skipped. Returns the
    /// names of the properties linked afterwards.
    pub fn replace_group_properties(
        &self,
        group_id: EntityId,
        property_ids: &[EntityId],
    ) -> Result<Vec<String>, StoreError> {
        self.mutate(|data| {
            if !data.groups.contains_key(&group_id) {
                return Err(StoreError::NotFound);
            }
            data.group_properties
                .retain(|(linked_group, _)| *linked_group != group_id);
            for property_id in property_ids {
                if data.properties.contains_key(property_id) {
                    data.group_properties.insert((group_id, *property_id));
                } else {
                    log::debug!(
                        "Skipping unknown property id {} while relinking group {}",
                        property_id,
                        group_id
                    );
                }
            }
            let mut names: Vec<String> = data
                .group_properties
                .iter()
                .filter(|(linked_group, _)| *linked_group == group_id)
                .filter_map(|(_, property_id)| {
                    data.properties
                        .get(property_id)
                        .map(|property| property.name.clone())
                })
                .collect();
            names.sort();
            Ok(names)
        })
    }

    pub fn linked_property_ids(&self, group_id: EntityId) -> Result<Vec<EntityId>, StoreError> {
        let data = self.snapshot()?;
        Ok(data
            .group_properties
            .iter()
            .filter(|(linked_group, _)| *linked_group == group_id)
            .map(|(_, property_id)| *property_id)
            .collect())
    }

    /// Property names per group for a set of groups, sorted by name.
    pub fn property_names_by_group(
        &self,
        group_ids: &[EntityId],
    ) -> Result<BTreeMap<EntityId, Vec<String>>, StoreError> {
        let data = self.snapshot()?;
        let mut grouped: BTreeMap<EntityId, Vec<String>> = BTreeMap::new();
        for (group_id, property_id) in &data.group_properties {
            if !group_ids.contains(group_id) {
                continue;
            }
            if let Some(property) = data.properties.get(property_id) {
                grouped
                    .entry(*group_id)
                    .or_default()
                    .push(property.name.clone());
            }
        }
        for names in grouped.values_mut() {
            names.sort();
        }
        Ok(grouped)
    }

    // ---- properties ----

    /// Property listing order: active properties first, then by id.
    pub fn list_properties_ordered(&self) -> Result<Vec<(EntityId, PropertyRecord)>, StoreError> {
        let data = self.snapshot()?;
        let mut properties: Vec<(EntityId, PropertyRecord)> =
            data.properties.into_iter().collect();
        properties.sort_by_key(|(id, property)| (!property.is_active, *id));
        Ok(properties)
    }

    pub fn active_properties(&self) -> Result<Vec<(EntityId, PropertyRecord)>, StoreError> {
        let data = self.snapshot()?;
        Ok(data
            .properties
            .into_iter()
            .filter(|(_, property)| property.is_active)
            .collect())
    }

    pub fn get_property(&self, id: EntityId) -> Result<PropertyRecord, StoreError> {
        let data = self.snapshot()?;
        data.properties
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn create_property(&self, name: &str) -> Result<EntityId, StoreError> {
        self.mutate(|data| {
            if data.properties.values().any(|property| property.name == name) {
                return Err(StoreError::Duplicate);
            }
            let id = data.allocate_id();
            data.properties.insert(
                id,
                PropertyRecord {
                    name: name.to_string(),
                    is_active: true,
                },
            );
            Ok(id)
        })
    }

    pub fn rename_property(&self, id: EntityId, name: &str) -> Result<(), StoreError> {
        self.mutate(|data| {
            if data
                .properties
                .iter()
                .any(|(other_id, other)| *other_id != id && other.name == name)
            {
                return Err(StoreError::Duplicate);
            }
            let property = data.properties.get_mut(&id).ok_or(StoreError::NotFound)?;
            property.name = name.to_string();
            Ok(())
        })
    }

    /// Deletes the matching property rows, cascading their group links and
    /// value rows. Unknown ids are skipped. Returns id and name of every
    /// removed property.
    pub fn delete_properties(
        &self,
        ids: &[EntityId],
    ) -> Result<Vec<(EntityId, String)>, StoreError> {
        self.mutate(|data| {
            let mut removed = Vec::new();
            for id in ids {
                if let Some(property) = data.properties.remove(id) {
                    removed.push((*id, property.name));
                    data.group_properties
                        .retain(|(_, property_id)| property_id != id);
                    data.values.retain(|_, value| value.property_id != *id);
                }
            }
            Ok(removed)
        })
    }

    /// Toggles the active flag on every matching property; unknown ids are
    /// skipped. Returns id and name of every toggled property.
    pub fn set_properties_active(
        &self,
        ids: &[EntityId],
        active: bool,
    ) -> Result<Vec<(EntityId, String)>, StoreError> {
        self.mutate(|data| {
            let mut toggled = Vec::new();
            for id in ids {
                if let Some(property) = data.properties.get_mut(id) {
                    property.is_active = active;
                    toggled.push((*id, property.name.clone()));
                }
            }
            Ok(toggled)
        })
    }

    /// Removes the dependent rows of the given properties: group links and
    /// value rows. The properties themselves are untouched.
    pub fn remove_property_links(&self, ids: &[EntityId]) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.group_properties
                .retain(|(_, property_id)| !ids.contains(property_id));
            data.values
                .retain(|_, value| !ids.contains(&value.property_id));
            Ok(())
        })
    }

    // ---- values ----

    pub fn values_for_property(
        &self,
        property_id: EntityId,
    ) -> Result<Vec<(EntityId, ValueRecord)>, StoreError> {
        let data = self.snapshot()?;
        Ok(data
            .values
            .into_iter()
            .filter(|(_, value)| value.property_id == property_id)
            .collect())
    }

    pub fn create_value(&self, property_id: EntityId, text: &str) -> Result<EntityId, StoreError> {
        self.mutate(|data| {
            if !data.properties.contains_key(&property_id) {
                return Err(StoreError::NotFound);
            }
            if data
                .values
                .values()
                .any(|value| value.property_id == property_id && value.value == text)
            {
                return Err(StoreError::Duplicate);
            }
            let id = data.allocate_id();
            data.values.insert(
                id,
                ValueRecord {
                    property_id,
                    value: text.to_string(),
                    is_active: true,
                },
            );
            Ok(id)
        })
    }

    pub fn get_value(
        &self,
        property_id: EntityId,
        value_id: EntityId,
    ) -> Result<ValueRecord, StoreError> {
        let data = self.snapshot()?;
        data.values
            .get(&value_id)
            .filter(|value| value.property_id == property_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn update_value(
        &self,
        property_id: EntityId,
        value_id: EntityId,
        text: &str,
    ) -> Result<(), StoreError> {
        self.mutate(|data| {
            if !data
                .values
                .get(&value_id)
                .map(|value| value.property_id == property_id)
                .unwrap_or(false)
            {
                return Err(StoreError::NotFound);
            }
            if data.values.iter().any(|(other_id, other)| {
                *other_id != value_id && other.property_id == property_id && other.value == text
            }) {
                return Err(StoreError::Duplicate);
            }
            let value = data.values.get_mut(&value_id).ok_or(StoreError::NotFound)?;
            value.value = text.to_string();
            Ok(())
        })
    }

    /// Toggles the active flag on the property's matching values. Returns id
    /// and text of every toggled value.
    pub fn set_values_active(
        &self,
        property_id: EntityId,
        ids: &[EntityId],
        active: bool,
    ) -> Result<Vec<(EntityId, String)>, StoreError> {
        self.mutate(|data| {
            let mut toggled = Vec::new();
            for id in ids {
                if let Some(value) = data.values.get_mut(id) {
                    if value.property_id == property_id {
                        value.is_active = active;
                        toggled.push((*id, value.value.clone()));
                    }
                }
            }
            Ok(toggled)
        })
    }
}
