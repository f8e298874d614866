// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Value, context};
use serde::Serialize;

use super::types::EntityId;

#[derive(Debug, Clone, Serialize)]
pub struct AuditRow {
    pub who: String,
    pub date: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub id: EntityId,
    pub name: String,
    pub is_active: bool,
    pub manager: String,
    pub modified_by: Option<String>,
    pub properties: Vec<String>,
    pub logs: Vec<AuditRow>,
}

#[derive(Debug, Clone)]
pub struct GroupsPageContext {
    app_name: String,
    environments: Vec<GroupRow>,
}

impl GroupsPageContext {
    pub fn new(app_name: &str, environments: Vec<GroupRow>) -> Self {
        Self {
            app_name: app_name.to_string(),
            environments,
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            environments => Value::from_serialize(&self.environments)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyOption {
    pub id: EntityId,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub id: EntityId,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct GroupEditContext {
    app_name: String,
    environment: GroupView,
    properties: Vec<PropertyOption>,
    message: String,
}

impl GroupEditContext {
    pub fn new(
        app_name: &str,
        environment: GroupView,
        properties: Vec<PropertyOption>,
        message: &str,
    ) -> Self {
        Self {
            app_name: app_name.to_string(),
            environment,
            properties,
            message: message.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            environment => Value::from_serialize(&self.environment),
            properties => Value::from_serialize(&self.properties),
            message => &self.message
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyRow {
    pub id: EntityId,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyPageContext {
    app_name: String,
    properties: Vec<PropertyRow>,
    message: String,
}

impl PropertyPageContext {
    pub fn new(app_name: &str, properties: Vec<PropertyRow>, message: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            properties,
            message: message.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            properties => Value::from_serialize(&self.properties),
            message => &self.message
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueRow {
    pub id: EntityId,
    pub value: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct ValuesFragmentContext {
    property_id: EntityId,
    property_name: String,
    values: Vec<ValueRow>,
    message: String,
}

impl ValuesFragmentContext {
    pub fn new(
        property_id: EntityId,
        property_name: &str,
        values: Vec<ValueRow>,
        message: &str,
    ) -> Self {
        Self {
            property_id,
            property_name: property_name.to_string(),
            values,
            message: message.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            property_id => self.property_id,
            property_name => &self.property_name,
            values => Value::from_serialize(&self.values),
            message => &self.message
        }
    }
}
