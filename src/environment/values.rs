// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Value listing and mutation for one environment property. Responses are
//! either plain-text errors or the rendered values fragment.

use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::context::{ValueRow, ValuesFragmentContext};
use super::store::{EnvStore, StoreError};
use super::types::EntityId;
use super::{PERM_ADD_VALUE, PERM_CHANGE_VALUE, internal_error, plain_text, record_audit};
use crate::app_state::AppState;
use crate::audit::{AuditLog, TargetKind};
use crate::iam::AuthRequest;
use crate::templates::render_minijinja_template;
use crate::util::QueryParams;

pub async fn environment_property_values(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    store: web::Data<EnvStore>,
    audit: web::Data<AuditLog>,
) -> Result<HttpResponse> {
    let params = QueryParams::from_request(&req);

    let property_id: EntityId = match params.get_non_empty("property_id") {
        Some(raw) => match raw.parse() {
            Ok(id) => id,
            Err(_) => return Ok(plain_text("Environment property not found")),
        },
        None => return Ok(plain_text("Property id should be specified")),
    };

    let property = match store.get_property(property_id) {
        Ok(property) => property,
        Err(StoreError::NotFound) => return Ok(plain_text("Environment property not found")),
        Err(err) => return Err(internal_error("load environment property", err)),
    };

    let action = params.get("action");
    let mut duplicated: Vec<String> = Vec::new();

    if action == Some("add") && params.get_non_empty("value").is_some() {
        if !req.has_perm(PERM_ADD_VALUE) {
            return Ok(plain_text("Permission denied"));
        }

        // One record per comma-separated element; duplicates are collected
        // and reported together instead of aborting the batch.
        for value in params.get("value").unwrap_or("").split(',') {
            match store.create_value(property_id, value) {
                Ok(id) => {
                    if let Some(user) = req.user_info() {
                        record_audit(audit.log_action(
                            &user.email,
                            TargetKind::Value,
                            id,
                            format!("Added value {}", value),
                        ));
                    }
                }
                Err(StoreError::Duplicate) => duplicated.push(value.to_string()),
                Err(err) => return Err(internal_error("create environment value", err)),
            }
        }
    }

    if action == Some("edit") && params.get_non_empty("id").is_some() {
        if !req.has_perm(PERM_CHANGE_VALUE) {
            return Ok(plain_text("Permission denied"));
        }

        let value_id: EntityId = match params.get("id").and_then(|raw| raw.parse().ok()) {
            Some(id) => id,
            None => return Ok(plain_text("Environment value not found")),
        };

        let current = match store.get_value(property_id, value_id) {
            Ok(value) => value,
            Err(StoreError::NotFound) => return Ok(plain_text("Environment value not found")),
            Err(err) => return Err(internal_error("load environment value", err)),
        };

        let new_text = params.get("value").unwrap_or(current.value.as_str());
        match store.update_value(property_id, value_id, new_text) {
            Ok(()) => {
                if new_text != current.value {
                    if let Some(user) = req.user_info() {
                        record_audit(audit.log_action(
                            &user.email,
                            TargetKind::Value,
                            value_id,
                            format!("Modify value from {} to {}", current.value, new_text),
                        ));
                    }
                }
            }
            Err(StoreError::Duplicate) => duplicated.push(new_text.to_string()),
            Err(StoreError::NotFound) => return Ok(plain_text("Environment value not found")),
            Err(err) => return Err(internal_error("update environment value", err)),
        }
    }

    if action == Some("modify") && !params.get_all("id").is_empty() {
        if !req.has_perm(PERM_CHANGE_VALUE) {
            return Ok(plain_text("Permission denied"));
        }

        let active = match params.get("status") {
            Some("0") => false,
            Some("1") => true,
            _ => return Ok(plain_text("Argument illegal")),
        };

        let value_ids = params.get_ids("id");
        let toggled = store
            .set_values_active(property_id, &value_ids, active)
            .map_err(|err| internal_error("change environment value status", err))?;
        if let Some(user) = req.user_info() {
            for (id, _) in &toggled {
                record_audit(audit.log_action(
                    &user.email,
                    TargetKind::Value,
                    *id,
                    format!("Change env value status to {}", active),
                ));
            }
        }
    }

    let message = if duplicated.is_empty() {
        String::new()
    } else {
        format!(
            "Value(s) named '{}' already exists in this property, please select another name.",
            duplicated.join("', '")
        )
    };

    let values: Vec<ValueRow> = store
        .values_for_property(property_id)
        .map_err(|err| internal_error("list environment values", err))?
        .into_iter()
        .map(|(id, value)| ValueRow {
            id,
            value: value.value,
            is_active: value.is_active,
        })
        .collect();

    let context =
        ValuesFragmentContext::new(property_id, &property.name, values, &message).to_value();
    let html = render_minijinja_template(
        app_state.templates.as_ref(),
        "environment/property_values.html",
        context,
    )
    .map_err(|err| internal_error("render property values template", err))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
