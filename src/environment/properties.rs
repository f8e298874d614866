// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Environment property management: add, edit, del, modify. Add and edit
//! answer with the AJAX envelope; del and modify render the listing page.

use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;

use super::context::{PropertyPageContext, PropertyRow};
use super::store::{EnvStore, StoreError};
use super::types::{EntityId, validate_name};
use super::{
    PERM_ADD_PROPERTY, PERM_CHANGE_PROPERTY, PERM_DELETE_PROPERTY, internal_error, is_ajax,
    json_err, json_ok, record_audit,
};
use crate::app_state::AppState;
use crate::audit::{AuditLog, TargetKind};
use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;
use crate::templates::render_minijinja_template;
use crate::util::QueryParams;

pub async fn environment_properties(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    store: web::Data<EnvStore>,
    audit: web::Data<AuditLog>,
) -> Result<HttpResponse> {
    let params = QueryParams::from_request(&req);
    let mut message = String::new();

    match params.get("action") {
        Some("add") => return add_property(&req, &params, store.get_ref(), audit.get_ref()),
        Some("edit") => return edit_property(&req, &params, store.get_ref(), audit.get_ref()),
        Some("del") => {
            message = delete_properties(&req, &params, store.get_ref(), audit.get_ref())?;
        }
        Some("modify") => {
            message = modify_properties(&req, &params, store.get_ref(), audit.get_ref())?;
        }
        Some(_) if is_ajax(&req) => return Ok(json_err("Unknown action")),
        _ => {}
    }

    let properties: Vec<PropertyRow> = store
        .list_properties_ordered()
        .map_err(|err| internal_error("list environment properties", err))?
        .into_iter()
        .map(|(id, property)| PropertyRow {
            id,
            name: property.name,
            is_active: property.is_active,
        })
        .collect();

    let context = PropertyPageContext::new(&config.app.name, properties, &message).to_value();
    let html = render_minijinja_template(
        app_state.templates.as_ref(),
        "environment/property.html",
        context,
    )
    .map_err(|err| internal_error("render environment property template", err))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

fn add_property(
    req: &HttpRequest,
    params: &QueryParams,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<HttpResponse> {
    if !req.has_perm(PERM_ADD_PROPERTY) {
        return Ok(json_err("Permission denied"));
    }

    let name = match params.get_non_empty("name") {
        Some(name) => name,
        None => return Ok(json_err("Property name is required")),
    };
    if let Err(err) = validate_name("Property name", name) {
        return Ok(json_err(err.message()));
    }

    match store.create_property(name) {
        Ok(id) => {
            if let Some(user) = req.user_info() {
                record_audit(audit.log_action(
                    &user.email,
                    TargetKind::Property,
                    id,
                    format!("Created env property {}", name),
                ));
            }
            Ok(HttpResponse::Ok().json(json!({
                "rc": 0,
                "response": "ok",
                "id": id,
                "name": name
            })))
        }
        Err(StoreError::Duplicate) => Ok(json_err(&format!(
            "Environment property named '{}' already exists, please select another name.",
            name
        ))),
        // Any other storage failure is surfaced verbatim in the envelope.
        Err(err) => Ok(json_err(&err.to_string())),
    }
}

fn edit_property(
    req: &HttpRequest,
    params: &QueryParams,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<HttpResponse> {
    if !req.has_perm(PERM_CHANGE_PROPERTY) {
        return Ok(json_err("Permission denied"));
    }

    let property_id: EntityId = match params.get_non_empty("id") {
        Some(raw) => match raw.parse() {
            Ok(id) => id,
            Err(_) => return Ok(json_err("Environment property not found")),
        },
        None => return Ok(json_err("ID is required")),
    };

    let current = match store.get_property(property_id) {
        Ok(property) => property,
        Err(StoreError::NotFound) => return Ok(json_err("Environment property not found")),
        Err(err) => return Ok(json_err(&err.to_string())),
    };

    if let Some(name) = params.get_non_empty("name") {
        if name != current.name {
            match store.rename_property(property_id, name) {
                Ok(()) => {
                    if let Some(user) = req.user_info() {
                        record_audit(audit.log_action(
                            &user.email,
                            TargetKind::Property,
                            property_id,
                            format!("Rename env property from {} to {}", current.name, name),
                        ));
                    }
                }
                Err(StoreError::Duplicate) => {
                    return Ok(json_err(&format!(
                        "Environment property named '{}' already exists, please select another name.",
                        name
                    )));
                }
                Err(StoreError::NotFound) => {
                    return Ok(json_err("Environment property not found"));
                }
                Err(err) => return Ok(json_err(&err.to_string())),
            }
        }
    }

    Ok(json_ok())
}

fn delete_properties(
    req: &HttpRequest,
    params: &QueryParams,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<String> {
    if !req.has_perm(PERM_DELETE_PROPERTY) {
        return Ok("Permission denied".to_string());
    }

    let property_ids = params.get_ids("id");
    if property_ids.is_empty() {
        return Ok(String::new());
    }

    // Dependent-row cleanup is best-effort by contract; a failure here must
    // not block the property delete itself.
    if let Err(err) = store.remove_property_links(&property_ids) {
        log::debug!("Ignoring property link cleanup failure: {}", err);
    }

    match store.delete_properties(&property_ids) {
        Ok(removed) if removed.is_empty() => Ok("Environment property not found".to_string()),
        Ok(removed) => {
            if let Some(user) = req.user_info() {
                for (id, name) in &removed {
                    record_audit(audit.log_action(
                        &user.email,
                        TargetKind::Property,
                        *id,
                        format!("Removed env property {}", name),
                    ));
                }
            }
            let names: Vec<String> = removed.into_iter().map(|(_, name)| name).collect();
            Ok(format!(
                "Removed environment properties '{}' successfully.",
                names.join("', '")
            ))
        }
        Err(err) => Ok(err.to_string()),
    }
}

fn modify_properties(
    req: &HttpRequest,
    params: &QueryParams,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<String> {
    if !req.has_perm(PERM_CHANGE_PROPERTY) {
        return Ok("Permission denied".to_string());
    }

    let property_ids = params.get_ids("id");
    if property_ids.is_empty() {
        return Ok(String::new());
    }

    let active = match params.get("status") {
        Some("0") => false,
        Some("1") => true,
        _ => return Ok("Argument illegal".to_string()),
    };

    let message = match store.set_properties_active(&property_ids, active) {
        Ok(toggled) if toggled.is_empty() => "Environment property not found".to_string(),
        Ok(toggled) => {
            if let Some(user) = req.user_info() {
                for (id, _) in &toggled {
                    record_audit(audit.log_action(
                        &user.email,
                        TargetKind::Property,
                        *id,
                        format!("Change env property status to {}", active),
                    ));
                }
            }
            let names: Vec<String> = toggled.into_iter().map(|(_, name)| name).collect();
            format!(
                "Modified environment properties status '{}' successfully.",
                names.join("', '")
            )
        }
        Err(err) => err.to_string(),
    };

    // Same best-effort dependent-row cleanup as the delete action.
    if let Err(err) = store.remove_property_links(&property_ids) {
        log::debug!("Ignoring property link cleanup failure: {}", err);
    }

    Ok(message)
}
