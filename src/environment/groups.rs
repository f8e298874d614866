// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Environment group listing and mutation: add, del, modify, search.

use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::context::{AuditRow, GroupRow, GroupsPageContext};
use super::store::{EnvStore, StoreError};
use super::types::{EntityId, validate_name};
use super::{
    PERM_ADD_GROUP, PERM_CHANGE_GROUP, PERM_DELETE_GROUP, internal_error, json_err, json_ok,
    json_ok_with_id, record_audit,
};
use crate::app_state::AppState;
use crate::audit::{AuditLog, TargetKind};
use crate::config::ValidatedConfig;
use crate::error_pages;
use crate::iam::AuthRequest;
use crate::templates::render_minijinja_template;
use crate::util::QueryParams;

pub async fn environment_groups(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    store: web::Data<EnvStore>,
    audit: web::Data<AuditLog>,
) -> Result<HttpResponse> {
    let params = QueryParams::from_request(&req);
    let action = params.get("action");

    if action == Some("add") {
        return add_group(&req, &params, store.get_ref(), audit.get_ref());
    }

    if action == Some("del") {
        return delete_group(&req, &params, app_state.get_ref(), store.get_ref());
    }

    if action == Some("modify") {
        // A successful modify falls through to the listing render below.
        if let Some(response) =
            modify_group(&req, &params, app_state.get_ref(), store.get_ref(), audit.get_ref())?
        {
            return Ok(response);
        }
    }

    let groups = if action == Some("search") {
        store
            .search_groups(params.get("name").unwrap_or(""))
            .map_err(|err| internal_error("search environment groups", err))?
    } else {
        store
            .list_groups_ordered()
            .map_err(|err| internal_error("list environment groups", err))?
    };

    let group_ids: Vec<EntityId> = groups.iter().map(|(id, _)| *id).collect();
    let properties = store
        .property_names_by_group(&group_ids)
        .map_err(|err| internal_error("collect group properties", err))?;
    let logs = audit
        .entries_for(TargetKind::Group, &group_ids)
        .map_err(|err| internal_error("collect group audit entries", err))?;

    let rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(id, group)| GroupRow {
            id,
            name: group.name,
            is_active: group.is_active,
            manager: group.manager,
            modified_by: group.modified_by,
            properties: properties.get(&id).cloned().unwrap_or_default(),
            logs: logs
                .get(&id)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|entry| AuditRow {
                            who: entry.actor.clone(),
                            date: entry.at.format("%Y-%m-%d %H:%M:%S").to_string(),
                            action: entry.action.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();

    let context = GroupsPageContext::new(&config.app.name, rows).to_value();
    let html = render_minijinja_template(
        app_state.templates.as_ref(),
        "environment/groups.html",
        context,
    )
    .map_err(|err| internal_error("render environment groups template", err))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

fn add_group(
    req: &HttpRequest,
    params: &QueryParams,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<HttpResponse> {
    if !req.has_perm(PERM_ADD_GROUP) {
        return Ok(json_err("Permission denied."));
    }

    let user = match req.user_info() {
        Some(user) => user,
        None => return Ok(json_err("Permission denied.")),
    };

    let group_name = match params.get_non_empty("name") {
        Some(name) => name,
        None => return Ok(json_err("Environment group name is required.")),
    };
    if let Err(err) = validate_name("Environment group name", group_name) {
        return Ok(json_err(err.message()));
    }

    match store.create_group(group_name, &user.email) {
        Ok(id) => {
            record_audit(audit.log_action(
                &user.email,
                TargetKind::Group,
                id,
                format!("Initial env group {}", group_name),
            ));
            Ok(json_ok_with_id(id))
        }
        Err(StoreError::Duplicate) => Ok(json_err(&format!(
            "Environment group name '{}' already exists, please select another name.",
            group_name
        ))),
        Err(err) => Err(internal_error("create environment group", err)),
    }
}

fn delete_group(
    req: &HttpRequest,
    params: &QueryParams,
    app_state: &AppState,
    store: &EnvStore,
) -> Result<HttpResponse> {
    let raw_id = match params.get_non_empty("id") {
        Some(raw) => raw,
        None => {
            return error_pages::serve_404(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    let group_id: EntityId = match raw_id.parse() {
        Ok(id) => id,
        Err(_) => return Ok(json_err("id must be an integer.")),
    };

    let group = match store.get_group(group_id) {
        Ok(group) => group,
        Err(StoreError::NotFound) => {
            return error_pages::serve_404(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
        Err(err) => return Err(internal_error("load environment group", err)),
    };

    // The group's manager may delete it without holding delete-permission.
    let is_manager = req
        .user_info()
        .map(|user| user.email == group.manager)
        .unwrap_or(false);
    if !is_manager && !req.has_perm(PERM_DELETE_GROUP) {
        return Ok(json_err("Permission denied."));
    }

    match store.delete_group(group_id) {
        Ok(()) => Ok(json_ok()),
        Err(StoreError::NotFound) => error_pages::serve_404(
            &app_state.error_renderer,
            Some(app_state.templates.as_ref()),
        ),
        Err(err) => Err(internal_error("delete environment group", err)),
    }
}

/// Returns Some(response) when the action short-circuits; None when the
/// listing should render.
fn modify_group(
    req: &HttpRequest,
    params: &QueryParams,
    app_state: &AppState,
    store: &EnvStore,
    audit: &AuditLog,
) -> Result<Option<HttpResponse>> {
    if !req.has_perm(PERM_CHANGE_GROUP) {
        return Ok(Some(json_err("Permission denied.")));
    }

    let group_id: EntityId = match params
        .get_non_empty("id")
        .and_then(|raw| raw.parse().ok())
    {
        Some(id) => id,
        None => {
            return error_pages::serve_404(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            )
            .map(Some);
        }
    };

    if store.get_group(group_id).is_err() {
        return error_pages::serve_404(
            &app_state.error_renderer,
            Some(app_state.templates.as_ref()),
        )
        .map(Some);
    }

    let active = match params.get("status") {
        Some("0") => false,
        Some("1") => true,
        _ => return Ok(Some(json_err("Argument illegal."))),
    };

    match store.set_group_active(group_id, active) {
        Ok(group) => {
            if let Some(user) = req.user_info() {
                record_audit(audit.log_action(
                    &user.email,
                    TargetKind::Group,
                    group_id,
                    format!("Change env group status to {}", group.is_active),
                ));
            }
            Ok(None)
        }
        Err(StoreError::NotFound) => error_pages::serve_404(
            &app_state.error_renderer,
            Some(app_state.templates.as_ref()),
        )
        .map(Some),
        Err(err) => Err(internal_error("change environment group status", err)),
    }
}
