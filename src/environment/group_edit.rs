// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Property assignment page for one environment group. The route is wrapped
//! in RequirePermission(environment.change_group).

use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::context::{GroupEditContext, GroupView, PropertyOption};
use super::store::{EnvStore, StoreError};
use super::types::{EntityId, GroupRecord};
use super::{internal_error, record_audit};
use crate::app_state::AppState;
use crate::audit::{AuditLog, TargetKind};
use crate::config::ValidatedConfig;
use crate::error_pages;
use crate::iam::AuthRequest;
use crate::templates::render_minijinja_template;
use crate::util::QueryParams;

const DUPLICATE_NAME_MESSAGE: &str =
    "Duplicated name already exists, please change to another name.";

pub async fn environment_group_edit(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    store: web::Data<EnvStore>,
    audit: web::Data<AuditLog>,
) -> Result<HttpResponse> {
    let params = QueryParams::from_request(&req);

    let group_id: EntityId = match params
        .get_non_empty("id")
        .and_then(|raw| raw.parse().ok())
    {
        Some(id) => id,
        None => {
            return error_pages::serve_404(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    let mut environment = match store.get_group(group_id) {
        Ok(group) => group,
        Err(StoreError::NotFound) => {
            return error_pages::serve_404(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
        Err(err) => return Err(internal_error("load environment group", err)),
    };

    // A name already owned by a different group blocks the whole edit.
    if let Some(name) = params.get_non_empty("name") {
        let collision = store
            .find_group_by_name(name)
            .map_err(|err| internal_error("check environment group name", err))?;
        if collision.map(|other_id| other_id != group_id).unwrap_or(false) {
            return render_edit_page(
                config.get_ref(),
                app_state.get_ref(),
                store.get_ref(),
                group_id,
                &environment,
                DUPLICATE_NAME_MESSAGE,
            );
        }
    }

    let mut message = "";
    if params.get("action") == Some("modify") {
        let user = match req.user_info() {
            Some(user) => user,
            None => {
                return Ok(HttpResponse::Forbidden()
                    .content_type("text/plain; charset=utf-8")
                    .body("Permission denied"));
            }
        };

        let mut pending_audit = Vec::new();

        if let Some(new_name) = params.get_non_empty("name") {
            if environment.name != new_name {
                pending_audit.push(format!(
                    "Modify name from {} to {}",
                    environment.name, new_name
                ));
                environment.name = new_name.to_string();
            }
        }

        let enabled = params
            .get("enabled")
            .map(|value| matches!(value, "1" | "true" | "on"))
            .unwrap_or(false);
        if environment.is_active != enabled {
            environment.is_active = enabled;
            pending_audit.push(format!("Change env group status to {}", enabled));
        }

        environment.modified_by = Some(user.email.clone());

        match store.update_group(group_id, environment.clone()) {
            Ok(()) => {}
            Err(StoreError::Duplicate) => {
                // Lost a race against a concurrent rename.
                return render_edit_page(
                    config.get_ref(),
                    app_state.get_ref(),
                    store.get_ref(),
                    group_id,
                    &environment,
                    DUPLICATE_NAME_MESSAGE,
                );
            }
            Err(err) => return Err(internal_error("save environment group", err)),
        }

        let selected_ids = params.get_ids("selected_property_ids");
        let linked_names = store
            .replace_group_properties(group_id, &selected_ids)
            .map_err(|err| internal_error("reassign group properties", err))?;
        pending_audit.push(format!("Properties changed to {}", linked_names.join(", ")));

        for action in pending_audit {
            record_audit(audit.log_action(&user.email, TargetKind::Group, group_id, action));
        }

        message = "Environment group saved successfully.";
    }

    render_edit_page(config.get_ref(), app_state.get_ref(), store.get_ref(), group_id, &environment, message)
}

fn render_edit_page(
    config: &ValidatedConfig,
    app_state: &AppState,
    store: &EnvStore,
    group_id: EntityId,
    environment: &GroupRecord,
    message: &str,
) -> Result<HttpResponse> {
    let selected = store
        .linked_property_ids(group_id)
        .map_err(|err| internal_error("load group property links", err))?;
    let properties: Vec<PropertyOption> = store
        .active_properties()
        .map_err(|err| internal_error("load active properties", err))?
        .into_iter()
        .map(|(id, property)| PropertyOption {
            id,
            name: property.name,
            selected: selected.contains(&id),
        })
        .collect();

    let context = GroupEditContext::new(
        &config.app.name,
        GroupView {
            id: group_id,
            name: environment.name.clone(),
            is_active: environment.is_active,
        },
        properties,
        message,
    )
    .to_value();

    let html = render_minijinja_template(
        app_state.templates.as_ref(),
        "environment/group_edit.html",
        context,
    )
    .map_err(|err| internal_error("render group edit template", err))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
