// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::HttpResponse;
use serde_json::json;

pub mod context;
pub mod group_edit;
pub mod groups;
pub mod handlers;
pub mod properties;
pub mod store;
pub mod types;
pub mod values;

pub use store::{EnvStore, StoreError};
pub use types::{EntityId, EnvDataset, GroupRecord, PropertyRecord, ValueRecord};

pub const PERM_ADD_GROUP: &str = "environment.add_group";
pub const PERM_CHANGE_GROUP: &str = "environment.change_group";
pub const PERM_DELETE_GROUP: &str = "environment.delete_group";
pub const PERM_ADD_PROPERTY: &str = "environment.add_property";
pub const PERM_CHANGE_PROPERTY: &str = "environment.change_property";
pub const PERM_DELETE_PROPERTY: &str = "environment.delete_property";
pub const PERM_ADD_VALUE: &str = "environment.add_value";
pub const PERM_CHANGE_VALUE: &str = "environment.change_value";

// AJAX envelope: rc 0 is success, rc 1 carries a user-facing message.

pub(crate) fn json_ok() -> HttpResponse {
    HttpResponse::Ok().json(json!({"rc": 0, "response": "ok"}))
}

pub(crate) fn json_ok_with_id(id: EntityId) -> HttpResponse {
    HttpResponse::Ok().json(json!({"rc": 0, "response": "ok", "id": id}))
}

pub(crate) fn json_err(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({"rc": 1, "response": message}))
}

pub(crate) fn plain_text(message: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(message.to_string())
}

/// Log the detailed error server-side and hand the client a generic 500.
pub(crate) fn internal_error(operation: &str, err: impl std::fmt::Display) -> actix_web::Error {
    log::error!("Failed to {}: {}", operation, err);
    actix_web::error::ErrorInternalServerError("An internal error occurred")
}

pub(crate) fn record_audit(result: Result<(), crate::audit::AuditError>) {
    if let Err(err) = result {
        log::error!("Failed to write audit entry: {}", err);
    }
}

pub(crate) fn is_ajax(req: &actix_web::HttpRequest) -> bool {
    req.headers()
        .get("X-Requested-With")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == "XMLHttpRequest")
        .unwrap_or(false)
}
