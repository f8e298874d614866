// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

use super::PERM_CHANGE_GROUP;
use crate::iam::RequirePermission;

pub fn configure(cfg: &mut web::ServiceConfig, base_path: &str) {
    cfg.route(
        &format!("{}/environment/groups", base_path),
        web::get().to(super::groups::environment_groups),
    )
    .route(
        &format!("{}/environment/properties", base_path),
        web::get().to(super::properties::environment_properties),
    )
    .route(
        &format!("{}/environment/values", base_path),
        web::get().to(super::values::environment_property_values),
    )
    .service(
        web::resource(format!("{}/environment/group/edit", base_path))
            .wrap(RequirePermission::new(PERM_CHANGE_GROUP))
            .route(web::get().to(super::group_edit::environment_group_edit)),
    );
}
