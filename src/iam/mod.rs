// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod middleware;
pub mod store;
pub mod types;

pub use middleware::{AuthRequest, IdentityMiddlewareFactory, RequirePermission};
pub use store::{FileUserStore, UserDirectory, UserStore};
pub use types::{IamError, User, UsersData};
