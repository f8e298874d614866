// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, Result, test, web};
use caseboard::app_state::AppState;
use caseboard::audit::AuditLog;
use caseboard::config::{AdminConfig, AppConfig, LoggingConfig, ServerConfig, ValidatedConfig};
use caseboard::environment::{self, EnvStore};
use caseboard::error_pages;
use caseboard::iam::middleware::FORWARDED_USER_HEADER;
use caseboard::iam::{IdentityMiddlewareFactory, User, UserDirectory};
use caseboard::util::test_fixtures::TestFixtureRoot;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MANAGER_EMAIL: &str = "manager@example.com";
pub const VIEWER_EMAIL: &str = "viewer@example.com";

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub store: Arc<EnvStore>,
    pub audit: Arc<AuditLog>,
    pub directory: Arc<UserDirectory>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub store: Arc<EnvStore>,
    pub audit: Arc<AuditLog>,
    pub directory: Arc<UserDirectory>,
    pub admin_path: String,
}

impl TestHarness {
    pub fn new() -> Self {
        let fixture = TestFixtureRoot::new_unique("env-admin-suite").expect("fixture root");
        fixture.init_runtime_layout().expect("fixture layout");

        let config = Arc::new(build_config());
        let runtime_paths = fixture.runtime_paths().expect("runtime paths");

        let store =
            Arc::new(EnvStore::new(runtime_paths.state_sys_dir.clone()).expect("env store"));
        let audit =
            Arc::new(AuditLog::new(runtime_paths.state_sys_dir.clone()).expect("audit log"));
        let directory = Arc::new(UserDirectory::from_users(seed_users()));
        let app_state = Arc::new(AppState::new(&config.app.name, runtime_paths));

        Self {
            fixture,
            config,
            app_state,
            store,
            audit,
            directory,
        }
    }

    pub fn bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            store: self.store.clone(),
            audit: self.audit.clone(),
            directory: self.directory.clone(),
            admin_path: self.config.admin.path.clone(),
        }
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let admin_path = bundle.admin_path;

    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.store))
        .app_data(web::Data::from(bundle.audit))
        .app_data(web::Data::from(bundle.directory))
        .wrap(IdentityMiddlewareFactory)
        .configure(move |cfg| environment::handlers::configure(cfg, &admin_path))
        .default_service(web::route().to(test_default_not_found))
}

async fn test_default_not_found(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    error_pages::serve_404(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}

/// Test request with the forwarded-principal header set.
pub fn as_user(req: test::TestRequest, email: &str) -> test::TestRequest {
    req.insert_header((FORWARDED_USER_HEADER, email))
}

fn build_config() -> ValidatedConfig {
    ValidatedConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            workers: 1,
        },
        admin: AdminConfig {
            path: "/admin".to_string(),
        },
        app: AppConfig {
            name: "Test App".to_string(),
            description: "Test Description".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

fn seed_users() -> Vec<User> {
    vec![
        User {
            email: ADMIN_EMAIL.to_string(),
            name: "Admin User".to_string(),
            permissions: vec![
                environment::PERM_ADD_GROUP.to_string(),
                environment::PERM_CHANGE_GROUP.to_string(),
                environment::PERM_DELETE_GROUP.to_string(),
                environment::PERM_ADD_PROPERTY.to_string(),
                environment::PERM_CHANGE_PROPERTY.to_string(),
                environment::PERM_DELETE_PROPERTY.to_string(),
                environment::PERM_ADD_VALUE.to_string(),
                environment::PERM_CHANGE_VALUE.to_string(),
            ],
        },
        User {
            email: MANAGER_EMAIL.to_string(),
            name: "Group Manager".to_string(),
            permissions: vec![environment::PERM_ADD_GROUP.to_string()],
        },
        User {
            email: VIEWER_EMAIL.to_string(),
            name: "Viewer".to_string(),
            permissions: vec![],
        },
    ]
}
