// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpResponse, HttpServer, Result, middleware::Logger, web};
use log::LevelFilter;
use std::path::PathBuf;

use caseboard::app_state::AppState;
use caseboard::audit::AuditLog;
use caseboard::bootstrap;
use caseboard::environment::{self, EnvStore};
use caseboard::error_pages;
use caseboard::iam::{FileUserStore, IdentityMiddlewareFactory, UserDirectory};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.show_help {
        print!("{}", help_text());
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    if bootstrap.created_config || bootstrap.created_users {
        let mut created = Vec::new();
        if bootstrap.created_config {
            created.push("config.yaml");
        }
        if bootstrap.created_users {
            created.push("users.yaml");
        }
        eprintln!("[bootstrap] created {}", created.join(" and "));
    }

    let level = bootstrap
        .config
        .logging
        .level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = bootstrap.config;
    let runtime_paths = bootstrap.runtime_paths;

    let env_store = match EnvStore::new(runtime_paths.state_sys_dir.clone()) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("❌ Failed to open environment store: {}", error);
            return 1;
        }
    };

    let audit_log = match AuditLog::new(runtime_paths.state_sys_dir.clone()) {
        Ok(audit) => audit,
        Err(error) => {
            eprintln!("❌ Failed to open audit log: {}", error);
            return 1;
        }
    };

    let user_store = match FileUserStore::new(runtime_paths.users_file.clone()) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("❌ Failed to open user registry: {}", error);
            return 1;
        }
    };
    let user_directory = match UserDirectory::load(&user_store) {
        Ok(directory) => directory,
        Err(error) => {
            eprintln!("❌ Failed to load user registry: {}", error);
            return 1;
        }
    };

    let app_state = AppState::new(&config.app.name, runtime_paths);

    log::info!(
        "Starting {} environment administration on {}:{}",
        config.app.name,
        config.server.host,
        config.server.port
    );

    let host = config.server.host.clone();
    let port = config.server.port;
    let workers = config.server.workers;
    let admin_path = config.admin.path.clone();

    let config_data = web::Data::new(config);
    let app_state_data = web::Data::new(app_state);
    let store_data = web::Data::new(env_store);
    let audit_data = web::Data::new(audit_log);
    let directory_data = web::Data::new(user_directory);

    let server_result = System::new().block_on(async move {
        HttpServer::new(move || {
            let admin_path = admin_path.clone();
            App::new()
                .app_data(config_data.clone())
                .app_data(app_state_data.clone())
                .app_data(store_data.clone())
                .app_data(audit_data.clone())
                .app_data(directory_data.clone())
                .wrap(Logger::default())
                .wrap(IdentityMiddlewareFactory)
                .configure(|cfg| environment::handlers::configure(cfg, &admin_path))
                .default_service(web::route().to(default_not_found))
        })
        .workers(workers)
        .bind((host.as_str(), port))?
        .run()
        .await
    });

    match server_result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server error: {}", error);
            1
        }
    }
}

async fn default_not_found(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    error_pages::serve_404(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}

struct ParsedArgs {
    runtime_root: PathBuf,
    show_help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    let mut runtime_root = PathBuf::from(".");
    let mut show_help = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| "-C requires a directory argument".to_string())?;
                runtime_root = PathBuf::from(value);
            }
            "-h" | "--help" => show_help = true,
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(ParsedArgs {
        runtime_root,
        show_help,
    })
}

fn help_text() -> String {
    "caseboard - environment administration service\n\
     \n\
     Usage: caseboard [-C <root>] [-h]\n\
     \n\
     Options:\n\
       -C <root>   Runtime directory (default: current directory)\n\
       -h, --help  Print this help text\n"
        .to_string()
}
