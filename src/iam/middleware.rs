// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse, body::EitherBody};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc; // Services are per-thread

use super::store::UserDirectory;
use super::types::User;

/// Header carrying the authenticated principal, set by the front-end proxy.
pub const FORWARDED_USER_HEADER: &str = "X-Forwarded-User";

/// Trait to add identity methods to HttpRequest
pub trait AuthRequest {
    fn user_info(&self) -> Option<User>;
    fn is_authenticated(&self) -> bool;
    fn has_perm(&self, code: &str) -> bool;
}

impl AuthRequest for HttpRequest {
    fn user_info(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.user_info().is_some()
    }

    fn has_perm(&self, code: &str) -> bool {
        self.user_info()
            .map(|user| user.has_perm(code))
            .unwrap_or(false)
    }
}

// Identity resolution middleware: maps the forwarded principal header to a
// User from the directory and stores it in request extensions.
pub struct IdentityMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct IdentityMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let directory = req.app_data::<Data<UserDirectory>>().cloned();
        let service = self.service.clone();

        if let Some(directory) = directory {
            if let Some(header) = req.headers().get(FORWARDED_USER_HEADER) {
                match header.to_str() {
                    Ok(email) => {
                        let email = email.trim();
                        if let Some(user) = directory.lookup(email) {
                            req.extensions_mut().insert(user);
                        } else {
                            log::debug!("Forwarded principal '{}' is not registered", email);
                        }
                    }
                    Err(_) => {
                        log::warn!("Forwarded principal header is not valid UTF-8");
                    }
                }
            }
        }

        Box::pin(async move { service.call(req).await })
    }
}

/// Middleware that requires a specific permission code before the wrapped
/// route runs; answers 403 otherwise.
pub struct RequirePermission {
    code: &'static str,
}

impl RequirePermission {
    pub fn new(code: &'static str) -> Self {
        Self { code }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePermissionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionService {
            service,
            code: self.code,
        }))
    }
}

pub struct RequirePermissionService<S> {
    service: S,
    code: &'static str,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !req.request().has_perm(self.code) {
            let (req, _) = req.into_parts();
            let response = HttpResponse::Forbidden()
                .content_type("text/plain; charset=utf-8")
                .body("Permission denied")
                .map_into_right_body();

            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
