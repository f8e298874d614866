// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use caseboard::audit::TargetKind;
use common::{ADMIN_EMAIL, MANAGER_EMAIL, VIEWER_EMAIL, as_user, build_test_app};
use serde_json::Value;

#[actix_web::test]
async fn add_creates_group_and_audit_entry_once() {
    let harness = common::TestHarness::new();
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=add&name=web"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 0);
    assert_eq!(body["response"], "ok");
    let group_id = body["id"].as_u64().expect("group id");

    let group = harness.store.get_group(group_id).expect("group");
    assert_eq!(group.name, "web");
    assert_eq!(group.manager, ADMIN_EMAIL);
    assert!(group.is_active);

    let entries = harness
        .audit
        .entries_for(TargetKind::Group, &[group_id])
        .expect("entries");
    assert_eq!(entries.get(&group_id).map(|logs| logs.len()), Some(1));

    // Same name again: duplicate message, nothing created, nothing logged.
    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=add&name=web"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 1);
    assert!(
        body["response"]
            .as_str()
            .expect("response")
            .contains("already exists")
    );
    assert_eq!(harness.store.list_groups_ordered().expect("list").len(), 1);
    assert_eq!(harness.audit.entry_count(), 1);
}

#[actix_web::test]
async fn add_without_permission_is_denied() {
    let harness = common::TestHarness::new();
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=add&name=web"),
        VIEWER_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 1);
    assert_eq!(body["response"], "Permission denied.");
    assert!(harness.store.list_groups_ordered().expect("list").is_empty());
}

#[actix_web::test]
async fn add_requires_a_name() {
    let harness = common::TestHarness::new();
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=add"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 1);
    assert_eq!(body["response"], "Environment group name is required.");
}

#[actix_web::test]
async fn manager_deletes_own_group_without_delete_permission() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("managed", MANAGER_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/groups?action=del&id={}",
            group_id
        )),
        MANAGER_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 0);
    assert!(harness.store.get_group(group_id).is_err());
}

#[actix_web::test]
async fn non_manager_without_permission_cannot_delete() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("managed", MANAGER_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/groups?action=del&id={}",
            group_id
        )),
        VIEWER_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 1);
    assert_eq!(body["response"], "Permission denied.");
    assert!(harness.store.get_group(group_id).is_ok());
}

#[actix_web::test]
async fn del_validates_the_id_parameter() {
    let harness = common::TestHarness::new();
    let app = test::init_service(build_test_app(harness.bundle())).await;

    // Missing id: not found page.
    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=del"),
        ADMIN_EMAIL,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Non-integer id: envelope error.
    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=del&id=abc"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rc"], 1);
    assert_eq!(body["response"], "id must be an integer.");

    // Unknown id: not found page.
    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=del&id=4242"),
        ADMIN_EMAIL,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn modify_rejects_illegal_status_without_mutating() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    for status in ["2", "enabled", ""] {
        let req = as_user(
            test::TestRequest::get().uri(&format!(
                "/admin/environment/groups?action=modify&id={}&status={}",
                group_id, status
            )),
            ADMIN_EMAIL,
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rc"], 1);
        assert_eq!(body["response"], "Argument illegal.");
        assert!(harness.store.get_group(group_id).expect("group").is_active);
    }
}

#[actix_web::test]
async fn modify_toggles_status_and_renders_the_listing() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/groups?action=modify&id={}&status=0",
            group_id
        )),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("web"));

    assert!(!harness.store.get_group(group_id).expect("group").is_active);
    let entries = harness
        .audit
        .entries_for(TargetKind::Group, &[group_id])
        .expect("entries");
    let logs = entries.get(&group_id).expect("logs");
    assert!(
        logs.iter()
            .any(|entry| entry.action == "Change env group status to false")
    );
}

#[actix_web::test]
async fn search_filters_by_case_insensitive_substring() {
    let harness = common::TestHarness::new();
    harness
        .store
        .create_group("Web Servers", ADMIN_EMAIL)
        .expect("group");
    harness
        .store
        .create_group("Databases", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups?action=search&name=web"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("Web Servers"));
    assert!(!html.contains("Databases"));
}

#[actix_web::test]
async fn listing_attaches_properties_and_history() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let property_id = harness.store.create_property("OS").expect("property");
    harness
        .store
        .replace_group_properties(group_id, &[property_id])
        .expect("link");
    harness
        .audit
        .log_action(ADMIN_EMAIL, TargetKind::Group, group_id, "Initial env group web")
        .expect("audit");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/groups"),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("OS"));
    assert!(html.contains("Initial env group web"));
}

#[actix_web::test]
async fn listing_is_available_without_identity() {
    let harness = common::TestHarness::new();
    harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = test::TestRequest::get()
        .uri("/admin/environment/groups")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
