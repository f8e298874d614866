// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use caseboard::audit::TargetKind;
use common::{ADMIN_EMAIL, VIEWER_EMAIL, as_user, build_test_app};

#[actix_web::test]
async fn page_requires_change_permission() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!("/admin/environment/group/edit?id={}", group_id)),
        VIEWER_EMAIL,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Anonymous requests are rejected the same way.
    let req = test::TestRequest::get()
        .uri(&format!("/admin/environment/group/edit?id={}", group_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn page_renders_group_and_properties() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let os = harness.store.create_property("OS").expect("property");
    harness.store.create_property("Browser").expect("property");
    harness
        .store
        .replace_group_properties(group_id, &[os])
        .expect("link");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!("/admin/environment/group/edit?id={}", group_id)),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("web"));
    assert!(html.contains("OS"));
    assert!(html.contains("Browser"));
}

#[actix_web::test]
async fn missing_or_unknown_id_is_not_found() {
    let harness = common::TestHarness::new();
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/group/edit"),
        ADMIN_EMAIL,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = as_user(
        test::TestRequest::get().uri("/admin/environment/group/edit?id=4242"),
        ADMIN_EMAIL,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn duplicate_name_blocks_the_whole_edit() {
    let harness = common::TestHarness::new();
    let first = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    harness
        .store
        .create_group("db", ADMIN_EMAIL)
        .expect("group");
    let os = harness.store.create_property("OS").expect("property");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/group/edit?id={}&action=modify&name=db&enabled=1&selected_property_ids={}",
            first, os
        )),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("Duplicated name already exists"));

    // Nothing was applied.
    let group = harness.store.get_group(first).expect("group");
    assert_eq!(group.name, "web");
    assert!(harness
        .store
        .linked_property_ids(first)
        .expect("links")
        .is_empty());
}

#[actix_web::test]
async fn modify_replaces_the_link_set() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let os = harness.store.create_property("OS").expect("property");
    let browser = harness.store.create_property("Browser").expect("property");
    let arch = harness.store.create_property("Arch").expect("property");
    harness
        .store
        .replace_group_properties(group_id, &[os, browser])
        .expect("link");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/group/edit?id={}&action=modify&name=web&enabled=1&selected_property_ids={}",
            group_id, arch
        )),
        ADMIN_EMAIL,
    )
    .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("Environment group saved successfully."));

    assert_eq!(
        harness.store.linked_property_ids(group_id).expect("links"),
        vec![arch]
    );

    let group = harness.store.get_group(group_id).expect("group");
    assert_eq!(group.modified_by.as_deref(), Some(ADMIN_EMAIL));

    let entries = harness
        .audit
        .entries_for(TargetKind::Group, &[group_id])
        .expect("entries");
    let logs = entries.get(&group_id).expect("logs");
    assert!(
        logs.iter()
            .any(|entry| entry.action == "Properties changed to Arch")
    );
}

#[actix_web::test]
async fn modify_logs_rename_with_old_and_new_name() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/group/edit?id={}&action=modify&name=frontend&enabled=1",
            group_id
        )),
        ADMIN_EMAIL,
    )
    .to_request();
    test::call_service(&app, req).await;

    assert_eq!(
        harness.store.get_group(group_id).expect("group").name,
        "frontend"
    );
    let entries = harness
        .audit
        .entries_for(TargetKind::Group, &[group_id])
        .expect("entries");
    let logs = entries.get(&group_id).expect("logs");
    assert!(
        logs.iter()
            .any(|entry| entry.action == "Modify name from web to frontend")
    );
}

#[actix_web::test]
async fn modify_without_enabled_parameter_disables_the_group() {
    let harness = common::TestHarness::new();
    let group_id = harness
        .store
        .create_group("web", ADMIN_EMAIL)
        .expect("group");
    let app = test::init_service(build_test_app(harness.bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&format!(
            "/admin/environment/group/edit?id={}&action=modify&name=web",
            group_id
        )),
        ADMIN_EMAIL,
    )
    .to_request();
    test::call_service(&app, req).await;

    let group = harness.store.get_group(group_id).expect("group");
    assert!(!group.is_active);
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
