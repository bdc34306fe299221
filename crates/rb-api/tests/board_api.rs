//! End-to-end tests of the HTTP surface against an in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use rb_api::{configure_routes, AppState};
use rb_auth_simple::PlaintextAuthProvider;
use rb_core::{BoardService, ThreadRepo};
use rb_db_sqlite::SqliteThreadRepo;
use serde_json::{json, Value};

const BOARD: &str = "test-board";

macro_rules! board_app {
    () => {{
        let repo = SqliteThreadRepo::connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        let service = BoardService::new(Arc::new(repo), Arc::new(PlaintextAuthProvider));
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { service }))
                .configure(configure_routes),
        )
        .await
    }};
}

fn new_thread(text: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "text": text, "delete_password": password }))
}

fn new_reply(thread_id: &str, text: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/replies/{BOARD}"))
        .set_json(json!({ "thread_id": thread_id, "text": text, "delete_password": password }))
}

fn view_thread(thread_id: &str) -> test::TestRequest {
    test::TestRequest::get().uri(&format!("/api/replies/{BOARD}?thread_id={thread_id}"))
}

fn id_of(body: &Value) -> String {
    body["_id"].as_str().expect("_id").to_string()
}

#[actix_web::test]
async fn creating_a_thread_echoes_the_record() {
    let app = board_app!();

    let resp = test::call_service(&app, new_thread("Another Test Thread", "password123").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert!(body["_id"].is_string());
    assert_eq!(body["text"], "Another Test Thread");
    assert_eq!(body["delete_password"], "password123");
    assert_eq!(body["reported"], false);
    assert_eq!(body["created_on"], body["bumped_on"]);
    assert_eq!(body["replies"], json!([]));
}

#[actix_web::test]
async fn listing_caps_threads_and_replies() {
    let app = board_app!();

    let mut ids = Vec::new();
    for i in 0..12 {
        let body: Value =
            test::call_and_read_body_json(&app, new_thread(&format!("thread {i}"), "pw").to_request()).await;
        ids.push(id_of(&body));
    }
    for i in 0..4 {
        let req = new_reply(&ids[0], &format!("reply {i}"), "rp").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get().uri(&format!("/api/threads/{BOARD}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Value> = test::read_body_json(resp).await;

    assert_eq!(listed.len(), 10);
    assert_eq!(id_of(&listed[0]), ids[0], "bumped thread sorts first");
    assert_eq!(listed[1]["text"], "thread 11");

    let replies = listed[0]["replies"].as_array().unwrap();
    let texts: Vec<_> = replies.iter().map(|r| r["text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["reply 1", "reply 2", "reply 3"]);

    for thread in &listed {
        assert!(thread["replies"].as_array().unwrap().len() <= 3);
        assert!(thread.get("delete_password").is_none());
        assert!(thread.get("reported").is_none());
        for reply in thread["replies"].as_array().unwrap() {
            assert!(reply.get("delete_password").is_none());
            assert!(reply.get("reported").is_none());
        }
    }
}

#[actix_web::test]
async fn listing_is_scoped_to_the_board() {
    let app = board_app!();
    test::call_service(&app, new_thread("here", "pw").to_request()).await;

    let req = test::TestRequest::get().uri("/api/threads/elsewhere").to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn deleting_a_thread_checks_the_password() {
    let app = board_app!();
    let created: Value = test::call_and_read_body_json(&app, new_thread("doomed", "password123").to_request()).await;
    let id = id_of(&created);

    let wrong = test::TestRequest::delete()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": id, "delete_password": "wrong_password" }))
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "incorrect password");

    let resp = test::call_service(&app, view_thread(&id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK, "thread survives a wrong password");

    let right = test::TestRequest::delete()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": id, "delete_password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, right).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "success");

    let resp = test::call_service(&app, view_thread(&id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Thread not found" }));
}

#[actix_web::test]
async fn deleting_an_unknown_thread_is_not_found() {
    let app = board_app!();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": "0190a1b2-0000-7000-8000-000000000000", "delete_password": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reporting_a_thread_is_idempotent() {
    let app = board_app!();
    let created: Value = test::call_and_read_body_json(&app, new_thread("Thread to report", "pw").to_request()).await;
    let id = id_of(&created);

    for _ in 0..2 {
        let req = test::TestRequest::put()
            .uri(&format!("/api/threads/{BOARD}"))
            .set_json(json!({ "thread_id": id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "reported");
    }
}

#[actix_web::test]
async fn reporting_an_unknown_thread_is_a_silent_no_op() {
    let app = board_app!();

    for body in [
        json!({ "thread_id": "0190a1b2-0000-7000-8000-000000000000" }),
        json!({}),
    ] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/threads/{BOARD}"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "reported");
    }

    let req = test::TestRequest::get().uri(&format!("/api/threads/{BOARD}")).to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn malformed_thread_ids_fail_generically() {
    let app = board_app!();

    let req = test::TestRequest::put()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": "not-an-id" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unable to report thread" }));

    let resp = test::call_service(&app, view_thread("not-an-id").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unable to retrieve thread" }));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": "", "delete_password": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn bodiless_delete_and_report_name_no_record() {
    let app = board_app!();

    let req = test::TestRequest::delete().uri(&format!("/api/threads/{BOARD}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Thread not found" }));

    let req = test::TestRequest::put().uri(&format!("/api/threads/{BOARD}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "reported");

    let req = test::TestRequest::delete().uri(&format!("/api/replies/{BOARD}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn concurrent_reply_and_report_both_stick() {
    let repo = Arc::new(SqliteThreadRepo::connect("sqlite::memory:").await.expect("in-memory store"));
    let service = BoardService::new(repo.clone(), Arc::new(PlaintextAuthProvider));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState { service }))
            .configure(configure_routes),
    )
    .await;
    let created: Value = test::call_and_read_body_json(&app, new_thread("busy", "pw").to_request()).await;
    let id = id_of(&created);

    let report = test::TestRequest::put()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "thread_id": id }))
        .to_request();
    let (first, reported, second) = tokio::join!(
        test::call_service(&app, new_reply(&id, "first", "a").to_request()),
        test::call_service(&app, report),
        test::call_service(&app, new_reply(&id, "second", "b").to_request()),
    );
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(reported.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let stored = repo.list_threads(BOARD, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].reported);
    let mut texts: Vec<_> = stored[0].replies.iter().map(|r| r.text.as_str()).collect();
    texts.sort();
    assert_eq!(texts, ["first", "second"]);
}

#[actix_web::test]
async fn replying_bumps_the_thread() {
    let app = board_app!();
    let created: Value = test::call_and_read_body_json(&app, new_thread("op", "pw").to_request()).await;
    let id = id_of(&created);

    let resp = test::call_service(&app, new_reply(&id, "This is a reply to the test thread", "replypass").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(id_of(&body), id);
    let replies = body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["text"], "This is a reply to the test thread");
    assert_eq!(body["bumped_on"], replies[0]["created_on"]);
    assert_ne!(body["bumped_on"], body["created_on"]);
    // The write response carries raw reply records.
    assert_eq!(replies[0]["delete_password"], "replypass");
    assert_eq!(replies[0]["reported"], false);
}

#[actix_web::test]
async fn replying_to_an_unknown_thread_is_not_found() {
    let app = board_app!();
    let resp = test::call_service(
        &app,
        new_reply("0190a1b2-0000-7000-8000-000000000000", "orphan", "pw").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Thread not found");
}

#[actix_web::test]
async fn missing_required_fields_fail_generically() {
    let app = board_app!();

    let req = test::TestRequest::post()
        .uri(&format!("/api/threads/{BOARD}"))
        .set_json(json!({ "delete_password": "pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unable to create thread" }));

    let created: Value = test::call_and_read_body_json(&app, new_thread("op", "pw").to_request()).await;
    let resp = test::call_service(&app, new_reply(&id_of(&created), "", "pw").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unable to add reply");
}

#[actix_web::test]
async fn unreadable_body_fails_generically() {
    let app = board_app!();
    let req = test::TestRequest::post()
        .uri(&format!("/api/threads/{BOARD}"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unable to create thread");
}

#[actix_web::test]
async fn deleting_a_reply_is_soft() {
    let app = board_app!();
    let created: Value = test::call_and_read_body_json(&app, new_thread("op", "pw").to_request()).await;
    let id = id_of(&created);
    let bumped: Value =
        test::call_and_read_body_json(&app, new_reply(&id, "Reply to Delete", "replypass").to_request()).await;
    let reply_id = id_of(&bumped["replies"][0]);

    let delete = |password: &str| {
        test::TestRequest::delete()
            .uri(&format!("/api/replies/{BOARD}"))
            .set_json(json!({ "thread_id": id, "reply_id": reply_id, "delete_password": password }))
            .to_request()
    };

    let resp = test::call_service(&app, delete("wrongpass")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "incorrect password");
    let thread: Value = test::call_and_read_body_json(&app, view_thread(&id).to_request()).await;
    assert_eq!(thread["replies"][0]["text"], "Reply to Delete");

    let resp = test::call_service(&app, delete("replypass")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "success");
    let thread: Value = test::call_and_read_body_json(&app, view_thread(&id).to_request()).await;
    let replies = thread["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["text"], "[deleted]");
    assert_eq!(id_of(&replies[0]), reply_id);
}

#[actix_web::test]
async fn reporting_a_reply() {
    let app = board_app!();
    let created: Value = test::call_and_read_body_json(&app, new_thread("op", "pw").to_request()).await;
    let id = id_of(&created);
    let bumped: Value =
        test::call_and_read_body_json(&app, new_reply(&id, "Another Reply to Report", "replypass2").to_request()).await;
    let reply_id = id_of(&bumped["replies"][0]);

    for _ in 0..2 {
        let req = test::TestRequest::put()
            .uri(&format!("/api/replies/{BOARD}"))
            .set_json(json!({ "thread_id": id, "reply_id": reply_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "reported");
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/replies/{BOARD}"))
        .set_json(json!({ "thread_id": id, "reply_id": "0190a1b2-0000-7000-8000-000000000000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Reply not found" }));
}

#[actix_web::test]
async fn thread_reply_round_trip() {
    let app = board_app!();

    let resp = test::call_service(&app, new_thread("A", "p").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    let id = id_of(&created);

    let resp = test::call_service(&app, new_reply(&id, "B", "q").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bumped: Value = test::read_body_json(resp).await;
    assert_eq!(bumped["replies"].as_array().unwrap().len(), 1);
    assert_eq!(bumped["replies"][0]["text"], "B");

    let resp = test::call_service(&app, view_thread(&id).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let thread: Value = test::read_body_json(resp).await;
    let replies = thread["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["text"], "B");
    assert!(replies[0].get("delete_password").is_none());
    assert!(thread.get("delete_password").is_none());
}

#[actix_web::test]
async fn viewing_without_thread_id_is_not_found() {
    let app = board_app!();
    let req = test::TestRequest::get().uri(&format!("/api/replies/{BOARD}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
