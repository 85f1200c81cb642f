//! HTTP tests for posting, threads, feeds and number lookup.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use common::{app, create_post, proof, state};

#[actix_web::test]
async fn stored_content_is_escaped_and_capped() {
    let (state, _) = state().await;
    let app = app(state).await;

    let post = create_post(&app, "  <b>hi</b>  ", None).await;
    assert_eq!(post["content"], "&lt;b&gt;hi&lt;/b&gt;");
    assert!(post["parentId"].is_null());
    assert_eq!(post["upvotes"], 0);

    let long = "y".repeat(700);
    let post = create_post(&app, &long, None).await;
    assert_eq!(post["content"].as_str().unwrap().chars().count(), 500);
}

#[actix_web::test]
async fn rejects_invalid_post_bodies() {
    let (state, _) = state().await;
    let app = app(state).await;

    let cases = [
        json!({ "content": "   \n ", "actorProof": proof('a') }),
        json!({ "actorProof": proof('a') }),
        json!({ "content": "hello" }),
        json!({ "content": "hello", "actorProof": "abc" }),
        json!({ "content": "hello", "actorProof": proof('a'), "parentId": "nope" }),
        json!({ "content": 42, "actorProof": proof('a') }),
    ];
    for body in cases {
        let req = test::TestRequest::post().uri("/posts").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body = {body}");
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].is_string());
    }
}

#[actix_web::test]
async fn reply_needs_existing_parent() {
    let (state, _) = state().await;
    let app = app(state).await;

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({
            "content": "orphan",
            "parentId": uuid::Uuid::now_v7().to_string(),
            "actorProof": proof('a'),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn thread_lists_replies_in_order() {
    let (state, _) = state().await;
    let app = app(state).await;

    let op = create_post(&app, "op", None).await;
    let op_id = op["id"].as_str().unwrap();
    create_post(&app, "first", Some(op_id)).await;
    create_post(&app, "second", Some(op_id)).await;

    let req = test::TestRequest::get().uri(&format!("/posts/{op_id}")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["content"], "op");
    let replies: Vec<_> = body["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(replies, vec!["first", "second"]);

    let missing = uuid::Uuid::now_v7();
    let req = test::TestRequest::get().uri(&format!("/posts/{missing}")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/posts/garbage").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn feed_counts_top_level_only() {
    let (state, _) = state().await;
    let app = app(state).await;

    let first = create_post(&app, "one", None).await;
    create_post(&app, "two", None).await;
    create_post(&app, "reply", first["id"].as_str()).await;

    let req = test::TestRequest::get().uri("/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["posts"][0]["content"], "two");
    assert_eq!(body["posts"][1]["content"], "one");

    let req = test::TestRequest::get().uri("/posts?tab=leaderboard&limit=1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get().uri("/posts?tab=hot").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn by_number_resolves_in_creation_order() {
    let (state, _) = state().await;
    let app = app(state).await;

    let mut ids = Vec::new();
    for content in ["a", "b", "c"] {
        let post = create_post(&app, content, None).await;
        ids.push(post["id"].as_str().unwrap().to_string());
    }
    create_post(&app, "reply", Some(&ids[0])).await;

    let req = test::TestRequest::get().uri("/posts/by-number?n=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], ids[1]);
    assert_eq!(body["number"], 2);

    let req = test::TestRequest::get().uri("/posts/by-number?n=%233").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], ids[2]);
}

#[actix_web::test]
async fn by_number_past_the_end_is_not_found() {
    let (state, _) = state().await;
    let app = app(state).await;
    for content in ["a", "b", "c"] {
        create_post(&app, content, None).await;
    }

    let req = test::TestRequest::get().uri("/posts/by-number?n=5").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/posts/by-number?n=A1").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn by_number_rejects_bad_input() {
    let (state, _) = state().await;
    let app = app(state).await;

    for uri in ["/posts/by-number", "/posts/by-number?n=", "/posts/by-number?n=0", "/posts/by-number?n=-3", "/posts/by-number?n=abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "uri = {uri}");
    }
}

#[actix_web::test]
async fn health_is_ok() {
    let (state, _) = state().await;
    let app = app(state).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
