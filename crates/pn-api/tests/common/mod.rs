//! Shared fixtures for the HTTP tests: a fresh in-memory store per test.

#![allow(dead_code)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use pn_api::configure_routes;
use pn_api::handlers::AppState;
use pn_api::realtime::BroadcastCounterFeed;
use pn_db_sqlite::SqlitePostRepo;
use serde_json::{json, Value};

pub async fn state() -> (web::Data<AppState>, BroadcastCounterFeed) {
    let repo = SqlitePostRepo::new("sqlite::memory:").await.unwrap();
    let feed = BroadcastCounterFeed::new(64);
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        feed: Box::new(feed.clone()),
    });
    (state, feed)
}

pub async fn app(
    state: web::Data<AppState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(App::new().app_data(state).configure(configure_routes)).await
}

pub fn proof(seed: char) -> String {
    seed.to_string().repeat(64)
}

pub async fn create_post<S>(app: &S, content: &str, parent: Option<&str>) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({ "content": content, "parentId": parent, "actorProof": proof('a') }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    body["post"].clone()
}

pub async fn get_post<S>(app: &S, id: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get().uri(&format!("/posts/{id}")).to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    body["post"].clone()
}
