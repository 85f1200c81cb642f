//! HTTP tests for store failures, using a repo that fails on demand.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use async_trait::async_trait;
use pn_api::handlers::AppState;
use pn_api::realtime::BroadcastCounterFeed;
use pn_core::error::{AppError, Result};
use pn_core::models::{Counter, FeedTab, NewPost, Post, PostCounters, Report, Vote};
use pn_core::traits::PostRepo;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{app, proof};

/// Accepts every insert, then fails wherever it was told to.
#[derive(Default)]
struct FailingRepo {
    insert_error: Option<AppError>,
    increment_error: Option<AppError>,
}

impl FailingRepo {
    fn check_insert(&self) -> Result<()> {
        match &self.insert_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostRepo for FailingRepo {
    async fn create_post(&self, _post: NewPost) -> Result<Post> {
        Err(AppError::Store("database is locked".into()))
    }

    async fn get_post(&self, _id: Uuid) -> Result<Option<Post>> {
        Err(AppError::Store("database is locked".into()))
    }

    async fn list_replies(&self, _parent_id: Uuid) -> Result<Vec<Post>> {
        Ok(Vec::new())
    }

    async fn list_top_level(&self, _tab: FeedTab, _limit: i64) -> Result<Vec<Post>> {
        Ok(Vec::new())
    }

    async fn count_top_level(&self) -> Result<i64> {
        Ok(0)
    }

    async fn nth_top_level(&self, _offset: i64) -> Result<Option<Uuid>> {
        Ok(None)
    }

    async fn insert_vote(&self, _vote: &Vote) -> Result<()> {
        self.check_insert()
    }

    async fn insert_report(&self, _report: &Report) -> Result<()> {
        self.check_insert()
    }

    async fn increment_counter(&self, post_id: Uuid, _counter: Counter) -> Result<PostCounters> {
        match &self.increment_error {
            Some(err) => Err(err.clone()),
            None => Ok(PostCounters {
                post_id,
                upvotes: 1,
                downvotes: 0,
                reports: 0,
            }),
        }
    }
}

fn state_with(repo: FailingRepo) -> (web::Data<AppState>, BroadcastCounterFeed) {
    let feed = BroadcastCounterFeed::new(8);
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        feed: Box::new(feed.clone()),
    });
    (state, feed)
}

fn vote_request(post_id: Uuid) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/votes")
        .set_json(json!({ "postId": post_id.to_string(), "voteKind": "up", "fingerprint": proof('5') }))
        .to_request()
}

fn report_request(post_id: Uuid) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/reports")
        .set_json(json!({ "postId": post_id.to_string(), "fingerprint": proof('6') }))
        .to_request()
}

#[actix_web::test]
async fn failed_increment_still_records_the_vote() {
    let (state, feed) = state_with(FailingRepo {
        increment_error: Some(AppError::Store("disk I/O error".into())),
        ..FailingRepo::default()
    });
    let mut updates = feed.subscribe();
    let app = app(state).await;

    let resp = test::call_service(&app, vote_request(Uuid::now_v7())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["action"], "added");
    assert!(body["counters"].is_null());

    let resp = test::call_service(&app, report_request(Uuid::now_v7())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["action"], "reported");
    assert!(body["counters"].is_null());

    // nothing to publish without fresh counters
    assert!(updates.try_recv().is_err());
}

#[actix_web::test]
async fn healthy_increment_publishes_counters() {
    let (state, feed) = state_with(FailingRepo::default());
    let mut updates = feed.subscribe();
    let app = app(state).await;
    let post_id = Uuid::now_v7();

    let resp = test::call_service(&app, vote_request(post_id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["counters"]["upvotes"], 1);
    assert_eq!(updates.try_recv().unwrap().post_id, post_id);
}

#[actix_web::test]
async fn store_errors_return_a_generic_500() {
    let (state, _) = state_with(FailingRepo {
        insert_error: Some(AppError::Store("disk I/O secret at /var/db".into())),
        ..FailingRepo::default()
    });
    let app = app(state).await;

    for req in [vote_request(Uuid::now_v7()), report_request(Uuid::now_v7())] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "internal server error" }));
    }

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", Uuid::now_v7()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(!body.to_string().contains("locked"));
}
