//! # pn-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

use actix_web::{web, HttpResponse};
use pn_core::content::{require_fingerprint, sanitize_content};
use pn_core::models::{Counter, FeedTab, NewPost, PostCounters, Report, Vote, VoteKind};
use pn_core::numbering::{format_post_number, parse_post_number};
use pn_core::traits::{CounterFeed, PostRepo};
use pn_core::wire::{
    ActionResponse, ByNumberResponse, CreatePostRequest, FeedResponse, PostResponse,
    ReportRequest, ThreadResponse, VoteRequest,
};
use pn_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{validation, ApiError};

const DEFAULT_FEED_LIMIT: i64 = 50;
const MAX_FEED_LIMIT: i64 = 100;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn PostRepo>,
    pub feed: Box<dyn CounterFeed>,
}

#[derive(Debug, Deserialize)]
pub struct ByNumberQuery {
    pub n: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub tab: Option<String>,
    pub limit: Option<i64>,
}

fn parse_post_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Uuid::parse_str(id).map_err(|_| validation("invalid post id")),
        _ => Err(validation("post id is required")),
    }
}

/// Applies an increment for an action whose row is already committed.
///
/// A failure here leaves the row in place and the aggregate one short.
/// The gap is logged and the action still counts as recorded.
async fn bump_counter(data: &AppState, post_id: Uuid, counter: Counter) -> Option<PostCounters> {
    match data.repo.increment_counter(post_id, counter).await {
        Ok(counters) => {
            data.feed.publish(counters);
            Some(counters)
        }
        Err(err) => {
            log::error!(
                "{} row committed for post {} but counter update failed: {}",
                counter.column(),
                post_id,
                err
            );
            None
        }
    }
}

/// `POST /posts`: creates a top-level post or a reply.
pub async fn create_post(
    data: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let raw = body.content.ok_or_else(|| validation("content is required"))?;
    let author_proof = require_fingerprint(body.actor_proof.as_deref(), "actorProof")?;
    let content = sanitize_content(&raw)?;
    let parent_id = match body.parent_id.as_deref() {
        Some(raw_parent) => Some(
            Uuid::parse_str(raw_parent.trim()).map_err(|_| validation("invalid parent id"))?,
        ),
        None => None,
    };

    let post = data
        .repo
        .create_post(NewPost {
            author_proof,
            content,
            parent_id,
        })
        .await?;

    log::info!("post {} created (reply: {})", post.id, post.parent_id.is_some());
    Ok(HttpResponse::Created().json(PostResponse { post }))
}

/// `GET /posts/by-number?n=`: resolves a display number to a post id.
///
/// Accepts plain integers and the lettered display form (`#A1`).
pub async fn post_by_number(
    data: web::Data<AppState>,
    query: web::Query<ByNumberQuery>,
) -> Result<HttpResponse, ApiError> {
    let raw = query
        .n
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| validation("missing post number"))?;
    let number = parse_post_number(raw).ok_or_else(|| validation("invalid post number"))?;

    let total = data.repo.count_top_level().await?;
    let not_found = || ApiError(AppError::NotFound("post".into(), format_post_number(number)));
    if number > u64::try_from(total).unwrap_or(0) {
        return Err(not_found());
    }

    let offset = i64::try_from(number - 1).map_err(|_| not_found())?;
    let id = data.repo.nth_top_level(offset).await?.ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(ByNumberResponse { id, number }))
}

/// `GET /posts?tab=stroll|leaderboard&limit=`
pub async fn list_feed(
    data: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let tab = match query.tab.as_deref() {
        None | Some("stroll") => FeedTab::Stroll,
        Some("leaderboard") => FeedTab::Leaderboard,
        Some(_) => return Err(validation("tab must be stroll or leaderboard")),
    };
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

    let posts = data.repo.list_top_level(tab, limit).await?;
    let total_count = data.repo.count_top_level().await?;

    Ok(HttpResponse::Ok().json(FeedResponse { posts, total_count }))
}

/// `GET /posts/{id}`: a post and its replies, oldest reply first.
pub async fn view_thread(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_post_id(Some(path.as_str()))?;

    let post = data
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound("post".into(), id.to_string())))?;
    let replies = data.repo.list_replies(id).await?;

    Ok(HttpResponse::Ok().json(ThreadResponse { post, replies }))
}

/// `POST /votes`: records one vote per (post, fingerprint).
///
/// The insert runs first; its uniqueness constraint decides "already voted".
/// Counters are only touched once the insert has committed.
pub async fn submit_vote(
    data: web::Data<AppState>,
    body: web::Json<VoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let post_id = parse_post_id(body.post_id.as_deref())?;
    let kind: VoteKind = body
        .vote_kind
        .as_deref()
        .ok_or_else(|| validation("vote kind must be up or down"))?
        .parse()?;
    let fingerprint = require_fingerprint(body.fingerprint.as_deref(), "fingerprint")?;

    let vote = Vote::new(post_id, fingerprint, kind);
    if let Err(err) = data.repo.insert_vote(&vote).await {
        if matches!(err, AppError::Conflict(_)) {
            log::info!("duplicate vote on post {}", post_id);
            return Err(ApiError(AppError::Conflict("already voted".into())));
        }
        return Err(err.into());
    }

    let counters = bump_counter(&data, post_id, kind.counter()).await;
    Ok(HttpResponse::Ok().json(ActionResponse {
        action: "added".into(),
        counters,
    }))
}

/// `POST /reports`: same shape as votes, with its own uniqueness dimension.
pub async fn submit_report(
    data: web::Data<AppState>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let post_id = parse_post_id(body.post_id.as_deref())?;
    let fingerprint = require_fingerprint(body.fingerprint.as_deref(), "fingerprint")?;

    let report = Report::new(post_id, fingerprint);
    if let Err(err) = data.repo.insert_report(&report).await {
        if matches!(err, AppError::Conflict(_)) {
            log::info!("duplicate report on post {}", post_id);
            return Err(ApiError(AppError::Conflict("already reported".into())));
        }
        return Err(err.into());
    }

    let counters = bump_counter(&data, post_id, Counter::Reports).await;
    log::warn!("post {} reported", post_id);
    Ok(HttpResponse::Ok().json(ActionResponse {
        action: "reported".into(),
        counters,
    }))
}

/// Liveness probe.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_id_parsing() {
        let id = Uuid::now_v7();
        assert_eq!(parse_post_id(Some(&id.to_string())).unwrap(), id);
        assert!(parse_post_id(None).is_err());
        assert!(parse_post_id(Some("  ")).is_err());
        assert!(parse_post_id(Some("not-a-uuid")).is_err());
    }
}
