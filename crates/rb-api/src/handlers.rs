//! # rb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the BoardService.
//! Password checks answer 200 with a literal body either way; callers read the
//! body, not the status, to tell success from a mismatch.
//! DELETE and PUT bodies are optional; a missing one names no record.

use actix_web::{http::header::ContentType, web, HttpResponse, Responder};
use rb_core::models::{BumpedThread, CreatedThread, DeleteOutcome, REPORTED};
use rb_core::{BoardService, NewPost};
use serde::Deserialize;

use crate::error::ApiError;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub service: BoardService,
}

#[derive(Debug, Deserialize)]
pub struct NewThreadBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewReplyBody {
    pub thread_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

/// Body of thread DELETE and PUT.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadRef {
    pub thread_id: Option<String>,
    #[serde(default)]
    pub delete_password: String,
}

/// Body of reply DELETE and PUT.
#[derive(Debug, Default, Deserialize)]
pub struct ReplyRef {
    pub thread_id: Option<String>,
    pub reply_id: Option<String>,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    pub thread_id: Option<String>,
}

fn plain(body: &'static str) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::plaintext()).body(body)
}

fn outcome(result: DeleteOutcome) -> HttpResponse {
    plain(result.as_str())
}

fn or_empty<T: Default>(body: Option<web::Json<T>>) -> T {
    body.map(web::Json::into_inner).unwrap_or_default()
}

/// POST /api/threads/{board}
pub async fn create_thread(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NewThreadBody>,
) -> Result<HttpResponse, ApiError> {
    let board = path.into_inner();
    let body = body.into_inner();
    let post = NewPost {
        text: body.text,
        delete_password: body.delete_password,
    };

    let thread = data
        .service
        .create_thread(&board, post)
        .await
        .map_err(ApiError::during("Unable to create thread"))?;

    Ok(HttpResponse::Ok().json(CreatedThread::from(thread)))
}

/// GET /api/threads/{board}
pub async fn list_threads(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let threads = data
        .service
        .list_threads(&path.into_inner())
        .await
        .map_err(ApiError::during("Unable to retrieve threads"))?;

    Ok(HttpResponse::Ok().json(threads))
}

/// DELETE /api/threads/{board}
pub async fn delete_thread(
    data: web::Data<AppState>,
    body: Option<web::Json<ThreadRef>>,
) -> Result<HttpResponse, ApiError> {
    let body = or_empty(body);
    let result = data
        .service
        .delete_thread(body.thread_id.as_deref(), &body.delete_password)
        .await
        .map_err(ApiError::during("Unable to delete thread"))?;

    Ok(outcome(result))
}

/// PUT /api/threads/{board}
pub async fn report_thread(
    data: web::Data<AppState>,
    body: Option<web::Json<ThreadRef>>,
) -> Result<HttpResponse, ApiError> {
    let body = or_empty(body);
    data.service
        .report_thread(body.thread_id.as_deref())
        .await
        .map_err(ApiError::during("Unable to report thread"))?;

    Ok(plain(REPORTED))
}

/// POST /api/replies/{board}
pub async fn create_reply(
    data: web::Data<AppState>,
    body: web::Json<NewReplyBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let post = NewPost {
        text: body.text,
        delete_password: body.delete_password,
    };

    let thread = data
        .service
        .append_reply(body.thread_id.as_deref(), post)
        .await
        .map_err(ApiError::during("Unable to add reply"))?;

    Ok(HttpResponse::Ok().json(BumpedThread::from(thread)))
}

/// GET /api/replies/{board}?thread_id=...
pub async fn view_thread(
    data: web::Data<AppState>,
    query: web::Query<ThreadQuery>,
) -> Result<HttpResponse, ApiError> {
    let thread = data
        .service
        .get_thread(query.thread_id.as_deref())
        .await
        .map_err(ApiError::during("Unable to retrieve thread"))?;

    Ok(HttpResponse::Ok().json(thread))
}

/// DELETE /api/replies/{board}
pub async fn delete_reply(
    data: web::Data<AppState>,
    body: Option<web::Json<ReplyRef>>,
) -> Result<HttpResponse, ApiError> {
    let body = or_empty(body);
    let result = data
        .service
        .delete_reply(
            body.thread_id.as_deref(),
            body.reply_id.as_deref(),
            &body.delete_password,
        )
        .await
        .map_err(ApiError::during("Unable to delete reply"))?;

    Ok(outcome(result))
}

/// PUT /api/replies/{board}
pub async fn report_reply(
    data: web::Data<AppState>,
    body: Option<web::Json<ReplyRef>>,
) -> Result<HttpResponse, ApiError> {
    let body = or_empty(body);
    data.service
        .report_reply(body.thread_id.as_deref(), body.reply_id.as_deref())
        .await
        .map_err(ApiError::during("Unable to report reply"))?;

    Ok(plain(REPORTED))
}

/// A simple homepage handler for "/"
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Welcome to Rusty-Board! Try GET /api/threads/test-board")
}
