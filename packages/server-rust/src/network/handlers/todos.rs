//! `/api/todos` route handlers.
//!
//! Each handler turns the HTTP request into one [`Operation`], dispatches it
//! under the translator, and renders the response. Input that cannot even be
//! parsed (bad JSON, bad query string, malformed id) is reported as a
//! validation problem on the offending part without reaching the dispatcher.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_core::messages::{CreateTodoPayload, CreatedView, ListTodosQuery, UpdateTodoPayload};
use todo_core::{RequestContext, TodoId};

use super::{AppState, CallContext, ProblemResponse};
use crate::service::{Operation, OperationContext, OperationError, OperationResponse};

type HandlerResult = Result<Response, ProblemResponse>;

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// Builds the call's context, dispatches the operation and translates any
/// error. The deadline is capped at the configured request timeout. The
/// call's token is cancelled if this future is dropped, which is
/// what happens when the client disconnects.
async fn execute<F>(
    state: &AppState,
    request: &RequestContext,
    build: F,
) -> Result<OperationResponse, ProblemResponse>
where
    F: FnOnce(OperationContext) -> Operation,
{
    let _in_flight = state.shutdown.in_flight_guard();
    let request_timeout_ms =
        u64::try_from(state.config.request_timeout.as_millis()).unwrap_or(u64::MAX);
    let ctx = state
        .contexts
        .make_ctx(request.clone())
        .with_timeout_cap(request_timeout_ms)
        .with_cancellation(state.shutdown.child_token());
    let _cancel_on_drop = ctx.cancellation.clone().drop_guard();

    // Nothing is written before this returns, so every error is translated;
    // the `ResponseState::Started` path is unreachable over this transport.
    state
        .translator
        .run(request, state.dispatcher.dispatch(build(ctx)))
        .await
        .map_err(ProblemResponse)
}

fn reject(
    state: &AppState,
    request: &RequestContext,
    field: &str,
    message: impl Into<String>,
) -> ProblemResponse {
    let err = OperationError::invalid(field, message);
    ProblemResponse(state.translator.translate(&err, request))
}

fn unexpected(
    state: &AppState,
    request: &RequestContext,
    response: &OperationResponse,
) -> ProblemResponse {
    let err = OperationError::Internal(anyhow::anyhow!(
        "handler returned an unexpected response: {response:?}"
    ));
    ProblemResponse(state.translator.translate(&err, request))
}

fn parse_id(
    state: &AppState,
    request: &RequestContext,
    raw: Result<Path<String>, PathRejection>,
) -> Result<TodoId, ProblemResponse> {
    let Path(raw) = raw.map_err(|rejection| reject(state, request, "id", rejection.body_text()))?;
    raw.parse::<TodoId>()
        .map_err(|_| reject(state, request, "id", format!("The value '{raw}' is not valid.")))
}

fn no_content(
    state: &AppState,
    request: &RequestContext,
    response: OperationResponse,
) -> HandlerResult {
    match response {
        OperationResponse::Empty => Ok(StatusCode::NO_CONTENT.into_response()),
        other => Err(unexpected(state, request, &other)),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/todos`
pub async fn create_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    body: Result<Json<CreateTodoPayload>, JsonRejection>,
) -> HandlerResult {
    let Json(payload) =
        body.map_err(|rejection| reject(&state, &request, "body", rejection.body_text()))?;

    let response = execute(&state, &request, |ctx| Operation::CreateTodo {
        ctx,
        title: payload.title,
    })
    .await?;

    match response {
        OperationResponse::Created { id } => Ok((
            StatusCode::CREATED,
            [(LOCATION, format!("/api/todos/{id}"))],
            Json(CreatedView { id }),
        )
            .into_response()),
        other => Err(unexpected(&state, &request, &other)),
    }
}

/// `GET /api/todos?page=&pageSize=`
pub async fn list_todos(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) =
        query.map_err(|rejection| reject(&state, &request, "query", rejection.body_text()))?;

    let response = execute(&state, &request, |ctx| Operation::ListTodos {
        ctx,
        page: query.page,
        page_size: query.page_size,
    })
    .await?;

    match response {
        OperationResponse::Page(page) => Ok(Json(page).into_response()),
        other => Err(unexpected(&state, &request, &other)),
    }
}

/// `GET /api/todos/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = parse_id(&state, &request, id)?;

    match execute(&state, &request, |ctx| Operation::GetTodo { ctx, id }).await? {
        OperationResponse::Todo(view) => Ok(Json(*view).into_response()),
        other => Err(unexpected(&state, &request, &other)),
    }
}

/// `PUT /api/todos/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateTodoPayload>, JsonRejection>,
) -> HandlerResult {
    let id = parse_id(&state, &request, id)?;
    let Json(payload) =
        body.map_err(|rejection| reject(&state, &request, "body", rejection.body_text()))?;

    let response = execute(&state, &request, |ctx| Operation::UpdateTodo {
        ctx,
        id,
        title: payload.title,
    })
    .await?;
    no_content(&state, &request, response)
}

/// `POST /api/todos/{id}/complete`
pub async fn complete_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = parse_id(&state, &request, id)?;
    let response = execute(&state, &request, |ctx| Operation::CompleteTodo { ctx, id }).await?;
    no_content(&state, &request, response)
}

/// `POST /api/todos/{id}/reopen`
pub async fn reopen_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = parse_id(&state, &request, id)?;
    let response = execute(&state, &request, |ctx| Operation::ReopenTodo { ctx, id }).await?;
    no_content(&state, &request, response)
}

/// `DELETE /api/todos/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    CallContext(request): CallContext,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = parse_id(&state, &request, id)?;
    let response = execute(&state, &request, |ctx| Operation::DeleteTodo { ctx, id }).await?;
    no_content(&state, &request, response)
}
