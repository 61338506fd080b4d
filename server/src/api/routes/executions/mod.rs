//! Execution API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::extractors::{ExecutionPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::domain::executions::{
    ExecutionQueryRequest, ExecutionView, FilterCompiler, Page, PageAssembler, RestVariable,
    SortRequest, get_execution as lookup_execution, set_execution_variables,
};

use types::ExecutionPageQuery;

/// Shared state for execution endpoints
#[derive(Clone)]
pub struct ExecutionsApiState {
    pub database: Arc<SqliteService>,
    pub compiler: FilterCompiler,
    pub assembler: Arc<PageAssembler>,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Build execution routes (nested under `/api/v1`)
pub fn routes(state: ExecutionsApiState) -> Router<()> {
    Router::new()
        .route("/query/executions", post(query_executions))
        .route("/runtime/executions/{execution_id}", get(get_execution))
        .route(
            "/runtime/executions/{execution_id}/variables",
            put(update_variables),
        )
        .with_state(state)
}

/// Query executions with a filter body, one page at a time
#[utoipa::path(
    post,
    path = "/api/v1/query/executions",
    tag = "executions",
    params(
        ("start" = Option<u64>, Query, description = "Offset of the first item (default 0)"),
        ("size" = Option<u32>, Query, description = "Page size (default 10)"),
        ("sort" = Option<String>, Query, description = "processDefinitionId, processDefinitionKey or processInstanceId"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    request_body = ExecutionQueryRequest,
    responses(
        (status = 200, description = "Matching executions", body = Page<ExecutionView>),
        (status = 400, description = "Invalid filter, sort or paging")
    )
)]
pub async fn query_executions(
    State(state): State<ExecutionsApiState>,
    ValidatedQuery(params): ValidatedQuery<ExecutionPageQuery>,
    ValidatedJson(body): ValidatedJson<ExecutionQueryRequest>,
) -> Result<Json<Page<ExecutionView>>, ApiError> {
    let size = params.size.unwrap_or(state.default_page_size);
    if size > state.max_page_size {
        return Err(ApiError::bad_request(
            "INVALID_PAGE_SIZE",
            format!("Page size must be between 1 and {}", state.max_page_size),
        ));
    }

    let query = state.compiler.compile(&body)?;
    let sort = SortRequest::new(params.sort, params.order, params.start, size);
    let page = state
        .assembler
        .assemble(&state.database, &query, &sort)
        .await?;

    Ok(Json(page))
}

/// Get a single execution
#[utoipa::path(
    get,
    path = "/api/v1/runtime/executions/{execution_id}",
    tag = "executions",
    params(
        ("execution_id" = String, Path, description = "Execution ID")
    ),
    responses(
        (status = 200, description = "Execution details", body = ExecutionView),
        (status = 404, description = "Execution not found")
    )
)]
pub async fn get_execution(
    State(state): State<ExecutionsApiState>,
    path: ExecutionPath,
) -> Result<Json<ExecutionView>, ApiError> {
    let row = lookup_execution(&state.database, Some(&path.execution_id)).await?;
    Ok(Json(ExecutionView::from(row)))
}

/// Create or update local variables of an execution
#[utoipa::path(
    put,
    path = "/api/v1/runtime/executions/{execution_id}/variables",
    tag = "executions",
    params(
        ("execution_id" = String, Path, description = "Execution ID")
    ),
    request_body = Vec<RestVariable>,
    responses(
        (status = 201, description = "Stored variables", body = Vec<RestVariable>),
        (status = 400, description = "Invalid variables"),
        (status = 404, description = "Execution not found")
    )
)]
pub async fn update_variables(
    State(state): State<ExecutionsApiState>,
    path: ExecutionPath,
    payload: Result<Json<Vec<RestVariable>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<RestVariable>>), ApiError> {
    let Json(variables) =
        payload.map_err(|e| ApiError::bad_request("JSON_PARSE_ERROR", e.body_text()))?;

    let stored = set_execution_variables(
        &state.database,
        state.compiler.resolver(),
        Some(&path.execution_id),
        &variables,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}
