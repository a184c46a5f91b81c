//! Program API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use link_management::models::ProgramWithRelations;

use crate::{
    dto::{ApiResponse, ProgramQuery},
    error::ApiError,
    middleware::WorkspaceContext,
    state::AppState,
};

/// 获取 Program
///
/// GET /api/programs/{id}?includeDiscounts=true&includeDefaultReward=true
#[instrument(skip(state, ctx), fields(workspace_id = %ctx.workspace_id()))]
pub async fn get_program(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
    Path(program_id): Path<String>,
    Query(query): Query<ProgramQuery>,
) -> Result<Json<ApiResponse<ProgramWithRelations>>, ApiError> {
    let program = state
        .programs
        .get_program_or_throw(ctx.workspace_id(), &program_id, query.into())
        .await?;

    Ok(Json(ApiResponse::success(program)))
}
