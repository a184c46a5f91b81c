//! 短链 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use link_management::service::AbTestOutcome;

use crate::{dto::ApiResponse, error::ApiError, middleware::WorkspaceContext, state::AppState};

/// 立即完成短链的 A/B 测试
///
/// POST /api/links/{id}/complete-ab-test
#[instrument(skip(state, ctx), fields(workspace_id = %ctx.workspace_id()))]
pub async fn complete_ab_test(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
    Path(link_id): Path<String>,
) -> Result<Json<ApiResponse<AbTestOutcome>>, ApiError> {
    let outcome = state
        .ab_tests
        .complete_ab_test_by_id(ctx.workspace_id(), &link_id)
        .await?;

    info!(link_id = %link_id, outcome = outcome.as_str(), "A/B test completion requested");
    Ok(Json(ApiResponse::success(outcome)))
}
