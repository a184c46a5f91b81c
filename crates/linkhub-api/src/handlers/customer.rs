//! 客户 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::instrument;

use link_management::service::CustomerActivityResponse;

use crate::{dto::ApiResponse, error::ApiError, middleware::WorkspaceContext, state::AppState};

/// 获取客户活动
///
/// GET /api/customers/{id}/activity
///
/// 返回客户 LTV、转化耗时、最近事件以及最早事件对应的短链
#[instrument(skip(state, ctx), fields(workspace_id = %ctx.workspace_id()))]
pub async fn get_customer_activity(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
    Path(customer_id): Path<String>,
) -> Result<Json<ApiResponse<CustomerActivityResponse>>, ApiError> {
    let activity = state
        .activity
        .get_customer_activity(ctx.workspace_id(), &customer_id)
        .await?;

    Ok(Json(ApiResponse::success(activity)))
}
