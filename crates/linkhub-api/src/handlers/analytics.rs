//! 分析查询处理器

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use tracing::instrument;

use link_management::service::{AnalyticsRequest, AnalyticsResponse};

use crate::{
    dto::{AnalyticsQuery, ApiResponse},
    error::ApiError,
    middleware::WorkspaceContext,
    state::AppState,
};

/// 分析查询
///
/// GET /api/analytics
///
/// `groupBy=timeseries` 返回按小时/天/月分桶的序列（空桶补 0），
/// `groupBy=top_urls` 返回按数量降序的目标地址
#[instrument(skip(state, ctx), fields(workspace_id = %ctx.workspace_id()))]
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<AnalyticsResponse>>, ApiError> {
    let request = AnalyticsRequest::try_from(query)?;
    let response = state
        .analytics
        .query(ctx.workspace_id(), &request, Utc::now())
        .await?;

    Ok(Json(ApiResponse::success(response)))
}
