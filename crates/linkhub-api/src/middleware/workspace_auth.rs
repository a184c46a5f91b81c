//! 工作区 API Key 认证中间件
//!
//! 从 `Authorization: Bearer <key>` 提取 API Key，按哈希查出 Token，
//! 校验有效期后把工作区注入请求扩展。

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use link_management::models::Workspace;
use linkhub_shared::observability::middleware::record_workspace;

use crate::auth::{extract_bearer_token, hash_api_key};
use crate::error::ApiError;
use crate::state::AppState;

/// 认证通过后的工作区上下文
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub workspace: Workspace,
    pub token_id: String,
}

impl WorkspaceContext {
    pub fn workspace_id(&self) -> &str {
        &self.workspace.id
    }
}

/// 工作区认证中间件
pub async fn workspace_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = state
        .workspaces
        .find_token_by_hash(&hash_api_key(&api_key))
        .await?
        .ok_or_else(|| {
            let key_prefix: String = api_key.chars().take(6).collect();
            warn!(key_prefix = %key_prefix, "Invalid API key");
            ApiError::Unauthorized("Invalid API key".to_string())
        })?;

    let now = Utc::now();
    if token.is_expired(now) {
        warn!(token_id = %token.id, "API key has expired");
        return Err(ApiError::Unauthorized("API key has expired".to_string()));
    }

    let workspace = state
        .workspaces
        .find_workspace(&token.project_id)
        .await?
        .ok_or_else(|| ApiError::WorkspaceNotFound(token.project_id.clone()))?;

    // 更新最后使用时间（异步，不阻塞请求）
    let workspaces = state.workspaces.clone();
    let token_id = token.id.clone();
    tokio::spawn(async move {
        if let Err(e) = workspaces.touch_token(&token_id, now).await {
            debug!(token_id = %token_id, error = %e, "failed to update token last_used");
        }
    });

    record_workspace(&workspace.id);
    debug!(workspace_id = %workspace.id, token_id = %token.id, "API key authenticated");
    request.extensions_mut().insert(WorkspaceContext {
        workspace,
        token_id: token.id,
    });

    Ok(next.run(request).await)
}
