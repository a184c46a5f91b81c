//! 合作伙伴门户中间件
//!
//! 对门户域名的请求做登录态判断：
//! - 未登录访问受保护页面 -> 登录页
//! - 已登录访问受保护页面或登录页 -> 引导页 / next / 控制台 / 旧地址映射
//! - 其余请求重写到门户前端应用的路径前缀下
//!
//! 需要包在整个 Router 外层使用，重写后的 URI 才会参与路由匹配

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Uri, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use link_management::repository::UserRepository;
use linkhub_shared::config::{AuthConfig, PartnersConfig};
use linkhub_shared::observability::metrics as app_metrics;

use crate::auth::{SessionClaims, SessionManager};
use crate::error::ApiError;

/// 需要登录的路径前缀（另外 `/` 本身也需要登录）
const AUTHENTICATED_PATHS: &[&str] = &[
    "/programs",
    "/marketplace",
    "/onboarding",
    "/settings",
    "/profile",
    "/payouts",
    "/account",
];

const LOGIN_PATHS: &[&str] = &["/login", "/register"];

/// 旧地址映射
const LEGACY_REDIRECTS: &[(&str, &str)] = &[
    ("/account", "/programs"),
    ("/settings", "/profile"),
    ("/settings/payouts", "/payouts"),
    ("/account/settings", "/profile"),
];

static PROGRAM_LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+)/(login|register)$").expect("valid regex"));

static PROGRAM_SALES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/programs/([^/]+)/sales$").expect("valid regex"));

/// 默认合作伙伴查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DefaultPartnerResolver: Send + Sync {
    async fn default_partner_id(&self, user_id: &str) -> Result<Option<String>, ApiError>;
}

#[async_trait]
impl DefaultPartnerResolver for UserRepository {
    async fn default_partner_id(&self, user_id: &str) -> Result<Option<String>, ApiError> {
        Ok(self.find_default_partner_id(user_id).await?)
    }
}

/// 门户中间件状态
#[derive(Clone)]
pub struct PartnerPortalState {
    pub partners: Arc<PartnersConfig>,
    pub cookie_names: Arc<Vec<String>>,
    pub sessions: SessionManager,
    pub resolver: Arc<dyn DefaultPartnerResolver>,
}

impl PartnerPortalState {
    pub fn new(
        partners: &PartnersConfig,
        auth: &AuthConfig,
        resolver: Arc<dyn DefaultPartnerResolver>,
    ) -> Self {
        Self {
            partners: Arc::new(partners.clone()),
            cookie_names: Arc::new(auth.session_cookie_names.clone()),
            sessions: SessionManager::new(&auth.session_secret),
            resolver,
        }
    }

    /// 依次尝试各会话 Cookie，取第一个有效的会话
    fn session_from_headers(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let jar = CookieJar::from_headers(headers);
        self.cookie_names.iter().find_map(|name| {
            let cookie = jar.get(name)?;
            match self.sessions.verify(cookie.value()) {
                Ok(claims) => Some(claims),
                Err(e) => {
                    debug!(cookie = %name, error = %e, "ignoring invalid session cookie");
                    None
                }
            }
        })
    }
}

/// 已登录用户在门户中的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSession {
    pub default_partner_id: Option<String>,
}

/// 中间件决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalAction {
    /// 重定向到绝对地址
    Redirect(String),
    /// 重写为新的路径（含查询串）
    Rewrite(String),
}

impl PortalAction {
    fn as_metric_label(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::Rewrite(_) => "rewrite",
        }
    }
}

/// 门户请求
#[derive(Debug, Clone)]
pub struct PortalRequest<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    /// 当前请求的源站地址，用于生成绝对跳转地址
    pub base: &'a Url,
}

impl PortalRequest<'_> {
    pub fn full_path(&self) -> String {
        match self.query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.to_string(),
        }
    }

    fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn search_string(&self) -> String {
        match self.query {
            Some(q) if !q.is_empty() => format!("?{}", q),
            _ => String::new(),
        }
    }

    fn redirect(&self, target: &str) -> PortalAction {
        let location = self
            .base
            .join(target)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| target.to_string());
        PortalAction::Redirect(location)
    }
}

pub fn is_authenticated_path(path: &str) -> bool {
    path == "/" || AUTHENTICATED_PATHS.iter().any(|p| path.starts_with(p))
}

pub fn is_login_path(path: &str) -> bool {
    LOGIN_PATHS
        .iter()
        .any(|p| path.starts_with(p) || path.ends_with(p))
}

/// 旧地址到新地址的映射
pub fn partners_redirect(path: &str) -> Option<String> {
    if let Some((_, target)) = LEGACY_REDIRECTS.iter().find(|(from, _)| *from == path) {
        return Some((*target).to_string());
    }
    PROGRAM_SALES_RE
        .captures(path)
        .map(|caps| format!("/programs/{}/earnings", &caps[1]))
}

/// `next` 参数必须是以 `/` 开头、解析后仍在同一源站的地址
pub fn is_valid_internal_redirect(next: &str, base: &Url) -> bool {
    if !next.starts_with('/') || next.starts_with("//") {
        return false;
    }
    base.join(next)
        .map(|resolved| resolved.origin() == base.origin())
        .unwrap_or(false)
}

/// 根据路径与登录态决定重定向或重写
pub fn decide(
    request: &PortalRequest<'_>,
    session: Option<&PortalSession>,
    rewrite_prefix: &str,
) -> PortalAction {
    let path = request.path;
    let authenticated_path = is_authenticated_path(path);
    let login_path = is_login_path(path);

    match session {
        None if authenticated_path => {
            if let Some(slug) = path
                .strip_prefix("/programs/")
                .and_then(|rest| rest.split('/').next())
                .filter(|slug| !slug.is_empty())
            {
                return request.redirect(&format!("/{}/login", slug));
            }

            if path == "/" {
                return request.redirect("/login");
            }

            let mut login = request
                .base
                .join("/login")
                .unwrap_or_else(|_| request.base.clone());
            login
                .query_pairs_mut()
                .append_pair("next", &request.full_path());
            return PortalAction::Redirect(login.to_string());
        }
        Some(session) if authenticated_path || login_path => {
            if session.default_partner_id.is_none() && !path.starts_with("/onboarding") {
                return request.redirect("/onboarding");
            }

            if let Some(next) = request.query_param("next")
                && is_valid_internal_redirect(&next, request.base)
            {
                return request.redirect(&next);
            }

            if path == "/" || path.starts_with("/pn_") {
                return request.redirect("/programs");
            }

            if login_path {
                return match PROGRAM_LOGIN_RE.captures(path) {
                    Some(caps) => request.redirect(&format!("/programs/{}", &caps[1])),
                    None => request.redirect("/"),
                };
            }

            if let Some(target) = partners_redirect(path) {
                return request.redirect(&format!("{}{}", target, request.search_string()));
            }
        }
        _ => {}
    }

    PortalAction::Rewrite(format!("{}{}", rewrite_prefix, request.full_path()))
}

/// 由转发头和 Host 推导源站地址
fn portal_base_url(headers: &HeaderMap, host: &str) -> Option<Url> {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    Url::parse(&format!("{}://{}", proto, host)).ok()
}

/// 合作伙伴门户中间件
pub async fn partners_middleware(
    State(state): State<PartnerPortalState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = match request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
    {
        Some(host) if host.eq_ignore_ascii_case(&state.partners.hostname) => host.to_string(),
        _ => return next.run(request).await,
    };

    let Some(base) = portal_base_url(request.headers(), &host) else {
        return ApiError::Validation(format!("invalid host: {}", host)).into_response();
    };

    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let portal_request = PortalRequest {
        path: &path,
        query: query.as_deref(),
        base: &base,
    };

    let session = match state.session_from_headers(request.headers()) {
        Some(claims) if is_authenticated_path(&path) || is_login_path(&path) => {
            let default_partner_id = match claims.default_partner_id {
                Some(id) => Some(id),
                None => match state.resolver.default_partner_id(&claims.sub).await {
                    Ok(id) => id,
                    Err(e) => return e.into_response(),
                },
            };
            Some(PortalSession { default_partner_id })
        }
        Some(_) => Some(PortalSession {
            default_partner_id: None,
        }),
        None => None,
    };

    let action = decide(&portal_request, session.as_ref(), &state.partners.rewrite_prefix);
    app_metrics::record_partner_portal_decision(action.as_metric_label());

    match action {
        PortalAction::Redirect(location) => {
            debug!(path = %path, location = %location, "partner portal redirect");
            Redirect::temporary(&location).into_response()
        }
        PortalAction::Rewrite(target) => match target.parse::<Uri>() {
            Ok(uri) => {
                *request.uri_mut() = uri;
                next.run(request).await
            }
            Err(e) => {
                warn!(target = %target, error = %e, "failed to rewrite partner portal path");
                ApiError::Validation(format!("invalid path: {}", path)).into_response()
            }
        },
    }
}
