use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{config::AppConfig, dto::auth::Claims, error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "hoangtri_session";
pub const CART_SESSION_COOKIE: &str = "cart_session";
pub const CART_SESSION_HEADER: &str = "x-session-id";

const CART_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Identity resolved for one request. Handlers pass it explicitly to services.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<AuthUser>,
    /// Anonymous visitor token that keys a cart before login.
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous(session_id: Option<String>) -> Self {
        Self {
            user: None,
            session_id,
        }
    }

    pub fn for_user(user: AuthUser, session_id: Option<String>) -> Self {
        Self {
            user: Some(user),
            session_id,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.user_id)
    }

    pub fn from_headers(headers: &HeaderMap, config: &AppConfig) -> Self {
        let user = bearer_token(headers)
            .or_else(|| cookie_value(headers, SESSION_COOKIE))
            .and_then(|token| match decode_token(&token, &config.jwt_secret) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::debug!(error = %err, "ignoring invalid session token");
                    None
                }
            });

        let session_id = headers
            .get(CART_SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .or_else(|| cookie_value(headers, CART_SESSION_COOKIE))
            .filter(|id| is_valid_session_id(id));

        Self { user, session_id }
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::from_headers(&parts.headers, &state.config))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        RequestContext::from_headers(&parts.headers, &state.config)
            .user
            .ok_or(AppError::Unauthorized)
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        username: decoded.claims.username,
        role: decoded.claims.role,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn is_valid_session_id(id: &str) -> bool {
    (8..=64).contains(&id.len()) && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub fn session_cookie(config: &AppConfig, token: &str) -> String {
    build_cookie(
        config,
        SESSION_COOKIE,
        token,
        config.session_ttl_hours * 60 * 60,
        true,
    )
}

pub fn clear_session_cookie(config: &AppConfig) -> String {
    build_cookie(config, SESSION_COOKIE, "", 0, true)
}

pub fn cart_session_cookie(config: &AppConfig, session_id: &str) -> String {
    build_cookie(
        config,
        CART_SESSION_COOKIE,
        session_id,
        CART_SESSION_MAX_AGE_SECS,
        false,
    )
}

fn build_cookie(
    config: &AppConfig,
    name: &str,
    value: &str,
    max_age: i64,
    http_only: bool,
) -> String {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; SameSite=Lax");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "test-secret".into(),
            session_ttl_hours: 24,
            cookie_secure: false,
            cors_origin: None,
            db_max_connections: 1,
        }
    }

    fn token_for(user_id: Uuid, role: &str, secret: &str) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            username: "tri".into(),
            role: role.into(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap_or_default()
    }

    #[test]
    fn resolves_user_from_bearer_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token_for(id, ROLE_ADMIN, "test-secret"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        let ctx = RequestContext::from_headers(&headers, &config());
        let user = ctx.user.expect("user");
        assert_eq!(user.user_id, id);
        assert!(user.is_admin());
    }

    #[test]
    fn resolves_user_and_session_from_cookies() {
        let id = Uuid::new_v4();
        let cookie = format!(
            "theme=dark; {SESSION_COOKIE}={}; {CART_SESSION_COOKIE}=abcd-1234-efgh",
            token_for(id, ROLE_USER, "test-secret")
        );
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        let ctx = RequestContext::from_headers(&headers, &config());
        assert_eq!(ctx.user_id(), Some(id));
        assert_eq!(ctx.session_id.as_deref(), Some("abcd-1234-efgh"));
    }

    #[test]
    fn forged_token_resolves_to_anonymous() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token_for(Uuid::new_v4(), ROLE_ADMIN, "other"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        assert!(RequestContext::from_headers(&headers, &config()).user.is_none());
    }

    #[test]
    fn session_header_wins_over_cookie_and_is_validated() {
        let mut headers = HeaderMap::new();
        headers.insert(CART_SESSION_HEADER, HeaderValue::from_static("header-session-1"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("cart_session=cookie-session-1"),
        );
        let ctx = RequestContext::from_headers(&headers, &config());
        assert_eq!(ctx.session_id.as_deref(), Some("header-session-1"));

        let mut bad = HeaderMap::new();
        bad.insert(CART_SESSION_HEADER, HeaderValue::from_static("x;drop"));
        assert!(RequestContext::from_headers(&bad, &config()).session_id.is_none());
    }

    #[test]
    fn non_admin_is_forbidden() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            username: "khach".into(),
            role: ROLE_USER.into(),
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn cookies_carry_expected_attributes() {
        let mut cfg = config();
        cfg.cookie_secure = true;
        let cookie = session_cookie(&cfg, "tok");
        assert!(cookie.starts_with("hoangtri_session=tok; Path=/; Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(&cfg).contains("Max-Age=0"));
        assert!(!cart_session_cookie(&cfg, "abcdefgh").contains("HttpOnly"));
    }
}
