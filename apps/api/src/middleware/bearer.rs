//! # Bearer 認証ミドルウェア
//!
//! `Authorization: Bearer <token>` を検証し、認証済みユーザーを
//! リクエスト拡張に格納する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let bearer_state = BearerState { usecase: auth_usecase.clone() };
//!
//! Router::new()
//!     .route("/especialidades", get(list_specialties))
//!     .layer(from_fn_with_state(bearer_state, require_bearer))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, usecase::AuthUseCaseImpl};

const MISSING_TOKEN: &str = "Token de acceso requerido";

/// Bearer 認証ミドルウェアの状態
#[derive(Clone)]
pub struct BearerState {
    pub usecase: Arc<AuthUseCaseImpl>,
}

/// 検証済みトークンの主体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Bearer 認証ミドルウェア
///
/// ヘッダーの欠落・形式不正、トークンの署名不正・期限切れはすべて 401。
pub async fn require_bearer(
    State(state): State<BearerState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return ApiError::Unauthorized(MISSING_TOKEN.to_string()).into_response();
    };

    let claims = match state.usecase.authenticate(token) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(username = %claims.sub, "Bearer トークンを検証しました");
    request
        .extensions_mut()
        .insert(AuthenticatedUser { username: claims.sub });

    next.run(request).await
}

/// `Bearer` スキームのトークン部分を取り出す（スキーム名は大文字小文字を区別しない）
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use agenda_domain::clock::FixedClock;
    use agenda_infra::{JwtTokenService, StaticCredentials, token::DEFAULT_TOKEN_TTL_SECS};
    use axum::{
        Extension,
        Router,
        http::{Method, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::{TimeDelta, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tower::ServiceExt;

    use super::*;
    use crate::usecase::auth::LoginInput;

    /// テスト用のダミーハンドラ（認証済みユーザー名を返す）
    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.username
    }

    fn usecase(hours_after_issue: i64) -> Arc<AuthUseCaseImpl> {
        let now = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap()
            + TimeDelta::hours(hours_after_issue);
        Arc::new(AuthUseCaseImpl::new(
            Arc::new(StaticCredentials::new([(
                "medico".to_string(),
                "medico123".to_string(),
            )])),
            Arc::new(JwtTokenService::new(
                "secreto-de-prueba",
                TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
            )),
            Arc::new(FixedClock::new(now)),
        ))
    }

    fn issue_token() -> String {
        usecase(0)
            .login(LoginInput {
                username: Some("medico".to_string()),
                password: Some("medico123".to_string()),
            })
            .unwrap()
            .access_token
    }

    fn app(usecase: Arc<AuthUseCaseImpl>) -> Router {
        Router::new()
            .route("/protegido", get(whoami))
            .layer(from_fn_with_state(BearerState { usecase }, require_bearer))
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(Method::GET).uri("/protegido");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_有効なトークンで認証済みユーザーが渡る() {
        let token = issue_token();

        let (status, body) = call(app(usecase(0)), Some(format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "medico");
    }

    #[tokio::test]
    async fn test_スキーム名は大文字小文字を区別しない() {
        let token = issue_token();

        let (status, _) = call(app(usecase(0)), Some(format!("bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer".to_string()))]
    #[case(Some("Bearer ".to_string()))]
    #[case(Some("Basic bWVkaWNvOm1lZGljbzEyMw==".to_string()))]
    #[tokio::test]
    async fn test_ヘッダーが欠落または不正なら401(#[case] authorization: Option<String>) {
        let (status, body) = call(app(usecase(0)), authorization).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(MISSING_TOKEN));
    }

    #[tokio::test]
    async fn test_期限切れトークンは401() {
        let token = issue_token();

        let (status, body) = call(app(usecase(2)), Some(format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Token inválido o expirado"));
    }

    #[tokio::test]
    async fn test_改ざんされたトークンは401() {
        let mut token = issue_token();
        token.push('x');

        let (status, _) = call(app(usecase(0)), Some(format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
