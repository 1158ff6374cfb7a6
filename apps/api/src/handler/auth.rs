//! # 認証ハンドラ
//!
//! `POST /auth/login` でユーザー名・パスワードを照合し、Bearer トークンを発行する。
//!
//! ```json
//! { "access_token": "eyJ...", "token_type": "Bearer", "expires_in": 3600 }
//! ```

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use serde_json::Value;

use super::parse_payload;
use crate::{
    error::ApiError,
    usecase::{AuthUseCaseImpl, auth::LoginInput},
};

/// 認証 API の共有状態
///
/// Bearer ミドルウェアと同じユースケースを共有する。
pub struct AuthState {
    pub usecase: Arc<AuthUseCaseImpl>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type:   &'static str,
    pub expires_in:   i64,
}

/// POST /auth/login
///
/// 本文が JSON でない場合も「資格情報なし」として 400 を返す。
pub async fn login(
    State(state): State<Arc<AuthState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let payload = parse_payload(&body).unwrap_or(Value::Null);
    let field = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_string);
    let input = LoginInput {
        username: field("username"),
        password: field("password"),
    };

    let token = state.usecase.login(input)?;

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type:   "Bearer",
        expires_in:   token.expires_in,
    }))
}
