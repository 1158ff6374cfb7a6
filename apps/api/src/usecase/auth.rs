//! 認証ユースケース
//!
//! ユーザー名・パスワードを照合して Bearer トークンを発行し、
//! 保護されたルートでトークンを検証する。

use std::sync::Arc;

use agenda_domain::clock::Clock;
use agenda_infra::{CredentialVerifier, InfraErrorKind, IssuedToken, TokenClaims, TokenService};

use crate::error::ApiError;

const MISSING_CREDENTIALS: &str = "Username y password son necesarios";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// ログインの入力
///
/// JSON 本文から取り出した値。欠落・非文字列は `None`。
#[derive(Debug, Default)]
pub struct LoginInput {
   pub username: Option<String>,
   pub password: Option<String>,
}

/// 認証ユースケース
pub struct AuthUseCaseImpl {
   credentials: Arc<dyn CredentialVerifier>,
   tokens:      Arc<dyn TokenService>,
   clock:       Arc<dyn Clock>,
}

impl AuthUseCaseImpl {
   pub fn new(
      credentials: Arc<dyn CredentialVerifier>,
      tokens: Arc<dyn TokenService>,
      clock: Arc<dyn Clock>,
   ) -> Self {
      Self {
         credentials,
         tokens,
         clock,
      }
   }

   /// 資格情報を照合し、トークンを発行する
   ///
   /// - ユーザー名またはパスワードが空 → 400
   /// - 照合失敗 → 401
   pub fn login(&self, input: LoginInput) -> Result<IssuedToken, ApiError> {
      let (Some(username), Some(password)) = (
         input.username.filter(|u| !u.is_empty()),
         input.password.filter(|p| !p.is_empty()),
      ) else {
         return Err(ApiError::BadRequest(MISSING_CREDENTIALS.to_string()));
      };

      if !self.credentials.verify(&username, &password) {
         tracing::info!(username = %username, "ログインに失敗しました");
         return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
      }

      let token = self.tokens.issue(&username, self.clock.now())?;
      tracing::info!(username = %username, "トークンを発行しました");
      Ok(token)
   }

   /// Bearer トークンを検証し、クレームを返す
   pub fn authenticate(&self, token: &str) -> Result<TokenClaims, ApiError> {
      self
         .tokens
         .verify(token, self.clock.now())
         .map_err(|err| match err.kind() {
            InfraErrorKind::InvalidToken(reason) => {
               tracing::debug!(reason = %reason, "トークンを拒否しました");
               ApiError::Unauthorized("Token inválido o expirado".to_string())
            }
            _ => ApiError::Infra(err),
         })
   }
}
