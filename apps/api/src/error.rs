//! # API エラー定義
//!
//! ハンドラ・ユースケースで発生するエラーと、RFC 9457 形式の
//! HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス |
//! |-----------|-----------|
//! | `BadRequest` | 400 |
//! | `Validation` | 422（`errors` にフィールド別メッセージ） |
//! | `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Infra` | 種別により 409 / 401 / 503 / 504 / 500 |
//!
//! 5xx の詳細はレスポンスに含めず、`tracing::error!` にだけ出力する。

use agenda_domain::{RecordError, ValidationErrors};
use agenda_infra::{InfraError, InfraErrorKind};
use agenda_shared::ErrorResponse;
use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use thiserror::Error;

/// API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
   /// 不正なリクエスト（空のペイロード、JSON 構文エラーなど）
   #[error("不正なリクエスト: {0}")]
   BadRequest(String),

   /// 入力検証エラー
   #[error("入力検証エラー: {0}")]
   Validation(ValidationErrors),

   /// 認証エラー
   #[error("認証エラー: {0}")]
   Unauthorized(String),

   /// リソースが見つからない
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// 一意キーの重複
   #[error("競合が発生しました: {0}")]
   Conflict(String),

   /// インフラ層のエラー
   #[error("インフラエラー: {0}")]
   Infra(#[from] InfraError),
}

impl From<RecordError> for ApiError {
   fn from(err: RecordError) -> Self {
      match err {
         RecordError::EmptyPayload => ApiError::BadRequest(err.to_string()),
         RecordError::Invalid(errors) => ApiError::Validation(errors),
      }
   }
}

impl ApiError {
   fn to_error_response(&self) -> ErrorResponse {
      match self {
         ApiError::BadRequest(detail) => ErrorResponse::bad_request(detail),
         ApiError::Validation(errors) => ErrorResponse::validation_error(
            errors
               .iter()
               .map(|(field, messages)| (field.to_string(), messages.to_vec()))
               .collect(),
         ),
         ApiError::Unauthorized(detail) => ErrorResponse::unauthorized(detail),
         ApiError::NotFound(detail) => ErrorResponse::not_found(detail),
         ApiError::Conflict(detail) => ErrorResponse::conflict(detail),
         ApiError::Infra(err) => infra_error_response(err),
      }
   }
}

fn infra_error_response(err: &InfraError) -> ErrorResponse {
   match err.kind() {
      InfraErrorKind::DuplicateKey(_) => {
         ErrorResponse::conflict("Ya existe un registro con la misma clave")
      }
      InfraErrorKind::InvalidToken(_) => ErrorResponse::unauthorized("Token inválido o expirado"),
      InfraErrorKind::Unavailable(_) => {
         tracing::error!(error = %err, span_trace = %err.span_trace(), "データベースに接続できません");
         ErrorResponse::service_unavailable()
      }
      InfraErrorKind::Timeout(_) => {
         tracing::error!(error = %err, span_trace = %err.span_trace(), "データベースがタイムアウトしました");
         ErrorResponse::gateway_timeout()
      }
      InfraErrorKind::Database(_)
      | InfraErrorKind::Serialization(_)
      | InfraErrorKind::Unexpected(_) => {
         tracing::error!(error = %err, span_trace = %err.span_trace(), "内部エラー");
         ErrorResponse::internal_error()
      }
   }
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let body = self.to_error_response();
      let status =
         StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
      (status, Json(body)).into_response()
   }
}
