//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! ## 設計
//!
//! - 純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - よく使うステータスは便利コンストラクタで提供する
//! - 入力検証の失敗は `errors` にフィールドごとのメッセージを載せる
//! - 5xx の `detail` は固定文言。技術的な詳細はサーバログにだけ残す

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://agenda.example.com/errors";

/// エラーレスポンス
///
/// ```json
/// {
///   "type": "https://agenda.example.com/errors/validation-error",
///   "title": "Validation Error",
///   "status": 422,
///   "detail": "Los datos enviados no son válidos",
///   "errors": { "nombre": ["El nombre de la especialidad es obligatorio"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   #[serde(rename = "type")]
   pub error_type: String,
   pub title:      String,
   pub status:     u16,
   pub detail:     String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub errors:     Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
   /// `error_type_suffix` はベース URI に連結される（例: `"not-found"`）
   pub fn new(
      error_type_suffix: &str,
      title: impl Into<String>,
      status: u16,
      detail: impl Into<String>,
   ) -> Self {
      Self {
         error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
         title: title.into(),
         status,
         detail: detail.into(),
         errors: None,
      }
   }

   /// フィールドごとのエラーを付与する
   pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
      self.errors = Some(errors);
      self
   }

   pub fn bad_request(detail: impl Into<String>) -> Self {
      Self::new("bad-request", "Bad Request", 400, detail)
   }

   pub fn unauthorized(detail: impl Into<String>) -> Self {
      Self::new("unauthorized", "Unauthorized", 401, detail)
   }

   pub fn not_found(detail: impl Into<String>) -> Self {
      Self::new("not-found", "Not Found", 404, detail)
   }

   pub fn conflict(detail: impl Into<String>) -> Self {
      Self::new("conflict", "Conflict", 409, detail)
   }

   /// 422 入力検証エラー
   pub fn validation_error(errors: BTreeMap<String, Vec<String>>) -> Self {
      Self::new(
         "validation-error",
         "Validation Error",
         422,
         "Los datos enviados no son válidos",
      )
      .with_errors(errors)
   }

   /// 500 Internal Server Error（detail は固定）
   pub fn internal_error() -> Self {
      Self::new(
         "internal-error",
         "Internal Server Error",
         500,
         "Error interno del servidor",
      )
   }

   /// 503 Service Unavailable（detail は固定）
   pub fn service_unavailable() -> Self {
      Self::new(
         "service-unavailable",
         "Service Unavailable",
         503,
         "Servicio de base de datos no disponible",
      )
   }

   /// 504 Gateway Timeout（detail は固定）
   pub fn gateway_timeout() -> Self {
      Self::new(
         "gateway-timeout",
         "Gateway Timeout",
         504,
         "Tiempo de espera agotado en la base de datos",
      )
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use serde_json::json;

   use super::*;

   #[test]
   fn test_newはベースuriにサフィックスを連結する() {
      let error = ErrorResponse::new("custom", "Custom", 418, "tetera");

      assert_eq!(error.error_type, "https://agenda.example.com/errors/custom");
      assert_eq!(error.errors, None);
   }

   #[test]
   fn test_errorsがない場合はシリアライズしない() {
      let json = serde_json::to_value(ErrorResponse::not_found("Especialidad no encontrada"))
         .unwrap();

      assert_eq!(
         json,
         json!({
            "type": "https://agenda.example.com/errors/not-found",
            "title": "Not Found",
            "status": 404,
            "detail": "Especialidad no encontrada",
         })
      );
   }

   #[test]
   fn test_validation_errorはフィールドエラーを含む422を返す() {
      let errors = BTreeMap::from([(
         "nombre".to_string(),
         vec!["Debe tener entre 2 y 100 caracteres".to_string()],
      )]);

      let json = serde_json::to_value(ErrorResponse::validation_error(errors)).unwrap();

      assert_eq!(json["status"], 422);
      assert_eq!(json["errors"]["nombre"][0], "Debe tener entre 2 y 100 caracteres");
   }

   #[test]
   fn test_5xxのdetailは固定文言() {
      assert_eq!(ErrorResponse::internal_error().status, 500);
      assert_eq!(ErrorResponse::service_unavailable().status, 503);
      assert_eq!(ErrorResponse::gateway_timeout().status, 504);
      assert_eq!(
         ErrorResponse::internal_error().detail,
         "Error interno del servidor"
      );
   }

   #[test]
   fn test_errorsなしのjsonをデシリアライズできる() {
      let error: ErrorResponse = serde_json::from_value(json!({
         "type": "https://agenda.example.com/errors/unauthorized",
         "title": "Unauthorized",
         "status": 401,
         "detail": "Invalid credentials",
      }))
      .unwrap();

      assert_eq!(error, ErrorResponse::unauthorized("Invalid credentials"));
   }
}
