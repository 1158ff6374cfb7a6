//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、正規化・検証・永続化はユースケースに委譲
//! - 書き込み系の本文は `Bytes` で受け取り、空の本文と JSON 構文エラーを
//!   区別して 400 にする（`Json` 抽出器の拒否レスポンスは RFC 9457 形式ではないため）

pub mod auth;
pub mod health;
pub mod index;
pub mod professional;
pub mod specialty;

pub use auth::{AuthState, login};
pub use health::{ReadinessState, health_check, readiness_check};
pub use index::index;
pub use professional::{
    ProfessionalState,
    create_professional,
    delete_professional,
    list_professionals,
    update_professional,
};
use serde::Serialize;
use serde_json::Value;
pub use specialty::{
    SpecialtyState,
    create_specialty,
    delete_specialty,
    list_specialties,
    update_specialty,
};

use crate::error::ApiError;

/// 更新・削除の成功レスポンス
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// リクエスト本文を JSON 値として読む
///
/// 空白だけの本文は `Null`（= 空のペイロード）として扱う。
pub(crate) fn parse_payload(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "JSON の解析に失敗しました");
        ApiError::BadRequest("El cuerpo de la solicitud no es JSON válido".to_string())
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_空白だけの本文はnullとして扱う() {
        assert_eq!(parse_payload(b"").unwrap(), Value::Null);
        assert_eq!(parse_payload(b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_json構文エラーは400() {
        let err = parse_payload(b"{\"nombre\": ").unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_jsonオブジェクトを読み込む() {
        assert_eq!(
            parse_payload(br#"{"codigo": "CAR001"}"#).unwrap(),
            json!({ "codigo": "CAR001" })
        );
    }
}
