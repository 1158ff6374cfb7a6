//! # インフラ層エラー定義
//!
//! MongoDB やトークン処理で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターン:
//! - [`InfraError`]: 種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: 具体的な種別
//!
//! ## MongoDB エラーの分類
//!
//! | 条件 | 種別 | API での扱い |
//! |------|------|-------------|
//! | 一意制約違反（code 11000） | `DuplicateKey` | 409 |
//! | タイムアウト | `Timeout` | 504 |
//! | サーバ選択・接続失敗 | `Unavailable` | 503 |
//! | その他 | `Database` | 500 |
//!
//! 分類できない場合はメッセージ中の `timeout` / `connection` で判定する。

use std::{fmt, io};

use derive_more::Display;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use tracing_error::SpanTrace;

/// MongoDB の一意制約違反コード
const DUPLICATE_KEY_CODE: i32 = 11000;

/// インフラ層で発生するエラー
///
/// `From<mongodb::error::Error>` 等でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 分類されないデータベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[source] mongodb::error::Error),

    /// 一意キーの重複
    #[error("一意キーが重複しています: {0}")]
    DuplicateKey(String),

    /// 操作のタイムアウト
    #[error("データベースがタイムアウトしました: {0}")]
    Timeout(String),

    /// データベースに接続できない
    #[error("データベースに接続できません: {0}")]
    Unavailable(String),

    /// BSON との変換失敗
    #[error("シリアライズエラー: {0}")]
    Serialization(String),

    /// トークンが不正または期限切れ
    #[error("トークンが無効です: {0}")]
    InvalidToken(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::DuplicateKey(msg.into()))
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Timeout(msg.into()))
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unavailable(msg.into()))
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::InvalidToken(msg.into()))
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

/// MongoDB エラーを種別に分類する
fn classify(source: mongodb::error::Error) -> InfraErrorKind {
    let message = source.to_string();
    match source.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            return InfraErrorKind::DuplicateKey(message);
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            return InfraErrorKind::DuplicateKey(message);
        }
        ErrorKind::Io(io_error) if io_error.kind() == io::ErrorKind::TimedOut => {
            return InfraErrorKind::Timeout(message);
        }
        ErrorKind::ServerSelection { .. } => {
            return InfraErrorKind::Unavailable(message);
        }
        _ => {}
    }

    classify_message(&message).unwrap_or(InfraErrorKind::Database(source))
}

/// 構造から判別できないエラーをメッセージで分類する
fn classify_message(message: &str) -> Option<InfraErrorKind> {
    let lower = message.to_lowercase();
    if lower.contains("duplicate key") {
        Some(InfraErrorKind::DuplicateKey(message.to_string()))
    } else if lower.contains("timeout") || lower.contains("timed out") {
        Some(InfraErrorKind::Timeout(message.to_string()))
    } else if lower.contains("connection") {
        Some(InfraErrorKind::Unavailable(message.to_string()))
    } else {
        None
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<mongodb::error::Error> for InfraError {
    fn from(source: mongodb::error::Error) -> Self {
        Self::capture(classify(source))
    }
}

impl From<mongodb::bson::ser::Error> for InfraError {
    fn from(source: mongodb::bson::ser::Error) -> Self {
        Self::capture(InfraErrorKind::Serialization(source.to_string()))
    }
}

impl From<jsonwebtoken::errors::Error> for InfraError {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self::capture(InfraErrorKind::InvalidToken(source.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[test]
    fn test_convenience_constructorでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("insert_specialty", codigo = "CAR001");
            let _enter = span.enter();

            let err = InfraError::duplicate_key("E11000");

            assert!(matches!(err.kind(), InfraErrorKind::DuplicateKey(msg) if msg == "E11000"));
            let trace = err.span_trace().to_string();
            assert!(trace.contains("insert_specialty"), "スパン名を含むこと: {trace}");
        });
    }

    #[rstest]
    #[case("E11000 duplicate key error collection: agenda.especialidades")]
    fn test_重複キーのメッセージを分類する(#[case] message: &str) {
        assert!(matches!(
            classify_message(message),
            Some(InfraErrorKind::DuplicateKey(_))
        ));
    }

    #[rstest]
    #[case("Server selection timeout: No available servers")]
    #[case("operation timed out")]
    fn test_タイムアウトのメッセージを分類する(#[case] message: &str) {
        assert!(matches!(
            classify_message(message),
            Some(InfraErrorKind::Timeout(_))
        ));
    }

    #[test]
    fn test_接続失敗のメッセージを分類する() {
        assert!(matches!(
            classify_message("Connection refused"),
            Some(InfraErrorKind::Unavailable(_))
        ));
    }

    #[test]
    fn test_分類できないメッセージはnone() {
        assert!(classify_message("unauthorized command").is_none());
    }

    #[test]
    fn test_displayは種別のメッセージを出力する() {
        let err = InfraError::unavailable("no hay servidores");
        assert_eq!(err.to_string(), "データベースに接続できません: no hay servidores");
    }

    #[test]
    fn test_jwtエラーはinvalid_tokenになる() {
        let source = jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidToken);
        let err = InfraError::from(source);

        assert!(matches!(err.kind(), InfraErrorKind::InvalidToken(_)));
    }
}
