//! # 検証エラー定義
//!
//! レコード検証の失敗を「フィールド名 → メッセージ一覧」の対応として表現する。
//!
//! ## 設計方針
//!
//! - **例外ではなく値**: 入力不備は [`RecordError`] として `Result` で返す
//! - **全件収集**: フィールド単位のエラーは最初の 1 件で止めず、すべて集める
//! - **予約キー**: 特定フィールドに帰属しないエラーは `_schema`、
//!   ネストしたエントリ全体のエラーは `horarios.{i}._schema` のように記録する
//!
//! ## HTTP ステータスとの対応
//!
//! | バリアント | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `EmptyPayload` | 400 Bad Request | ペイロードが空・欠落 |
//! | `Invalid` | 422 Unprocessable Entity | フィールド／相関チェックの失敗 |

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use thiserror::Error;

/// フィールドに帰属しないエラーを記録するキー
pub const SCHEMA_KEY: &str = "_schema";

/// フィールド名からエラーメッセージ一覧への対応
///
/// キーはアルファベット順に並ぶため、レスポンスの JSON が安定する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1 件だけのエラーを生成する
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// エラーを追加する
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// 別のエラー集合を取り込む
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 指定フィールドのメッセージ一覧（なければ空）
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// エラーがなければ `Ok(())`、あれば自身を `Err` で返す
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// レコード検証パイプラインのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// ペイロードが空または欠落している
    ///
    /// フィールド単位の検証に入る前に即座に返す。
    #[error("No se enviaron datos")]
    EmptyPayload,

    /// フィールド単位または相関チェックの失敗
    #[error("入力値の検証に失敗しました: {0}")]
    Invalid(ValidationErrors),
}

impl From<ValidationErrors> for RecordError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_同じフィールドへの追加はメッセージ一覧に積まれる() {
        let mut errors = ValidationErrors::new();
        errors.add("nombre", "a");
        errors.add("nombre", "b");

        assert_eq!(errors.messages("nombre"), ["a", "b"]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_mergeは既存フィールドのメッセージを保持する() {
        let mut errors = ValidationErrors::single("rut", "uno");
        errors.merge(ValidationErrors::single("rut", "dos"));
        errors.merge(ValidationErrors::single("email", "tres"));

        assert_eq!(errors.messages("rut"), ["uno", "dos"]);
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_存在しないフィールドのメッセージは空() {
        assert!(ValidationErrors::new().messages("nombre").is_empty());
    }

    #[test]
    fn test_into_resultは空ならok() {
        assert_eq!(ValidationErrors::new().into_result(), Ok(()));
        assert!(ValidationErrors::single("x", "y").into_result().is_err());
    }

    #[test]
    fn test_シリアライズはフィールドをキーとするオブジェクトになる() {
        let mut errors = ValidationErrors::single("nombre", "corto");
        errors.add("horarios.0._schema", "orden");

        let value = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            value,
            json!({ "horarios.0._schema": ["orden"], "nombre": ["corto"] })
        );
    }

    #[test]
    fn test_displayはフィールドとメッセージを列挙する() {
        let mut errors = ValidationErrors::single("b", "dos");
        errors.add("a", "uno");

        assert_eq!(errors.to_string(), "a: uno; b: dos");
    }
}
