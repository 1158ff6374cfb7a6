//! # レコード検証パイプライン
//!
//! 呼び出し側は次の順で明示的に実行する:
//!
//! ```text
//! accept_payload(payload) → S::normalize(raw) → S::validate_new / S::validate_changes
//! ```
//!
//! [`clean_new`] / [`clean_changes`] はこの 3 段階をまとめたショートカット。

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{RecordError, SCHEMA_KEY, ValidationErrors},
    validation::RawRecord,
};

/// ストアが割り当てる不透明な識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// レコード種別ごとのルール表
///
/// 正規化は失敗しない純粋関数、検証は `Result` を返す。
pub trait RecordSchema {
    /// 作成時に得られる検証済みレコード
    type New;
    /// 部分更新時に得られる変更内容
    type Changes;

    fn normalize(raw: RawRecord) -> RawRecord;

    fn validate_new(candidate: &RawRecord) -> Result<Self::New, ValidationErrors>;

    fn validate_changes(candidate: &RawRecord) -> Result<Self::Changes, ValidationErrors>;
}

/// ペイロードの前提条件を検査する
///
/// 空・欠落は [`RecordError::EmptyPayload`] で即座に返す。
pub fn accept_payload(payload: Value) -> Result<RawRecord, RecordError> {
    match payload {
        Value::Null => Err(RecordError::EmptyPayload),
        Value::Object(map) if map.is_empty() => Err(RecordError::EmptyPayload),
        Value::Object(map) => Ok(map),
        _ => Err(ValidationErrors::single(SCHEMA_KEY, "Tipo de entrada inválido").into()),
    }
}

/// 作成用に正規化・検証する
pub fn clean_new<S: RecordSchema>(payload: Value) -> Result<S::New, RecordError> {
    let candidate = S::normalize(accept_payload(payload)?);
    Ok(S::validate_new(&candidate)?)
}

/// 部分更新用に正規化・検証する
pub fn clean_changes<S: RecordSchema>(payload: Value) -> Result<S::Changes, RecordError> {
    let candidate = S::normalize(accept_payload(payload)?);
    Ok(S::validate_changes(&candidate)?)
}

/// 必須フィールドが揃わなかった場合のエラー
///
/// 作成モードでは欠落が先に報告されるため、通常は到達しない。
pub(crate) fn missing_required() -> ValidationErrors {
    ValidationErrors::single(SCHEMA_KEY, "Faltan campos obligatorios")
}
