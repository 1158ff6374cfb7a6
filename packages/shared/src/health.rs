//! # ヘルスチェック共通型
//!
//! `/health`（Liveness）と `/health/ready`（Readiness）のレスポンス型。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Liveness レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 稼働状態（`"healthy"`）
    pub status:  String,
    /// アプリケーションバージョン
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
        }
    }
}

/// 個別チェックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// Readiness 全体のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// Readiness レスポンス
///
/// `checks` のキーは依存先の名前（例: `"mongodb"`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessResponse {
    /// 全チェックが `Ok` のときだけ `Ready` になる
    pub fn from_checks(checks: BTreeMap<String, CheckStatus>) -> Self {
        let status = if checks.values().all(|check| *check == CheckStatus::Ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_healthyのjson形状() {
        let json = serde_json::to_value(HealthResponse::healthy("0.1.0")).unwrap();

        assert_eq!(json, json!({ "status": "healthy", "version": "0.1.0" }));
    }

    #[test]
    fn test_全チェック成功ならready() {
        let response =
            ReadinessResponse::from_checks(BTreeMap::from([("mongodb".to_string(), CheckStatus::Ok)]));

        assert!(response.is_ready());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": "ready", "checks": { "mongodb": "ok" } })
        );
    }

    #[test]
    fn test_1件でも失敗ならnot_ready() {
        let response = ReadinessResponse::from_checks(BTreeMap::from([
            ("mongodb".to_string(), CheckStatus::Error),
            ("otro".to_string(), CheckStatus::Ok),
        ]));

        assert_eq!(response.status, ReadinessStatus::NotReady);
        assert_eq!(serde_json::to_value(response.status).unwrap(), json!("not_ready"));
    }
}
