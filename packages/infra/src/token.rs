//! # Bearer トークン
//!
//! ログイン成功時に HS256 の JWT を発行し、保護されたルートで検証する。
//!
//! 有効期限の判定はシステム時刻ではなく呼び出し側が渡す `now` で行う
//! （`jsonwebtoken` 側の `exp` 検証は無効化している）。

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::InfraError;

/// トークンの既定の有効期間（秒）
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// JWT のクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// ユーザー名
    pub sub: String,
    /// 発行時刻（UNIX 秒）
    pub iat: i64,
    /// 失効時刻（UNIX 秒）
    pub exp: i64,
}

/// 発行済みトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// 有効期間（秒）
    pub expires_in:   i64,
}

/// トークンの発行と検証を担当するトレイト
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, InfraError>;

    /// 署名と有効期限を検証し、クレームを返す
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, InfraError>;
}

/// HS256 による実装
pub struct JwtTokenService {
    encoding:   EncodingKey,
    decoding:   DecodingKey,
    validation: Validation,
    ttl:        TimeDelta,
}

impl JwtTokenService {
    pub fn new(secret: &str, ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, InfraError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, InfraError> {
        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)?.claims;
        if claims.exp <= now.timestamp() {
            return Err(InfraError::invalid_token("トークンの有効期限が切れています"));
        }
        Ok(claims)
    }
}
