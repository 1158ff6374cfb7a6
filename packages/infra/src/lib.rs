//! # Agenda インフラ層
//!
//! 外部システムとの接続・通信を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: MongoDB クライアントの生成と疎通確認
//! - **リポジトリ実装**: 専門分野・専門職コレクションへの CRUD
//! - **認証**: 資格情報の照合と Bearer トークンの発行・検証
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - MongoDB 接続管理とインデックス作成
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと MongoDB 実装
//! - [`credentials`] - 資格情報の照合
//! - [`token`] - JWT の発行・検証
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use agenda_infra::{db, repository::MongoSpecialtyRepository};
//!
//! let client = db::connect("mongodb://localhost:27017", Duration::from_secs(5)).await?;
//! let database = client.database("agenda");
//! db::ensure_indexes(&database).await?;
//! let repository = MongoSpecialtyRepository::new(&database);
//! ```

pub mod credentials;
pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;
pub mod token;

pub use credentials::{CredentialVerifier, StaticCredentials};
pub use error::{InfraError, InfraErrorKind};
pub use token::{IssuedToken, JwtTokenService, TokenClaims, TokenService};
