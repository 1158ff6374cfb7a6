//! # リポジトリ
//!
//! レコード種別ごとの永続化トレイトと MongoDB 実装。
//!
//! ## 設計方針
//!
//! - **トレイト経由**: ユースケースは `Arc<dyn XRepository>` だけを知る
//! - **一意キーで更新・削除**: 専門分野は `codigo`、専門職は `rut`
//! - **時刻は呼び出し側から**: `created_at` / `updated_at` は Clock から渡す

pub mod professional_repository;
pub mod specialty_repository;

pub use professional_repository::{MongoProfessionalRepository, ProfessionalRepository};
pub use specialty_repository::{MongoSpecialtyRepository, SpecialtyRepository};
