//! # ユースケース層
//!
//! Agenda API のアプリケーションロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・時刻・認証サービスを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは HTTP の入出力変換だけを行い、
//!   正規化・検証・永続化の順序はユースケースが決める
//!
//! ## モジュール構成
//!
//! - `auth`: ログインとトークン検証
//! - `specialty`: 専門分野の CRUD
//! - `professional`: 専門職の CRUD とページング

pub mod auth;
pub mod professional;
pub mod specialty;

pub use auth::AuthUseCaseImpl;
pub use professional::ProfessionalUseCaseImpl;
pub use specialty::SpecialtyUseCaseImpl;
