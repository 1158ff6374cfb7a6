//! # Agenda ドメイン層
//!
//! 診療予約の参照データ（専門分野・専門職）を扱うドメインモデルと、
//! 入力レコードの正規化・検証パイプラインを提供する。
//!
//! ## 設計方針
//!
//! - **2 段階パイプライン**: `normalize(raw) -> candidate` と
//!   `validate(candidate) -> Result` を呼び出し側が固定順で実行する
//! - **継承ではなく合成**: レコード種別ごとの [`RecordSchema`] 実装が、
//!   共通の正規化ヘルパー（[`normalize`]）とフィールドルール（[`validation`]）を組み合わせる
//! - **検証失敗はデータ**: 入力不備は [`ValidationErrors`] として返し、panic しない
//! - **純粋性**: I/O や共有可変状態を持たないため、任意のタスクから並行に呼び出せる
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - 検証エラーの表現
//! - [`normalize`] - 非失敗の正規化ヘルパー
//! - [`validation`] - フィールド単位の検証ルール
//! - [`rut`] - チリ国民識別番号（RUT）のチェックサム
//! - [`record`] - パイプラインの入口と識別子
//! - [`specialty`] / [`professional`] - レコード種別ごとのルール表
//! - [`clock`] - 時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use agenda_domain::{record, specialty::SpecialtySchema};
//! use serde_json::json;
//!
//! let specialty = record::clean_new::<SpecialtySchema>(json!({
//!     "nombre": "cardiología",
//!     "codigo": "CAR001",
//! }))
//! .unwrap();
//!
//! assert_eq!(specialty.nombre, "Cardiología");
//! ```

pub mod clock;
pub mod error;
pub mod normalize;
pub mod professional;
pub mod record;
pub mod rut;
pub mod specialty;
pub mod validation;

pub use error::{RecordError, ValidationErrors};
pub use record::{RecordId, RecordSchema};
