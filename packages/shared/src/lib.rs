//! # Agenda 共有ユーティリティ
//!
//! API と周辺クレートで共通して使うレスポンス型・初期化処理を提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない
//! - axum には依存しない（`IntoResponse` 変換は API 側の責務）
//! - トレーシング初期化は `observability` feature の背後に置く

pub mod error_response;
pub mod health;
pub mod observability;
pub mod paginated_response;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use paginated_response::{PageInfo, PageRequest, PaginatedResponse};
