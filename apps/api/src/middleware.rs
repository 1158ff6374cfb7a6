//! # ミドルウェア
//!
//! API 用のミドルウェアを提供する。

mod bearer;

pub use bearer::{AuthenticatedUser, BearerState, require_bearer};
