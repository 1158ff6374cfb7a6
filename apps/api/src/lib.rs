//! # Agenda API ライブラリ
//!
//! 医療予約の基礎データ（専門分野・専門職）を管理する REST API のコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: 依存の組み立てとルーター構築
//! - `config`: 環境変数からの設定読み込みと検証
//! - `error`: API エラーと RFC 9457 レスポンスへの変換
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（Bearer 認証）
//! - `usecase`: ユースケース（正規化・検証・永続化の調整）

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
