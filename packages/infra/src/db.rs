//! # MongoDB 接続管理
//!
//! クライアントの生成、疎通確認、一意インデックスの作成を行う。
//!
//! `mongodb::Client` は内部に接続プールを持ち、`Clone` で共有できる。
//! 接続タイムアウトとサーバ選択タイムアウトには同じ値（`DB_TIMEOUT`）を使う。

use std::time::Duration;

use async_trait::async_trait;
use mongodb::{
    Client,
    Database,
    IndexModel,
    bson::{Document, doc},
    options::{ClientOptions, IndexOptions},
};

use crate::error::InfraError;

/// 専門分野コレクション
pub const SPECIALTIES: &str = "especialidades";
/// 専門職コレクション
pub const PROFESSIONALS: &str = "profesionales";

/// 接続オプションを組み立ててクライアントを生成する
///
/// 実際の接続は最初の操作時に行われる。
#[tracing::instrument(skip_all, level = "debug")]
pub async fn connect(uri: &str, timeout: Duration) -> Result<Client, InfraError> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some("agenda-api".to_string());
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
    Ok(Client::with_options(options)?)
}

/// `ping` コマンドで疎通を確認する
#[tracing::instrument(skip_all, level = "debug")]
pub async fn ping(database: &Database) -> Result<(), InfraError> {
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

/// Readiness Check 用の疎通確認
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), InfraError>;
}

/// `ping` コマンドによる実装
#[derive(Debug, Clone)]
pub struct MongoProbe {
    database: Database,
}

impl MongoProbe {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl DatabaseProbe for MongoProbe {
    async fn ping(&self) -> Result<(), InfraError> {
        ping(&self.database).await
    }
}

/// 一意キーのインデックスを作成する（既存なら何もしない）
#[tracing::instrument(skip_all, level = "debug")]
pub async fn ensure_indexes(database: &Database) -> Result<(), InfraError> {
    create_unique_index(database, SPECIALTIES, doc! { "codigo": 1 }).await?;
    create_unique_index(database, PROFESSIONALS, doc! { "rut": 1 }).await?;
    Ok(())
}

async fn create_unique_index(
    database: &Database,
    collection: &str,
    keys: Document,
) -> Result<(), InfraError> {
    let index = IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build();
    database
        .collection::<Document>(collection)
        .create_index(index)
        .await?;
    tracing::debug!(collection, "一意インデックスを確認しました");
    Ok(())
}
