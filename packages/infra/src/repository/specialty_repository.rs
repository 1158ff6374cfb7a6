//! # SpecialtyRepository
//!
//! `especialidades` コレクションへの永続化を担当する。
//!
//! 更新・削除は一意キー `codigo` で照合する。`codigo` 自体は更新しない。

use agenda_domain::{
    RecordId,
    specialty::{NewSpecialty, Specialty, SpecialtyChanges},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt as _;
use mongodb::{
    Collection,
    Database,
    bson::{doc, oid::ObjectId, to_bson},
};
use serde::{Deserialize, Serialize};

use crate::{db, error::InfraError};

/// 専門分野リポジトリトレイト
#[async_trait]
pub trait SpecialtyRepository: Send + Sync {
    /// 全件を登録順に取得する
    async fn find_all(&self) -> Result<Vec<Specialty>, InfraError>;

    /// 件数を数える
    async fn count(&self) -> Result<u64, InfraError>;

    /// 挿入し、ストアが割り当てた識別子付きで返す
    async fn insert(&self, new: NewSpecialty, now: DateTime<Utc>) -> Result<Specialty, InfraError>;

    /// `codigo` で照合して部分更新する。照合できたら `true`
    async fn update_by_code(
        &self,
        codigo: &str,
        changes: &SpecialtyChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// `codigo` で照合して削除する。削除できたら `true`
    async fn delete_by_code(&self, codigo: &str) -> Result<bool, InfraError>;
}

/// コレクション上のドキュメント
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpecialtyDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id:          Option<ObjectId>,
    codigo:      String,
    nombre:      String,
    #[serde(default)]
    descripcion: Option<String>,
    #[serde(default)]
    taxonomia:   Vec<String>,
    #[serde(default = "default_active")]
    activa:      bool,
    created_at:  DateTime<Utc>,
    #[serde(default)]
    updated_at:  Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl SpecialtyDocument {
    fn from_new(new: &NewSpecialty, now: DateTime<Utc>) -> Self {
        Self {
            id:          None,
            codigo:      new.codigo.clone(),
            nombre:      new.nombre.clone(),
            descripcion: new.descripcion.clone(),
            taxonomia:   new.taxonomia.clone(),
            activa:      new.activa,
            created_at:  now,
            updated_at:  None,
        }
    }

    fn into_domain(self) -> Result<Specialty, InfraError> {
        let id = self
            .id
            .ok_or_else(|| InfraError::unexpected("especialidad sin _id"))?;
        Ok(Specialty {
            id:          RecordId::new(id.to_hex()),
            codigo:      self.codigo,
            nombre:      self.nombre,
            descripcion: self.descripcion,
            taxonomia:   self.taxonomia,
            activa:      self.activa,
            created_at:  self.created_at,
            updated_at:  self.updated_at,
        })
    }
}

/// MongoDB 実装の SpecialtyRepository
#[derive(Debug, Clone)]
pub struct MongoSpecialtyRepository {
    collection: Collection<SpecialtyDocument>,
}

impl MongoSpecialtyRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(db::SPECIALTIES),
        }
    }
}

#[async_trait]
impl SpecialtyRepository for MongoSpecialtyRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Specialty>, InfraError> {
        let documents: Vec<SpecialtyDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(SpecialtyDocument::into_domain)
            .collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count(&self) -> Result<u64, InfraError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(codigo = %new.codigo))]
    async fn insert(&self, new: NewSpecialty, now: DateTime<Utc>) -> Result<Specialty, InfraError> {
        let document = SpecialtyDocument::from_new(&new, now);
        let result = self.collection.insert_one(&document).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| InfraError::unexpected("inserted_id no es un ObjectId"))?;

        Ok(Specialty::from_new(RecordId::new(id.to_hex()), new, now))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(codigo = %codigo))]
    async fn update_by_code(
        &self,
        codigo: &str,
        changes: &SpecialtyChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let updated_at = to_bson(&now)?;
        let mut set = doc! { "updated_at": updated_at };
        if let Some(nombre) = &changes.nombre {
            set.insert("nombre", nombre.clone());
        }
        if let Some(descripcion) = &changes.descripcion {
            set.insert("descripcion", descripcion.clone());
        }
        if let Some(taxonomia) = &changes.taxonomia {
            set.insert("taxonomia", taxonomia.clone());
        }
        if let Some(activa) = changes.activa {
            set.insert("activa", activa);
        }

        let result = self
            .collection
            .update_one(doc! { "codigo": codigo }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(codigo = %codigo))]
    async fn delete_by_code(&self, codigo: &str) -> Result<bool, InfraError> {
        let result = self.collection.delete_one(doc! { "codigo": codigo }).await?;
        Ok(result.deleted_count > 0)
    }
}
