//! # ProfessionalRepository
//!
//! `profesionales` コレクションへの永続化を担当する。
//! 一覧はページ単位で取得し、更新・削除は `rut` で照合する。

use agenda_domain::{
    RecordId,
    professional::{NewProfessional, Professional, ProfessionalChanges, ScheduleEntry},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt as _;
use mongodb::{
    Collection,
    Database,
    bson::{Document, doc, oid::ObjectId, to_bson},
};
use serde::{Deserialize, Serialize};

use crate::{db, error::InfraError};

/// 専門職リポジトリトレイト
#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    /// `offset` 件を読み飛ばし、最大 `limit` 件を登録順に取得する
    async fn find_page(&self, offset: u64, limit: u64) -> Result<Vec<Professional>, InfraError>;

    async fn count(&self) -> Result<u64, InfraError>;

    async fn insert(
        &self,
        new: NewProfessional,
        now: DateTime<Utc>,
    ) -> Result<Professional, InfraError>;

    /// `rut` で照合して部分更新する。照合できたら `true`
    async fn update_by_rut(
        &self,
        rut: &str,
        changes: &ProfessionalChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// `rut` で照合して削除する。削除できたら `true`
    async fn delete_by_rut(&self, rut: &str) -> Result<bool, InfraError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfessionalDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id:                   Option<ObjectId>,
    rut:                  String,
    nombre:               String,
    apellido:             String,
    especialidad_id:      String,
    telefono:             String,
    email:                String,
    #[serde(default)]
    direccion:            Option<String>,
    horarios:             Vec<ScheduleEntry>,
    #[serde(default = "default_available")]
    disponible:           bool,
    #[serde(default)]
    registro_profesional: Option<String>,
    #[serde(default)]
    experiencia_anos:     Option<u8>,
    #[serde(default)]
    foto_url:             Option<String>,
    created_at:           DateTime<Utc>,
    #[serde(default)]
    updated_at:           Option<DateTime<Utc>>,
}

fn default_available() -> bool {
    true
}

impl ProfessionalDocument {
    fn from_new(new: &NewProfessional, now: DateTime<Utc>) -> Self {
        Self {
            id:                   None,
            rut:                  new.rut.clone(),
            nombre:               new.nombre.clone(),
            apellido:             new.apellido.clone(),
            especialidad_id:      new.especialidad_id.clone(),
            telefono:             new.telefono.clone(),
            email:                new.email.clone(),
            direccion:            new.direccion.clone(),
            horarios:             new.horarios.clone(),
            disponible:           new.disponible,
            registro_profesional: new.registro_profesional.clone(),
            experiencia_anos:     new.experiencia_anos,
            foto_url:             new.foto_url.clone(),
            created_at:           now,
            updated_at:           None,
        }
    }

    fn into_domain(self) -> Result<Professional, InfraError> {
        let id = self
            .id
            .ok_or_else(|| InfraError::unexpected("profesional sin _id"))?;
        Ok(Professional {
            id:                   RecordId::new(id.to_hex()),
            rut:                  self.rut,
            nombre:               self.nombre,
            apellido:             self.apellido,
            especialidad_id:      self.especialidad_id,
            telefono:             self.telefono,
            email:                self.email,
            direccion:            self.direccion,
            horarios:             self.horarios,
            disponible:           self.disponible,
            registro_profesional: self.registro_profesional,
            experiencia_anos:     self.experiencia_anos,
            foto_url:             self.foto_url,
            created_at:           self.created_at,
            updated_at:           self.updated_at,
        })
    }
}

/// 変更内容から `$set` ドキュメントを組み立てる
fn set_document(changes: &ProfessionalChanges, now: DateTime<Utc>) -> Result<Document, InfraError> {
    let updated_at = to_bson(&now)?;
    let mut set = doc! { "updated_at": updated_at };

    let texts = [
        ("nombre", &changes.nombre),
        ("apellido", &changes.apellido),
        ("especialidad_id", &changes.especialidad_id),
        ("telefono", &changes.telefono),
        ("email", &changes.email),
        ("direccion", &changes.direccion),
        ("registro_profesional", &changes.registro_profesional),
        ("foto_url", &changes.foto_url),
    ];
    for (field, value) in texts {
        if let Some(value) = value {
            set.insert(field, value.clone());
        }
    }
    if let Some(horarios) = &changes.horarios {
        set.insert("horarios", to_bson(horarios)?);
    }
    if let Some(disponible) = changes.disponible {
        set.insert("disponible", disponible);
    }
    if let Some(years) = changes.experiencia_anos {
        set.insert("experiencia_anos", i32::from(years));
    }
    Ok(set)
}

/// MongoDB 実装の ProfessionalRepository
#[derive(Debug, Clone)]
pub struct MongoProfessionalRepository {
    collection: Collection<ProfessionalDocument>,
}

impl MongoProfessionalRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(db::PROFESSIONALS),
        }
    }
}

#[async_trait]
impl ProfessionalRepository for MongoProfessionalRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(offset = offset, limit = limit))]
    async fn find_page(&self, offset: u64, limit: u64) -> Result<Vec<Professional>, InfraError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let documents: Vec<ProfessionalDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(offset)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(ProfessionalDocument::into_domain)
            .collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count(&self) -> Result<u64, InfraError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(rut = %new.rut))]
    async fn insert(
        &self,
        new: NewProfessional,
        now: DateTime<Utc>,
    ) -> Result<Professional, InfraError> {
        let document = ProfessionalDocument::from_new(&new, now);
        let result = self.collection.insert_one(&document).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| InfraError::unexpected("inserted_id no es un ObjectId"))?;

        Ok(Professional::from_new(RecordId::new(id.to_hex()), new, now))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(rut = %rut))]
    async fn update_by_rut(
        &self,
        rut: &str,
        changes: &ProfessionalChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let set = set_document(changes, now)?;
        let result = self
            .collection
            .update_one(doc! { "rut": rut }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(rut = %rut))]
    async fn delete_by_rut(&self, rut: &str) -> Result<bool, InfraError> {
        let result = self.collection.delete_one(doc! { "rut": rut }).await?;
        Ok(result.deleted_count > 0)
    }
}
