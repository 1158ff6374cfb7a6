//! 専門分野ユースケース
//!
//! 正規化 → 検証 → 永続化の順で専門分野を作成・更新する。
//! 更新と削除は一意キー `codigo` で対象を特定する。

use std::sync::Arc;

use agenda_domain::{
   ValidationErrors,
   clock::Clock,
   record,
   specialty::{Specialty, SpecialtySchema},
};
use agenda_infra::{InfraErrorKind, repository::SpecialtyRepository};
use serde_json::Value;

use crate::error::ApiError;

const NOT_FOUND: &str = "Especialidad no encontrada";
const EMPTY_LIST: &str = "No hay especialidades registradas";
const CODE_REQUIRED: &str = "El código de la especialidad es obligatorio";

/// 専門分野ユースケース
pub struct SpecialtyUseCaseImpl {
   repository: Arc<dyn SpecialtyRepository>,
   clock:      Arc<dyn Clock>,
}

impl SpecialtyUseCaseImpl {
   pub fn new(repository: Arc<dyn SpecialtyRepository>, clock: Arc<dyn Clock>) -> Self {
      Self { repository, clock }
   }

   /// 全件を取得する。0 件なら 404
   pub async fn list(&self) -> Result<Vec<Specialty>, ApiError> {
      let specialties = self.repository.find_all().await?;
      if specialties.is_empty() {
         return Err(ApiError::NotFound(EMPTY_LIST.to_string()));
      }
      Ok(specialties)
   }

   pub async fn count(&self) -> Result<u64, ApiError> {
      Ok(self.repository.count().await?)
   }

   /// 専門分野を作成する
   ///
   /// 1. ペイロードの前提条件（空でないオブジェクト）
   /// 2. 正規化と作成用の検証
   /// 3. 挿入（`codigo` の重複は 409）
   pub async fn create(&self, payload: Value) -> Result<Specialty, ApiError> {
      let new = record::clean_new::<SpecialtySchema>(payload)?;
      let codigo = new.codigo.clone();

      let specialty = self
         .repository
         .insert(new, self.clock.now())
         .await
         .map_err(|err| match err.kind() {
            InfraErrorKind::DuplicateKey(_) => {
               ApiError::Conflict(format!("Ya existe una especialidad con el código {codigo}"))
            }
            _ => ApiError::Infra(err),
         })?;

      tracing::info!(id = %specialty.id, codigo = %specialty.codigo, "especialidad creada");
      Ok(specialty)
   }

   /// `codigo` で照合して部分更新する
   ///
   /// 部分モードで検証するが、照合キーの `codigo` だけは必須。
   /// `codigo` 自体は書き換えない。
   pub async fn update(&self, payload: Value) -> Result<(), ApiError> {
      let changes = record::clean_changes::<SpecialtySchema>(payload)?;
      let Some(codigo) = changes.codigo.as_deref() else {
         return Err(ApiError::Validation(ValidationErrors::single(
            "codigo",
            CODE_REQUIRED,
         )));
      };

      let matched = self
         .repository
         .update_by_code(codigo, &changes, self.clock.now())
         .await?;
      if !matched {
         return Err(ApiError::NotFound(NOT_FOUND.to_string()));
      }

      tracing::info!(codigo = %codigo, "especialidad actualizada");
      Ok(())
   }

   pub async fn delete(&self, codigo: &str) -> Result<(), ApiError> {
      let deleted = self.repository.delete_by_code(codigo.trim()).await?;
      if !deleted {
         return Err(ApiError::NotFound(NOT_FOUND.to_string()));
      }

      tracing::info!(codigo = %codigo, "especialidad eliminada");
      Ok(())
   }
}
