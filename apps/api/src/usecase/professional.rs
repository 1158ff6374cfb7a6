//! 専門職ユースケース
//!
//! 一覧はページ単位で返す。更新・削除は正規化済みの `rut` で照合する。

use std::sync::Arc;

use agenda_domain::{
   ValidationErrors,
   clock::Clock,
   normalize,
   professional::{Professional, ProfessionalSchema},
   record,
};
use agenda_infra::{InfraErrorKind, repository::ProfessionalRepository};
use agenda_shared::PageRequest;
use serde_json::Value;

use crate::error::ApiError;

const NOT_FOUND: &str = "Profesional no encontrado";
const RUT_REQUIRED: &str = "El RUT es obligatorio";

/// 1 ページ分の専門職と総件数
#[derive(Debug)]
pub struct ProfessionalPage {
   pub items: Vec<Professional>,
   pub total: u64,
}

/// 専門職ユースケース
pub struct ProfessionalUseCaseImpl {
   repository: Arc<dyn ProfessionalRepository>,
   clock:      Arc<dyn Clock>,
}

impl ProfessionalUseCaseImpl {
   pub fn new(repository: Arc<dyn ProfessionalRepository>, clock: Arc<dyn Clock>) -> Self {
      Self { repository, clock }
   }

   /// 指定ページの専門職と総件数を並行に取得する
   pub async fn list(&self, page: PageRequest) -> Result<ProfessionalPage, ApiError> {
      let (items, total) = tokio::join!(
         self.repository.find_page(page.offset(), page.per_page()),
         self.repository.count(),
      );
      Ok(ProfessionalPage {
         items: items?,
         total: total?,
      })
   }

   /// 専門職を作成する（`rut` の重複は 409）
   pub async fn create(&self, payload: Value) -> Result<Professional, ApiError> {
      let new = record::clean_new::<ProfessionalSchema>(payload)?;
      let rut = new.rut.clone();

      let professional = self
         .repository
         .insert(new, self.clock.now())
         .await
         .map_err(|err| match err.kind() {
            InfraErrorKind::DuplicateKey(_) => {
               ApiError::Conflict(format!("Ya existe un profesional con el RUT {rut}"))
            }
            _ => ApiError::Infra(err),
         })?;

      tracing::info!(id = %professional.id, rut = %professional.rut, "profesional creado");
      Ok(professional)
   }

   /// `rut` で照合して部分更新する。`rut` 自体は書き換えない
   pub async fn update(&self, payload: Value) -> Result<(), ApiError> {
      let changes = record::clean_changes::<ProfessionalSchema>(payload)?;
      let Some(rut) = changes.rut.as_deref() else {
         return Err(ApiError::Validation(ValidationErrors::single(
            "rut",
            RUT_REQUIRED,
         )));
      };

      let matched = self
         .repository
         .update_by_rut(rut, &changes, self.clock.now())
         .await?;
      if !matched {
         return Err(ApiError::NotFound(NOT_FOUND.to_string()));
      }

      tracing::info!(rut = %rut, "profesional actualizado");
      Ok(())
   }

   /// パスの RUT は書式付き（`12.345.678-5`）でも受け付ける
   pub async fn delete(&self, rut: &str) -> Result<(), ApiError> {
      let rut = normalize::clean_rut(rut);
      let deleted = self.repository.delete_by_rut(&rut).await?;
      if !deleted {
         return Err(ApiError::NotFound(NOT_FOUND.to_string()));
      }

      tracing::info!(rut = %rut, "profesional eliminado");
      Ok(())
   }
}
