//! # テスト用モックリポジトリ
//!
//! ハンドラ・ユースケースのテストで使うインメモリ実装。
//! `test-utils` feature を有効にすると他クレートからも利用できる。
//!
//! ```toml
//! [dev-dependencies]
//! agenda-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 一意キーの重複は MongoDB と同じく [`InfraError::duplicate_key`] で返す。
//! `failing` で生成したモックは全操作で指定のエラーを返す。

use std::sync::{Arc, Mutex};

use agenda_domain::{
   RecordId,
   professional::{NewProfessional, Professional, ProfessionalChanges},
   specialty::{NewSpecialty, Specialty, SpecialtyChanges},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::{
   db::DatabaseProbe,
   error::InfraError,
   repository::{ProfessionalRepository, SpecialtyRepository},
};

fn new_id() -> RecordId {
   RecordId::new(ObjectId::new().to_hex())
}

// ===== MockSpecialtyRepository =====

#[derive(Clone, Default)]
pub struct MockSpecialtyRepository {
   specialties: Arc<Mutex<Vec<Specialty>>>,
   failure:     Option<fn() -> InfraError>,
}

impl MockSpecialtyRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 全操作で `failure()` のエラーを返すモック
   pub fn failing(failure: fn() -> InfraError) -> Self {
      Self {
         failure: Some(failure),
         ..Self::default()
      }
   }

   pub fn add(&self, specialty: Specialty) {
      self.specialties.lock().unwrap().push(specialty);
   }

   /// 現在の内容（検証用）
   pub fn snapshot(&self) -> Vec<Specialty> {
      self.specialties.lock().unwrap().clone()
   }

   fn check(&self) -> Result<(), InfraError> {
      match self.failure {
         Some(failure) => Err(failure()),
         None => Ok(()),
      }
   }
}

#[async_trait]
impl SpecialtyRepository for MockSpecialtyRepository {
   async fn find_all(&self) -> Result<Vec<Specialty>, InfraError> {
      self.check()?;
      Ok(self.snapshot())
   }

   async fn count(&self) -> Result<u64, InfraError> {
      self.check()?;
      Ok(self.specialties.lock().unwrap().len() as u64)
   }

   async fn insert(&self, new: NewSpecialty, now: DateTime<Utc>) -> Result<Specialty, InfraError> {
      self.check()?;
      let mut specialties = self.specialties.lock().unwrap();
      if specialties.iter().any(|s| s.codigo == new.codigo) {
         return Err(InfraError::duplicate_key(format!(
            "E11000 duplicate key codigo: {}",
            new.codigo
         )));
      }
      let specialty = Specialty::from_new(new_id(), new, now);
      specialties.push(specialty.clone());
      Ok(specialty)
   }

   async fn update_by_code(
      &self,
      codigo: &str,
      changes: &SpecialtyChanges,
      now: DateTime<Utc>,
   ) -> Result<bool, InfraError> {
      self.check()?;
      let mut specialties = self.specialties.lock().unwrap();
      match specialties.iter_mut().find(|s| s.codigo == codigo) {
         Some(specialty) => {
            specialty.apply(changes, now);
            Ok(true)
         }
         None => Ok(false),
      }
   }

   async fn delete_by_code(&self, codigo: &str) -> Result<bool, InfraError> {
      self.check()?;
      let mut specialties = self.specialties.lock().unwrap();
      let before = specialties.len();
      specialties.retain(|s| s.codigo != codigo);
      Ok(specialties.len() < before)
   }
}

// ===== MockProfessionalRepository =====

#[derive(Clone, Default)]
pub struct MockProfessionalRepository {
   professionals: Arc<Mutex<Vec<Professional>>>,
   failure:       Option<fn() -> InfraError>,
}

impl MockProfessionalRepository {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn failing(failure: fn() -> InfraError) -> Self {
      Self {
         failure: Some(failure),
         ..Self::default()
      }
   }

   pub fn snapshot(&self) -> Vec<Professional> {
      self.professionals.lock().unwrap().clone()
   }

   fn check(&self) -> Result<(), InfraError> {
      match self.failure {
         Some(failure) => Err(failure()),
         None => Ok(()),
      }
   }
}

#[async_trait]
impl ProfessionalRepository for MockProfessionalRepository {
   async fn find_page(&self, offset: u64, limit: u64) -> Result<Vec<Professional>, InfraError> {
      self.check()?;
      Ok(self
         .professionals
         .lock()
         .unwrap()
         .iter()
         .skip(usize::try_from(offset).unwrap_or(usize::MAX))
         .take(usize::try_from(limit).unwrap_or(usize::MAX))
         .cloned()
         .collect())
   }

   async fn count(&self) -> Result<u64, InfraError> {
      self.check()?;
      Ok(self.professionals.lock().unwrap().len() as u64)
   }

   async fn insert(
      &self,
      new: NewProfessional,
      now: DateTime<Utc>,
   ) -> Result<Professional, InfraError> {
      self.check()?;
      let mut professionals = self.professionals.lock().unwrap();
      if professionals.iter().any(|p| p.rut == new.rut) {
         return Err(InfraError::duplicate_key(format!(
            "E11000 duplicate key rut: {}",
            new.rut
         )));
      }
      let professional = Professional::from_new(new_id(), new, now);
      professionals.push(professional.clone());
      Ok(professional)
   }

   async fn update_by_rut(
      &self,
      rut: &str,
      changes: &ProfessionalChanges,
      now: DateTime<Utc>,
   ) -> Result<bool, InfraError> {
      self.check()?;
      let mut professionals = self.professionals.lock().unwrap();
      match professionals.iter_mut().find(|p| p.rut == rut) {
         Some(professional) => {
            professional.apply(changes, now);
            Ok(true)
         }
         None => Ok(false),
      }
   }

   async fn delete_by_rut(&self, rut: &str) -> Result<bool, InfraError> {
      self.check()?;
      let mut professionals = self.professionals.lock().unwrap();
      let before = professionals.len();
      professionals.retain(|p| p.rut != rut);
      Ok(professionals.len() < before)
   }
}

// ===== MockDatabaseProbe =====

/// `healthy` が `false` なら `Unavailable` を返す
#[derive(Debug, Clone, Copy)]
pub struct MockDatabaseProbe {
   healthy: bool,
}

impl MockDatabaseProbe {
   pub fn healthy() -> Self {
      Self { healthy: true }
   }

   pub fn unreachable() -> Self {
      Self { healthy: false }
   }
}

#[async_trait]
impl DatabaseProbe for MockDatabaseProbe {
   async fn ping(&self) -> Result<(), InfraError> {
      if self.healthy {
         Ok(())
      } else {
         Err(InfraError::unavailable("server selection timeout"))
      }
   }
}
