//! # ルートハンドラ
//!
//! `GET /` で API の案内と登録済み専門分野の件数を返す。

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::SpecialtyState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub mensaje:              String,
    pub version:              String,
    pub total_especialidades: u64,
}

/// GET /
pub async fn index(
    State(state): State<Arc<SpecialtyState>>,
) -> Result<Json<IndexResponse>, ApiError> {
    let total_especialidades = state.usecase.count().await?;

    Ok(Json(IndexResponse {
        mensaje: "Bienvenido a la API de Agenda Universal".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_especialidades,
    }))
}
