//! # 専門職ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /profesionales?page=&per_page=` - ページ単位の一覧（Bearer 認証）
//! - `POST /profesionales` - 作成
//! - `PUT /profesionales` - `rut` で照合して部分更新
//! - `DELETE /profesionales/{rut}` - 削除

use std::sync::Arc;

use agenda_domain::professional::{Professional, ScheduleEntry, Weekday};
use chrono::{NaiveTime, Timelike};
use agenda_shared::{PageRequest, PaginatedResponse};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{MessageResponse, parse_payload};
use crate::{error::ApiError, usecase::ProfessionalUseCaseImpl};

/// 専門職 API の共有状態
pub struct ProfessionalState {
    pub usecase:           ProfessionalUseCaseImpl,
    pub default_page_size: u64,
    pub max_page_size:     u64,
}

/// 一覧のクエリパラメータ
///
/// 数値として読めない値は未指定として扱い、既定値にフォールバックする。
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page:     Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    fn to_request(&self, default_per_page: u64, max_per_page: u64) -> PageRequest {
        let parse = |value: Option<&str>| -> Option<u64> { value.and_then(|v| v.trim().parse().ok()) };
        PageRequest::new(
            parse(self.page.as_deref()),
            parse(self.per_page.as_deref()),
            default_per_page,
            max_per_page,
        )
    }
}

// --- レスポンス型 ---

#[derive(Debug, Serialize)]
pub struct ScheduleDto {
    pub dia:    Weekday,
    pub inicio: String,
    pub fin:    String,
    pub activo: bool,
}

impl From<ScheduleEntry> for ScheduleDto {
    fn from(entry: ScheduleEntry) -> Self {
        Self {
            dia:    entry.dia,
            inicio: format_time(entry.inicio),
            fin:    format_time(entry.fin),
            activo: entry.activo,
        }
    }
}

/// 秒が 0 なら `HH:MM`、そうでなければ `HH:MM:SS`
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// 一覧の要素 DTO
#[derive(Debug, Serialize)]
pub struct ProfessionalDto {
    #[serde(rename = "_id")]
    pub id:                   String,
    pub rut:                  String,
    pub nombre:               String,
    pub apellido:             String,
    pub especialidad_id:      String,
    pub telefono:             String,
    pub email:                String,
    pub direccion:            Option<String>,
    pub horarios:             Vec<ScheduleDto>,
    pub disponible:           bool,
    pub registro_profesional: Option<String>,
    pub experiencia_anos:     Option<u8>,
    pub foto_url:             Option<String>,
    pub created_at:           String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at:           Option<String>,
}

impl From<Professional> for ProfessionalDto {
    fn from(professional: Professional) -> Self {
        Self {
            id:                   professional.id.to_string(),
            rut:                  professional.rut,
            nombre:               professional.nombre,
            apellido:             professional.apellido,
            especialidad_id:      professional.especialidad_id,
            telefono:             professional.telefono,
            email:                professional.email,
            direccion:            professional.direccion,
            horarios:             professional.horarios.into_iter().map(ScheduleDto::from).collect(),
            disponible:           professional.disponible,
            registro_profesional: professional.registro_profesional,
            experiencia_anos:     professional.experiencia_anos,
            foto_url:             professional.foto_url,
            created_at:           professional.created_at.to_rfc3339(),
            updated_at:           professional.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// 作成レスポンス
#[derive(Debug, Serialize)]
pub struct CreatedProfessionalDto {
    pub id:         String,
    pub nombre:     String,
    pub apellido:   String,
    pub rut:        String,
    pub created_at: String,
}

// --- ハンドラ ---

/// GET /profesionales
///
/// 0 件でも 404 にはせず、空の `data` を返す。
pub async fn list_professionals(
    State(state): State<Arc<ProfessionalState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.to_request(state.default_page_size, state.max_page_size);
    let page = state.usecase.list(request).await?;

    let items = page.items.into_iter().map(ProfessionalDto::from).collect();
    Ok((
        StatusCode::OK,
        Json(PaginatedResponse::new(items, request, page.total)),
    ))
}

/// POST /profesionales
///
/// ## レスポンス
///
/// - `201 Created`: `{id, nombre, apellido, rut, created_at}`
/// - `409 Conflict`: `rut` の重複
/// - `422 Unprocessable Entity`: 入力検証エラー（`horarios.0.inicio` のようなキーを含む）
pub async fn create_professional(
    State(state): State<Arc<ProfessionalState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_payload(&body)?;
    let professional = state.usecase.create(payload).await?;

    let response = CreatedProfessionalDto {
        id:         professional.id.to_string(),
        nombre:     professional.nombre,
        apellido:   professional.apellido,
        rut:        professional.rut,
        created_at: professional.created_at.to_rfc3339(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /profesionales
pub async fn update_professional(
    State(state): State<Arc<ProfessionalState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_payload(&body)?;
    state.usecase.update(payload).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Profesional actualizado exitosamente")),
    ))
}

/// DELETE /profesionales/{rut}
pub async fn delete_professional(
    State(state): State<Arc<ProfessionalState>>,
    Path(rut): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.usecase.delete(&rut).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Profesional eliminado exitosamente")),
    ))
}
