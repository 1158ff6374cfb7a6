//! # 専門分野ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /especialidades` - 全件取得（Bearer 認証）
//! - `POST /especialidades` - 作成
//! - `PUT /especialidades` - `codigo` で照合して部分更新
//! - `DELETE /especialidades/{codigo}` - 削除

use std::sync::Arc;

use agenda_domain::specialty::Specialty;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use super::{MessageResponse, parse_payload};
use crate::{error::ApiError, usecase::SpecialtyUseCaseImpl};

/// 専門分野 API の共有状態
pub struct SpecialtyState {
    pub usecase: SpecialtyUseCaseImpl,
}

// --- レスポンス型 ---

/// 一覧の要素 DTO（`_id` は 16 進文字列）
#[derive(Debug, Serialize)]
pub struct SpecialtyDto {
    #[serde(rename = "_id")]
    pub id:          String,
    pub codigo:      String,
    pub nombre:      String,
    pub descripcion: Option<String>,
    pub taxonomia:   Vec<String>,
    pub activa:      bool,
    pub created_at:  String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at:  Option<String>,
}

impl From<Specialty> for SpecialtyDto {
    fn from(specialty: Specialty) -> Self {
        Self {
            id:          specialty.id.to_string(),
            codigo:      specialty.codigo,
            nombre:      specialty.nombre,
            descripcion: specialty.descripcion,
            taxonomia:   specialty.taxonomia,
            activa:      specialty.activa,
            created_at:  specialty.created_at.to_rfc3339(),
            updated_at:  specialty.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// 作成レスポンス
#[derive(Debug, Serialize)]
pub struct CreatedSpecialtyDto {
    pub id:         String,
    pub nombre:     String,
    pub codigo:     String,
    pub created_at: String,
}

// --- ハンドラ ---

/// GET /especialidades
///
/// 0 件なら 404 `No hay especialidades registradas`。
pub async fn list_specialties(
    State(state): State<Arc<SpecialtyState>>,
) -> Result<impl IntoResponse, ApiError> {
    let specialties = state.usecase.list().await?;
    let items: Vec<SpecialtyDto> = specialties.into_iter().map(SpecialtyDto::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

/// POST /especialidades
///
/// ## レスポンス
///
/// - `201 Created`: `{id, nombre, codigo, created_at}`
/// - `400 Bad Request`: 本文が空、または JSON でない
/// - `409 Conflict`: `codigo` の重複
/// - `422 Unprocessable Entity`: 入力検証エラー
pub async fn create_specialty(
    State(state): State<Arc<SpecialtyState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_payload(&body)?;
    let specialty = state.usecase.create(payload).await?;

    let response = CreatedSpecialtyDto {
        id:         specialty.id.to_string(),
        nombre:     specialty.nombre,
        codigo:     specialty.codigo,
        created_at: specialty.created_at.to_rfc3339(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /especialidades
///
/// 本文の `codigo` で対象を特定し、指定されたフィールドだけを更新する。
pub async fn update_specialty(
    State(state): State<Arc<SpecialtyState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_payload(&body)?;
    state.usecase.update(payload).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Especialidad actualizada exitosamente")),
    ))
}

/// DELETE /especialidades/{codigo}
pub async fn delete_specialty(
    State(state): State<Arc<SpecialtyState>>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.usecase.delete(&codigo).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Especialidad eliminada exitosamente")),
    ))
}

#[cfg(test)]
mod tests {
    use agenda_domain::clock::FixedClock;
    use agenda_infra::{InfraError, mock::MockSpecialtyRepository};
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::{delete, get},
    };
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app(repository: MockSpecialtyRepository) -> Router {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        let state = Arc::new(SpecialtyState {
            usecase: SpecialtyUseCaseImpl::new(Arc::new(repository), Arc::new(clock)),
        });
        Router::new()
            .route(
                "/especialidades",
                get(list_specialties)
                    .post(create_specialty)
                    .put(update_specialty),
            )
            .route("/especialidades/{codigo}", delete(delete_specialty))
            .with_state(state)
    }

    async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_作成すると201で識別子と正規化後の名前を返す() {
        let (status, body) = send(
            app(MockSpecialtyRepository::new()),
            Method::POST,
            "/especialidades",
            r#"{"nombre": "cardiología", "codigo": "CAR001"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["nombre"], "Cardiología");
        assert_eq!(body["codigo"], "CAR001");
        assert_eq!(body["created_at"], "2025-06-01T12:00:00+00:00");
        assert_eq!(body["id"].as_str().map(str::len), Some(24));
    }

    #[tokio::test]
    async fn test_空の本文は400() {
        let (status, body) = send(
            app(MockSpecialtyRepository::new()),
            Method::POST,
            "/especialidades",
            "",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No se enviaron datos");
    }

    #[tokio::test]
    async fn test_検証エラーは422でフィールド別に返す() {
        let (status, body) = send(
            app(MockSpecialtyRepository::new()),
            Method::POST,
            "/especialidades",
            r#"{"descripcion": 5}"#,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["nombre"],
            json!(["El nombre de la especialidad es obligatorio"])
        );
        assert_eq!(
            body["errors"]["codigo"],
            json!(["El código de la especialidad es obligatorio"])
        );
        assert_eq!(body["errors"]["descripcion"], json!(["Debe ser un texto"]));
    }

    #[tokio::test]
    async fn test_一覧は_idを文字列で返す() {
        let repository = MockSpecialtyRepository::new();
        let router = app(repository.clone());
        send(
            router.clone(),
            Method::POST,
            "/especialidades",
            r#"{"nombre": "Neurología", "codigo": "NEU001", "taxonomia": ["Cerebro"]}"#,
        )
        .await;

        let (status, body) = send(router, Method::GET, "/especialidades", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["_id"], repository.snapshot()[0].id.to_string());
        assert_eq!(body[0]["taxonomia"], json!(["cerebro"]));
        assert_eq!(body[0]["activa"], true);
        assert!(body[0].get("updated_at").is_none());
    }

    #[tokio::test]
    async fn test_一覧が空なら404() {
        let (status, body) = send(
            app(MockSpecialtyRepository::new()),
            Method::GET,
            "/especialidades",
            "",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No hay especialidades registradas");
    }

    #[tokio::test]
    async fn test_存在しないcodigoの更新は404() {
        let (status, body) = send(
            app(MockSpecialtyRepository::new()),
            Method::PUT,
            "/especialidades",
            r#"{"codigo": "NADA", "nombre": "Nada"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Especialidad no encontrada");
    }

    #[tokio::test]
    async fn test_削除成功でメッセージを返す() {
        let router = app(MockSpecialtyRepository::new());
        send(
            router.clone(),
            Method::POST,
            "/especialidades",
            r#"{"nombre": "Pediatría", "codigo": "PED001"}"#,
        )
        .await;

        let (status, body) = send(router, Method::DELETE, "/especialidades/PED001", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": "Especialidad eliminada exitosamente" })
        );
    }

    #[tokio::test]
    async fn test_ストアのタイムアウトは504() {
        let (status, body) = send(
            app(MockSpecialtyRepository::failing(|| InfraError::timeout("lento"))),
            Method::GET,
            "/especialidades",
            "",
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["status"], 504);
    }
}
