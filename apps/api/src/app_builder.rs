//! # アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルート
//!
//! | メソッド | パス | 認証 |
//! |---------|------|------|
//! | GET | `/` | なし |
//! | GET | `/health`, `/health/ready` | なし |
//! | POST | `/auth/login` | なし |
//! | GET | `/especialidades` | Bearer |
//! | POST / PUT | `/especialidades` | なし |
//! | DELETE | `/especialidades/{codigo}` | なし |
//! | GET | `/profesionales` | Bearer |
//! | POST / PUT | `/profesionales` | なし |
//! | DELETE | `/profesionales/{rut}` | なし |

use std::sync::Arc;

use agenda_domain::clock::Clock;
use agenda_infra::{
    CredentialVerifier,
    TokenService,
    db::DatabaseProbe,
    repository::{ProfessionalRepository, SpecialtyRepository},
};
use agenda_shared::observability::{MakeRequestUuidV7, make_request_span};
use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::AppConfig,
    handler::{
        AuthState,
        ProfessionalState,
        ReadinessState,
        SpecialtyState,
        create_professional,
        create_specialty,
        delete_professional,
        delete_specialty,
        health_check,
        index,
        list_professionals,
        list_specialties,
        login,
        readiness_check,
        update_professional,
        update_specialty,
    },
    middleware::{BearerState, require_bearer},
    usecase::{AuthUseCaseImpl, ProfessionalUseCaseImpl, SpecialtyUseCaseImpl},
};

/// インフラ初期化済みの依存
///
/// 本番では MongoDB 実装、テストではモックを注入する。
pub struct AppDependencies {
    pub specialties:   Arc<dyn SpecialtyRepository>,
    pub professionals: Arc<dyn ProfessionalRepository>,
    pub probe:         Arc<dyn DatabaseProbe>,
    pub credentials:   Arc<dyn CredentialVerifier>,
    pub tokens:        Arc<dyn TokenService>,
    pub clock:         Arc<dyn Clock>,
}

/// DI コンテナの構築とルーター定義を行う
///
/// ユースケース → State → Router の順に組み立てる。
pub fn build_app(config: &AppConfig, deps: AppDependencies) -> Router {
    let auth_usecase = Arc::new(AuthUseCaseImpl::new(
        deps.credentials,
        deps.tokens,
        deps.clock.clone(),
    ));

    // Bearer ミドルウェアとログインハンドラは同じユースケースを共有する
    let bearer_state = BearerState {
        usecase: auth_usecase.clone(),
    };
    let auth_state = Arc::new(AuthState {
        usecase: auth_usecase,
    });

    let specialty_state = Arc::new(SpecialtyState {
        usecase: SpecialtyUseCaseImpl::new(deps.specialties, deps.clock.clone()),
    });

    let professional_state = Arc::new(ProfessionalState {
        usecase:           ProfessionalUseCaseImpl::new(deps.professionals, deps.clock),
        default_page_size: config.default_page_size,
        max_page_size:     config.max_page_size,
    });

    let readiness_state = Arc::new(ReadinessState { probe: deps.probe });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/auth/login", post(login))
                .with_state(auth_state),
        )
        .merge(
            Router::new()
                .route("/especialidades", get(list_specialties))
                .layer(from_fn_with_state(bearer_state.clone(), require_bearer))
                .with_state(specialty_state.clone()),
        )
        .merge(
            Router::new()
                .route("/", get(index))
                .route(
                    "/especialidades",
                    post(create_specialty).put(update_specialty),
                )
                .route("/especialidades/{codigo}", delete(delete_specialty))
                .with_state(specialty_state),
        )
        .merge(
            Router::new()
                .route("/profesionales", get(list_professionals))
                .layer(from_fn_with_state(bearer_state, require_bearer))
                .with_state(professional_state.clone()),
        )
        .merge(
            Router::new()
                .route(
                    "/profesionales",
                    post(create_professional).put(update_professional),
                )
                .route("/profesionales/{rut}", delete(delete_professional))
                .with_state(professional_state),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors_layer(&config.cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// `CORS_ORIGINS` から CORS レイヤーを作る
///
/// `*` を含む場合はすべてのオリジンを許可する。解釈できないオリジンは読み飛ばす。
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "CORS オリジンを解釈できません");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
