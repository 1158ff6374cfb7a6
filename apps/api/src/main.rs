//! # Agenda API サーバー
//!
//! 医療予約の基礎データ（専門分野・専門職）を MongoDB 上で管理する REST API。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `APP_ENV` | No | `development` / `production` / `testing`（デフォルト: `development`） |
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | No | ポート番号（デフォルト: `5000`） |
//! | `MONGO_URI` | 本番のみ | MongoDB 接続 URI |
//! | `MONGO_DB_NAME` | No | データベース名（デフォルト: `agenda`） |
//! | `SECRET_KEY` | 本番のみ | トークン署名鍵（本番は 32 文字以上） |
//! | `AUTH_USERS` | 本番のみ | `user:password` のカンマ区切り |
//! | `DEFAULT_PAGE_SIZE` / `MAX_PAGE_SIZE` | No | ページサイズ（デフォルト: 10 / 50） |
//! | `DB_TIMEOUT` / `REQUEST_TIMEOUT` | No | タイムアウト秒（デフォルト: 30 / 60） |
//! | `CORS_ORIGINS` | No | 許可オリジンのカンマ区切り（デフォルト: `*`） |
//!
//! ## 起動方法
//!
//! ```bash
//! APP_ENV=development MONGO_URI=mongodb://localhost:27017 cargo run -p agenda-api
//! ```

use std::{net::SocketAddr, sync::Arc};

use agenda_api::{
    app_builder::{AppDependencies, build_app},
    config::AppConfig,
};
use agenda_domain::clock::SystemClock;
use agenda_infra::{
    JwtTokenService,
    StaticCredentials,
    db::{self, MongoProbe},
    repository::{MongoProfessionalRepository, MongoSpecialtyRepository},
    token::DEFAULT_TOKEN_TTL_SECS,
};
use agenda_shared::observability::{TracingConfig, init_tracing};
use chrono::TimeDelta;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("agenda-api");
    init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "agenda-api").entered();

    let config = AppConfig::from_env()?;
    config.validate()?;

    tracing::info!(
        environment = config.environment.as_str(),
        "Agenda API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let client = db::connect(&config.mongo_uri, config.db_timeout).await?;
    let database = client.database(&config.mongo_db_name);
    db::ensure_indexes(&database).await?;
    tracing::info!(database = %config.mongo_db_name, "MongoDB に接続しました");

    let deps = AppDependencies {
        specialties:   Arc::new(MongoSpecialtyRepository::new(&database)),
        professionals: Arc::new(MongoProfessionalRepository::new(&database)),
        probe:         Arc::new(MongoProbe::new(database)),
        credentials:   Arc::new(StaticCredentials::new(config.auth_users.clone())),
        tokens:        Arc::new(JwtTokenService::new(
            &config.secret_key,
            TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
        )),
        clock:         Arc::new(SystemClock),
    };
    let app = build_app(&config, deps);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Agenda API サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
