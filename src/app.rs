/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (pet store, revocation store, access gate) → Router 組み立て
 * - Middleware の適用 (access gate / CORS / HTTP)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::{InMemoryPetStore, PetStore, PgPetStore};
use crate::services::auth::factory;
use crate::state::{AppState, GroupNames};
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG=info,pet_app_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting pet app API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_pet_store(config: &Config) -> Result<Arc<dyn PetStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await?;
            Ok(Arc::new(PgPetStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; pets are kept in process memory");
            Ok(Arc::new(InMemoryPetStore::new()))
        }
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pets = build_pet_store(config).await?;

    // The gate reads and the recorder writes the same revocation store.
    let revocations = factory::build_revocation_store(config).await?;
    let access = factory::build_access_gate(config, revocations.clone())?;
    let sign_out = factory::build_sign_out_recorder(config, revocations);

    let groups = GroupNames {
        admins: config.auth.admins_group_name.clone(),
        users: config.auth.users_group_name.clone(),
    };

    Ok(AppState::new(access, sign_out, pets, groups))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
