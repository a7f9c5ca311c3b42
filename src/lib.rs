pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
pub mod store;
pub mod templates;
pub mod validation;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{catalog::MovieCatalog, config::Config, storage::FileArea, store::MovieStore};

pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: MovieCatalog,
}

pub async fn init_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let db = db::connect_and_migrate(&config.database_url).await?;

    let files = FileArea::new(&config.images_dir);
    files
        .ensure_root()
        .await
        .with_context(|| format!("creating {}", config.images_dir.display()))?;

    let catalog = MovieCatalog::new(MovieStore::new(db), files);
    Ok(Arc::new(AppState { config: Arc::new(config), catalog }))
}

pub fn app(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.catalog.files().root());
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route("/movies", get(routes::index).post(routes::store))
        .route("/movies/create", get(routes::create_form))
        .route("/movies/data", get(routes::data))
        .route(
            "/movies/{id}",
            get(routes::detail)
                .put(routes::update)
                .patch(routes::update)
                .post(routes::update)
                .delete(routes::destroy),
        )
        .route("/movies/{id}/edit", get(routes::edit_form))
        .route("/movies/{id}/delete", post(routes::destroy))
        .nest_service("/images", images)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
