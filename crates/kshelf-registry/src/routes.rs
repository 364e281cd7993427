//! HTTP routes for the registry API
//!
//! | Method | Path              | Body      | Response  |
//! |--------|-------------------|-----------|-----------|
//! | GET    | `/package`        |           | `Results` |
//! | GET    | `/package/{name}` |           | `Package` |
//! | POST   | `/package`        | `Package` | `Package` |
//! | POST   | `/package/{name}` | `Release` | `Package` |
//! | GET    | `/health`         |           | status    |

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    routing::get,
};
use kshelf_core::{Package, Release, Results};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::{RegistryError, Result};
use crate::service::RegistryService;

/// Build the registry router
pub fn router(service: Arc<RegistryService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/package", get(list_packages).post(create_package))
        .route("/package/{name}", get(get_package).post(add_release))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the registry on an already-bound listener until the future is dropped
pub async fn serve(listener: TcpListener, service: Arc<RegistryService>) -> std::io::Result<()> {
    axum::serve(listener, router(service)).await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// JSON request body; malformed input is reported with the standard error body
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RegistryError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

async fn list_packages(State(service): State<Arc<RegistryService>>) -> Result<Json<Results>> {
    Ok(Json(service.list().await?))
}

async fn get_package(
    State(service): State<Arc<RegistryService>>,
    Path(name): Path<String>,
) -> Result<Json<Package>> {
    Ok(Json(service.get_by_name(&name).await?))
}

async fn create_package(
    State(service): State<Arc<RegistryService>>,
    ApiJson(package): ApiJson<Package>,
) -> Result<(StatusCode, Json<Package>)> {
    let created = service.create(package).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn add_release(
    State(service): State<Arc<RegistryService>>,
    Path(name): Path<String>,
    ApiJson(release): ApiJson<Release>,
) -> Result<Json<Package>> {
    Ok(Json(service.add_release(&name, release).await?))
}
