//! Pet HTTP Routes
//!
//! Endpoints mounted under `/martin/pets`:
//!
//! | Method | Path                    | Success               | Missing id                 |
//! |--------|-------------------------|-----------------------|----------------------------|
//! | POST   | `/`                     | 201 + stored pet      | -                          |
//! | POST   | `/bulk`                 | 201 + stored pets     | -                          |
//! | GET    | `/`                     | 200 + all pets        | -                          |
//! | GET    | `/{id}`                 | 200 + pet             | 404, empty body            |
//! | PUT    | `/{id}`                 | 200 + stored pet      | 404 `{"error":"Pet not found"}` |
//! | DELETE | `/{id}`                 | 200 + confirmation    | 404 `{"error":"Pet not found"}` |
//! | GET    | `/search/{key}`         | 200 + matching pets   | -                          |
//! | GET    | `/search/price/{price}` | 200 + matching pets   | -                          |

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use petstore_core::{core_version, Pet, PetDraft, PetId};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Base path for the pet catalog.
pub const PETS_BASE_PATH: &str = "/martin/pets";

pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pet).get(list_pets))
        .route("/bulk", post(create_pets_bulk))
        .route("/:id", get(get_pet).put(update_pet).delete(delete_pet))
        .route("/search/:key", get(search_by_keyword))
        .route("/search/price/:price", get(search_by_max_price))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": core_version() }))
}

async fn create_pet(
    State(state): State<AppState>,
    payload: Result<Json<PetDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    let Json(draft) = payload?;
    let pet = state
        .with_service(move |service| service.create(&draft))
        .await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn create_pets_bulk(
    State(state): State<AppState>,
    payload: Result<Json<Vec<PetDraft>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Pet>>), ApiError> {
    let Json(drafts) = payload?;
    let pets = state
        .with_service(move |service| service.create_bulk(&drafts))
        .await?;
    Ok((StatusCode::CREATED, Json(pets)))
}

async fn list_pets(State(state): State<AppState>) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = state.with_service(|service| service.list()).await?;
    Ok(Json(pets))
}

async fn get_pet(
    State(state): State<AppState>,
    id: Result<Path<PetId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let pet = state.with_service(move |service| service.get(id)).await?;
    Ok(match pet {
        Some(pet) => Json(pet).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

async fn update_pet(
    State(state): State<AppState>,
    id: Result<Path<PetId>, PathRejection>,
    payload: Result<Json<PetDraft>, JsonRejection>,
) -> Result<Json<Pet>, ApiError> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    state
        .with_service(move |service| service.update(id, draft))
        .await?
        .map(Json)
        .ok_or(ApiError::PetNotFound)
}

async fn delete_pet(
    State(state): State<AppState>,
    id: Result<Path<PetId>, PathRejection>,
) -> Result<String, ApiError> {
    let Path(id) = id?;
    let deleted = state.with_service(move |service| service.delete(id)).await?;
    if !deleted {
        return Err(ApiError::PetNotFound);
    }
    Ok(format!("Pet with id {{{id}}} deleted."))
}

async fn search_by_keyword(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let Path(key) = key?;
    let pets = state
        .with_service(move |service| service.search_by_keyword(&key))
        .await?;
    Ok(Json(pets))
}

/// `Infinity` and `NaN` parse as `f64` but are refused with 400 by the
/// filter, rather than meaning "no ceiling".
async fn search_by_max_price(
    State(state): State<AppState>,
    price: Result<Path<f64>, PathRejection>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let Path(price) = price?;
    let pets = state
        .with_service(move |service| service.search_by_max_price(price))
        .await?;
    Ok(Json(pets))
}
