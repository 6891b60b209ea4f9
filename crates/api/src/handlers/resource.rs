//! Generic CRUD handlers, instantiated once per resource type at route
//! registration (`fetch_handler::<User>` etc.).
//!
//! The `*_by_id`/`create` functions hold the validation pipeline and only
//! talk to a [`DocumentStore`]; the `*_handler` wrappers adapt them to HTTP.

use actix_web::{web, HttpResponse};
use fitlog_domain::model::{Document, ObjectId, Resource};
use fitlog_domain::storage::DocumentStore;
use fitlog_domain::validation::is_valid_update;
use serde_json::{Map, Value};
use tracing::debug;

use crate::state::AppState;

use super::{observe, ApiError, Operation};

fn parse_id<R: Resource>(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw).map_err(|_| ApiError::InvalidIdentifier { kind: R::KIND })
}

pub async fn fetch_by_id<R: Resource>(
    store: &dyn DocumentStore<R>,
    raw_id: &str,
) -> Result<Document<R>, ApiError> {
    let id = parse_id::<R>(raw_id)?;
    store
        .find_document(&id)
        .await?
        .ok_or(ApiError::NotFound { kind: R::KIND })
}

pub async fn delete_by_id<R: Resource>(
    store: &dyn DocumentStore<R>,
    raw_id: &str,
) -> Result<(), ApiError> {
    let id = parse_id::<R>(raw_id)?;
    if store.delete_document(&id).await? {
        debug!(resource = %R::KIND, %id, "document deleted");
        Ok(())
    } else {
        Err(ApiError::NotFound { kind: R::KIND })
    }
}

pub async fn create<R: Resource>(
    store: &dyn DocumentStore<R>,
    payload: Value,
) -> Result<Document<R>, ApiError> {
    let document = store
        .insert_document(payload)
        .await
        .map_err(|err| ApiError::from_write(R::KIND, err))?;
    debug!(resource = %R::KIND, id = %document.id, "document created");
    Ok(document)
}

/// Checks run in a fixed order: id, emptiness, field names, then existence
/// and schema in the store.
pub async fn update_by_id<R: Resource>(
    store: &dyn DocumentStore<R>,
    raw_id: &str,
    patch: Map<String, Value>,
) -> Result<Document<R>, ApiError> {
    let id = parse_id::<R>(raw_id)?;
    if patch.is_empty() {
        return Err(ApiError::EmptyUpdate);
    }
    if !is_valid_update(&patch, R::FIELDS) {
        return Err(ApiError::InvalidUpdateFields);
    }
    store
        .update_document(&id, patch)
        .await
        .map_err(|err| ApiError::from_write(R::KIND, err))?
        .ok_or(ApiError::NotFound { kind: R::KIND })
}

pub async fn fetch_handler<R: Resource>(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let result = fetch_by_id::<R>(state.storage(), &path.into_inner()).await;
    observe(R::KIND, Operation::Fetch, &result);
    let body = enveloped::<R>(&result?)?;
    Ok(HttpResponse::Ok().json(body))
}

/// Renders a fetched document, wrapped under `R::ENVELOPE` when set.
fn enveloped<R: Resource>(document: &Document<R>) -> Result<Value, ApiError> {
    let value = serde_json::to_value(document)?;
    Ok(match R::ENVELOPE {
        Some(key) => {
            let mut wrapper = Map::new();
            wrapper.insert(key.to_string(), value);
            Value::Object(wrapper)
        }
        None => value,
    })
}

pub async fn delete_handler<R: Resource>(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let result = delete_by_id::<R>(state.storage(), &path.into_inner()).await;
    observe(R::KIND, Operation::Delete, &result);
    result?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn create_handler<R: Resource>(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let result = create::<R>(state.storage(), payload.into_inner()).await;
    observe(R::KIND, Operation::Create, &result);
    Ok(HttpResponse::Created().json(result?))
}

pub async fn update_handler<R: Resource>(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let result =
        update_by_id::<R>(state.storage(), &path.into_inner(), payload.into_inner()).await;
    observe(R::KIND, Operation::Update, &result);
    Ok(HttpResponse::Ok().json(result?))
}
