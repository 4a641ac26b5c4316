use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::publication::{CreatePublication, PublicationResponse, UpdatePublication};
use crate::state::AppState;

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidObjectId(id.to_string()))
}

pub async fn list_publications(State(state): State<AppState>) -> Result<Json<Value>> {
    let publications: Vec<PublicationResponse> = state
        .publications
        .list()
        .await?
        .into_iter()
        .map(PublicationResponse::from)
        .collect();

    Ok(Json(json!({
        "status": "success",
        "results": publications.len(),
        "publications": publications,
    })))
}

pub async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;
    let publication = state
        .publications
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Publication not found"))?;

    Ok(Json(json!({
        "status": "success",
        "publication": PublicationResponse::from(publication),
    })))
}

pub async fn create_publication(
    State(state): State<AppState>,
    Json(req): Json<CreatePublication>,
) -> Result<(StatusCode, Json<Value>)> {
    req.validate()?;

    let created = state.publications.insert(req.into_publication()).await?;
    tracing::info!(title = %created.title, "publication created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "publication": PublicationResponse::from(created),
        })),
    ))
}

pub async fn update_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePublication>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;
    req.validate()?;

    let updated = state
        .publications
        .update(&id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Publication not found"))?;

    Ok(Json(json!({
        "status": "success",
        "publication": PublicationResponse::from(updated),
    })))
}

pub async fn delete_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    if !state.publications.delete(&id).await? {
        return Err(AppError::not_found("Publication not found"));
    }

    tracing::info!(publication_id = %id, "publication deleted");
    Ok(StatusCode::NO_CONTENT)
}
