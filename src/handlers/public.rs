use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::user::{CarouselItemResponse, ContactInfo, PublicProfile, User};
use crate::state::AppState;

async fn site_owner(state: &AppState) -> Result<User> {
    state
        .users
        .find_site_owner()
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

pub async fn public_superadmin(State(state): State<AppState>) -> Result<Json<Value>> {
    let owner = site_owner(&state).await?;
    Ok(Json(json!({
        "status": "success",
        "user": PublicProfile::from(&owner),
    })))
}

pub async fn public_carousel(State(state): State<AppState>) -> Result<Json<Value>> {
    let owner = site_owner(&state).await?;
    let items: Vec<CarouselItemResponse> = owner.carousel_items.iter().map(CarouselItemResponse::from).collect();
    Ok(Json(json!({
        "status": "success",
        "results": items.len(),
        "carouselItems": items,
    })))
}

pub async fn public_contact(State(state): State<AppState>) -> Result<Json<Value>> {
    let owner = site_owner(&state).await?;
    Ok(Json(json!({
        "status": "success",
        "contact": ContactInfo::from(&owner),
    })))
}
