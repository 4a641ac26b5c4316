use axum::{extract::State, Extension, Json};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use validator::Validate;

use crate::dtos::auth_dtos::{
    AuthResponse, LoginRequest, UpdateCarouselRequest, UpdatePasswordRequest, UserEnvelope,
};
use crate::errors::{AppError, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::user::{CarouselItem, ProfileUpdate, User, UserResponse, MAX_CAROUSEL_ITEMS};
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::invalid_data("Please provide email and password"));
    }
    req.validate()?;

    let outcome = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse {
        status: "success",
        message: outcome.user.role.welcome_message().to_string(),
        token: outcome.token,
        user: UserResponse::from(&outcome.user),
    }))
}

pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserEnvelope> {
    Json(UserEnvelope {
        status: "success",
        user: UserResponse::from(&user),
    })
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UserEnvelope>> {
    let mut update = ProfileUpdate::default();
    let mut profile_image: Option<Bytes> = None;
    let mut carousel: Vec<Bytes> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "password" | "newPassword" | "confirmPassword" | "passwordConfirm" => {
                return Err(AppError::invalid_data(
                    "This route is not for password updates. Please use /update-password.",
                ));
            }
            "profileImage" => {
                if profile_image.is_some() {
                    return Err(AppError::invalid_data("Only one profile image is allowed"));
                }
                profile_image = Some(field.bytes().await?);
            }
            "carousel" => {
                if carousel.len() >= MAX_CAROUSEL_ITEMS {
                    return Err(AppError::invalid_data(format!(
                        "At most {} carousel images can be uploaded at once",
                        MAX_CAROUSEL_ITEMS
                    )));
                }
                carousel.push(field.bytes().await?);
            }
            name => {
                let value = field.text().await?;
                apply_text_field(&mut update, name, value);
            }
        }
    }

    if user.carousel_items.len() + carousel.len() > MAX_CAROUSEL_ITEMS {
        return Err(AppError::invalid_data(format!(
            "A carousel holds at most {} items; {} already stored",
            MAX_CAROUSEL_ITEMS,
            user.carousel_items.len()
        )));
    }

    // Every file is checked before the first one reaches the disk.
    let profile_image = profile_image
        .map(|data| state.uploads.validate_image(&data).map(|ext| (data, ext)))
        .transpose()?;
    let carousel = carousel
        .into_iter()
        .map(|data| state.uploads.validate_image(&data).map(|ext| (data, ext)))
        .collect::<Result<Vec<_>>>()?;

    let id = user_id(&user)?;
    let mut written = Vec::new();
    if let Err(e) = write_uploads(&state, profile_image, carousel, &mut update, &mut written).await {
        state.uploads.discard(&written).await;
        return Err(e);
    }

    if update.is_empty() {
        return Ok(Json(UserEnvelope {
            status: "success",
            user: UserResponse::from(&user),
        }));
    }

    let updated = match state.users.update_profile(&id, &update).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            state.uploads.discard(&written).await;
            return Err(AppError::not_found("User not found"));
        }
        Err(e) => {
            state.uploads.discard(&written).await;
            return Err(e);
        }
    };

    tracing::info!(user_id = %id, "profile updated");
    Ok(Json(UserEnvelope {
        status: "success",
        user: UserResponse::from(&updated),
    }))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<AuthResponse>> {
    let confirm = req.confirm_password.as_deref().unwrap_or(&req.new_password);
    let token = state
        .auth
        .update_password(&user, &req.current_password, &req.new_password, confirm)
        .await?;

    Ok(Json(AuthResponse {
        status: "success",
        message: "Password updated successfully".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

pub async fn update_carousel(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateCarouselRequest>,
) -> Result<Json<Value>> {
    req.validate()?;
    if req.carousel_items.iter().any(|item| item.image_url.trim().is_empty()) {
        return Err(AppError::invalid_data("Every carousel item needs an imageUrl"));
    }

    let items: Vec<CarouselItem> = req.carousel_items.into_iter().map(CarouselItem::from).collect();
    let id = user_id(&user)?;
    let updated = state
        .users
        .replace_carousel(&id, &items)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Carousel updated successfully",
        "carouselItems": UserResponse::from(&updated).carousel_items,
    })))
}

fn user_id(user: &User) -> Result<ObjectId> {
    user.id.ok_or_else(|| AppError::internal("stored user has no id"))
}

/// Writes validated files, recording each public URL in `written` as soon as it exists.
async fn write_uploads(
    state: &AppState,
    profile_image: Option<(Bytes, &'static str)>,
    carousel: Vec<(Bytes, &'static str)>,
    update: &mut ProfileUpdate,
    written: &mut Vec<String>,
) -> Result<()> {
    if let Some((data, ext)) = profile_image {
        let url = state.uploads.write_image(&data, ext).await?;
        written.push(url.clone());
        update.profile_image = Some(url);
    }
    for (data, ext) in carousel {
        let url = state.uploads.write_image(&data, ext).await?;
        written.push(url.clone());
        update.append_carousel.push(CarouselItem {
            image_url: url,
            title: String::new(),
            description: String::new(),
        });
    }
    Ok(())
}

/// Maps one multipart text field onto the update. Unknown fields are ignored.
fn apply_text_field(update: &mut ProfileUpdate, name: &str, value: String) {
    let value = value.trim().to_string();
    match name {
        "name" => update.name = Some(value),
        "title" => update.title = Some(value),
        "bio" => update.bio = Some(value),
        "phone" => update.phone = Some(value),
        "location" => update.location = Some(value),
        "affiliation" => update.affiliation = Some(value),
        "cvUrl" => update.cv_url = Some(value),
        "researchInterests" => {
            update.research_interests = Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
        other => tracing::debug!(field = other, "ignoring unknown profile field"),
    }
}
