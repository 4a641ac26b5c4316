use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::auth_dtos::StatusResponse;
use crate::dtos::contact_dtos::ContactRequest;
use crate::errors::Result;
use crate::services::email_templates::ContactSubmission;
use crate::state::AppState;

pub async fn send_contact_email(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<StatusResponse>> {
    req.validate()?;

    let submission = ContactSubmission::from(req);
    state.mailer.send_contact(&submission).await?;

    tracing::info!(from = %submission.email, "contact message forwarded");
    Ok(Json(StatusResponse::success(
        "Your message has been sent successfully",
    )))
}
