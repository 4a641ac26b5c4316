use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::auth_dtos::{
    ForgotPasswordRequest, ResetPasswordRequest, StatusResponse, VerifyOtpRequest,
};
use crate::errors::{AppError, Result};
use crate::services::otp_service::PasswordReset;
use crate::state::AppState;

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<StatusResponse>> {
    if req.email.trim().is_empty() {
        return Err(AppError::invalid_data("Please provide your email address"));
    }
    req.validate()?;

    state.otp_service.request_otp(&req.email).await?;

    Ok(Json(StatusResponse::success("OTP sent to your email")))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<StatusResponse>> {
    if req.email.trim().is_empty() || req.otp.trim().is_empty() {
        return Err(AppError::invalid_data("Please provide email and OTP"));
    }
    req.validate()?;

    state.otp_service.verify_otp(&req.email, req.otp.trim()).await?;

    Ok(Json(StatusResponse::success("OTP verified successfully")))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<StatusResponse>> {
    if req.email.trim().is_empty() || req.otp.trim().is_empty() || req.new_password.is_empty() {
        return Err(AppError::invalid_data(
            "Please provide email, OTP and new password",
        ));
    }
    req.validate()?;

    let confirm_password = req
        .confirm_password
        .clone()
        .unwrap_or_else(|| req.new_password.clone());
    let reset = PasswordReset {
        email: req.email,
        otp: req.otp.trim().to_string(),
        new_password: req.new_password,
        confirm_password,
    };
    state.otp_service.reset_password(&reset).await?;

    Ok(Json(StatusResponse::success(
        "Password reset successful. Please log in with your new password.",
    )))
}
