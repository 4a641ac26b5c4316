use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, Result};
use crate::middleware::guard::{GuardOutcome, RouteGuard};
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated user, inserted into request extensions by [`protect`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Route-layer middleware: `from_fn_with_state((state, guard), protect)`.
pub async fn protect(
    State((state, guard)): State<(AppState, RouteGuard)>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let session = bearer_token(request.headers()).and_then(|token| state.jwt.verify_token(token).ok());

    match guard.check(session.as_ref(), chrono::Utc::now().timestamp()) {
        GuardOutcome::Allow => {}
        GuardOutcome::RedirectToLogin => {
            return Err(AppError::unauthorized(
                "You are not logged in! Please log in to get access.",
            ))
        }
        GuardOutcome::RedirectToUnauthorized => return Err(AppError::Forbidden),
    }

    // Allow implies a session
    let claims = session.ok_or_else(|| AppError::unauthorized("Missing session"))?;
    let user = state.auth.user_for_claims(&claims).await?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
