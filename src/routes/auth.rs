use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{auth, auth_otp, contact, public};
use crate::middleware::{auth::protect, guard::RouteGuard};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/login", post(auth::login))
        // Password reset by emailed OTP
        .route("/forgot-password", post(auth_otp::forgot_password))
        .route("/verify-otp", post(auth_otp::verify_otp))
        .route("/reset-password", post(auth_otp::reset_password))
        .route("/public/superadmin", get(public::public_superadmin))
        .route("/public/carousel", get(public::public_carousel))
        .route("/public/contact", get(public::public_contact))
        .route("/contact", post(contact::send_contact_email));

    let signed_in = Router::new()
        .route("/me", get(auth::get_me))
        .route("/update-me", patch(auth::update_me))
        .route("/update-password", patch(auth::update_password))
        .route_layer(from_fn_with_state(
            (state.clone(), RouteGuard::Authenticated),
            protect,
        ));

    let owner_only = Router::new()
        .route("/update-carousel", patch(auth::update_carousel))
        .route_layer(from_fn_with_state(
            (state.clone(), RouteGuard::SUPERADMIN),
            protect,
        ));

    open.merge(signed_in).merge(owner_only)
}
