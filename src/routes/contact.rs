use axum::{routing::post, Router};

use crate::handlers::contact;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/send-contact-email", post(contact::send_contact_email))
}
