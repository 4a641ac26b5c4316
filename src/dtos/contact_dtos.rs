use serde::Deserialize;
use validator::Validate;

use crate::services::email_templates::ContactSubmission;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    pub phone: Option<String>,

    pub organization: Option<String>,

    #[validate(length(min = 1, max = 300, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000, message = "Message is required"))]
    pub message: String,
}

impl From<ContactRequest> for ContactSubmission {
    fn from(req: ContactRequest) -> Self {
        let optional = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        ContactSubmission {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: optional(req.phone),
            organization: optional(req.organization),
            subject: req.subject.trim().to_string(),
            message: req.message,
        }
    }
}
