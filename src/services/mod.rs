pub mod auth_service;
pub mod email_service;
pub mod email_templates;
pub mod otp_service;
pub mod password;
pub mod storage;
pub mod token_service;
