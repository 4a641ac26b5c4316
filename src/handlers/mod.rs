pub(crate) mod auth;
pub(crate) mod auth_otp;
pub(crate) mod contact;
pub(crate) mod health;
pub(crate) mod public;
pub(crate) mod publications;
pub(crate) mod upload;
