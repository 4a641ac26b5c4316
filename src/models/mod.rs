pub mod otp;
pub mod publication;
pub mod user;
