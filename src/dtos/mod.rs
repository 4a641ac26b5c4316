pub mod auth_dtos;
pub mod contact_dtos;
