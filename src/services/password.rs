use bcrypt::{hash, verify};

use crate::errors::{AppError, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        Ok(hash(password, self.cost)?)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        match verify(password, password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }
}

/// Match first, then length.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> Result<()> {
    if new_password != confirm_password {
        return Err(AppError::invalid_data("Passwords do not match"));
    }
    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_data(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
