use std::sync::Arc;

use chrono::Utc;

use crate::database::UserStore;
use crate::errors::{AppError, Result};
use crate::models::user::{Claims, User};
use crate::services::password::{validate_new_password, PasswordHasher};
use crate::services::token_service::JwtManager;

#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtManager,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtManager, hasher: PasswordHasher) -> Self {
        Self { users, jwt, hasher }
    }

    #[cfg(test)]
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id_hex(), "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.create_token(&user)?;
        tracing::info!(user_id = %user.id_hex(), role = user.role.as_str(), "user logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Loads the user behind verified claims, rejecting deleted accounts and
    /// tokens that predate the last password change.
    pub async fn user_for_claims(&self, claims: &Claims) -> Result<User> {
        let id = mongodb::bson::oid::ObjectId::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid token. Please log in again."))?;

        let user = self.users.find_by_id(&id).await?.ok_or_else(|| {
            AppError::unauthorized("The user belonging to this token no longer exists.")
        })?;

        if user.changed_password_after(claims.iat) {
            return Err(AppError::unauthorized(
                "User recently changed password. Please log in again.",
            ));
        }
        Ok(user)
    }

    /// Returns a fresh session token for the new password.
    pub async fn update_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String> {
        validate_new_password(new_password, confirm_password)?;

        if !self.hasher.verify(current_password, &user.password_hash) {
            return Err(AppError::unauthorized("Your current password is wrong."));
        }

        let id = user
            .id
            .ok_or_else(|| AppError::internal("stored user has no id"))?;
        let password_hash = self.hasher.hash(new_password)?;
        self.users.set_password(&id, &password_hash, Utc::now()).await?;

        tracing::info!(user_id = %id, "password updated");
        self.jwt.create_token(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryUserStore;
    use crate::models::user::Role;
    use assert_matches::assert_matches;
    use mongodb::bson::DateTime as BsonDateTime;

    fn service() -> (Arc<InMemoryUserStore>, AuthService, PasswordHasher) {
        let hasher = PasswordHasher::new(4);
        let users = Arc::new(InMemoryUserStore::new());
        let auth = AuthService::new(users.clone(), JwtManager::new("test-secret", 1), hasher);
        (users, auth, hasher)
    }

    #[tokio::test]
    async fn test_login_token_carries_stored_role() {
        let (users, auth, hasher) = service();
        for (email, role) in [("admin@example.com", Role::Admin), ("owner@example.com", Role::Superadmin)] {
            users.insert(User::new(email, hasher.hash("Passw0rd!").unwrap(), role));

            let outcome = auth.login(email, "Passw0rd!").await.unwrap();
            let claims = auth.jwt().verify_token(&outcome.token).unwrap();
            assert_eq!(claims.role, role);
            assert_eq!(claims.sub, outcome.user.id_hex());
        }
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (users, auth, hasher) = service();
        users.insert(User::new("admin@example.com", hasher.hash("Passw0rd!").unwrap(), Role::Admin));

        let wrong_password = auth.login("admin@example.com", "nope").await.unwrap_err();
        let unknown_user = auth.login("ghost@example.com", "Passw0rd!").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_matches!(wrong_password, AppError::InvalidCredentials);
        assert_matches!(unknown_user, AppError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_user_for_claims_rejects_stale_tokens() {
        let (users, auth, hasher) = service();
        let user = users.insert(User::new("admin@example.com", hasher.hash("Passw0rd!").unwrap(), Role::Admin));
        let token = auth.login("admin@example.com", "Passw0rd!").await.unwrap().token;
        let claims = auth.jwt().verify_token(&token).unwrap();

        assert!(auth.user_for_claims(&claims).await.is_ok());

        users.modify(&user.id.unwrap(), |u| {
            u.password_changed_at = Some(BsonDateTime::from_chrono(Utc::now() + chrono::Duration::seconds(5)));
        });
        assert_matches!(auth.user_for_claims(&claims).await, Err(AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_token_from_previous_second_is_rejected_after_password_change() {
        let (users, auth, hasher) = service();
        let user = users.insert(User::new("admin@example.com", hasher.hash("Passw0rd!").unwrap(), Role::Admin));
        let issued = Utc::now().timestamp() - 1;
        let claims = Claims {
            sub: user.id_hex(),
            email: user.email.clone(),
            role: Role::Admin,
            iat: issued,
            exp: issued + 60,
        };
        assert!(auth.user_for_claims(&claims).await.is_ok());

        let fresh = auth.update_password(&user, "Passw0rd!", "NewPassw0rd", "NewPassw0rd").await.unwrap();
        let stored = users.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert!(stored.password_changed_at.unwrap().timestamp_millis() / 1000 > issued);

        assert_matches!(auth.user_for_claims(&claims).await, Err(AppError::Unauthorized(_)));
        let fresh_claims = auth.jwt().verify_token(&fresh).unwrap();
        assert!(auth.user_for_claims(&fresh_claims).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_for_claims_rejects_missing_user() {
        let (_users, auth, _) = service();
        let claims = Claims {
            sub: mongodb::bson::oid::ObjectId::new().to_hex(),
            email: "gone@example.com".to_string(),
            role: Role::Admin,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        assert_matches!(auth.user_for_claims(&claims).await, Err(AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_update_password() {
        let (users, auth, hasher) = service();
        let user = users.insert(User::new("admin@example.com", hasher.hash("Passw0rd!").unwrap(), Role::Admin));

        assert_matches!(
            auth.update_password(&user, "wrong", "NewPassw0rd", "NewPassw0rd").await,
            Err(AppError::Unauthorized(_))
        );
        assert_matches!(
            auth.update_password(&user, "Passw0rd!", "NewPassw0rd", "Mismatch00").await,
            Err(AppError::ValidationError(_))
        );

        let token = auth.update_password(&user, "Passw0rd!", "NewPassw0rd", "NewPassw0rd").await.unwrap();
        let claims = auth.jwt().verify_token(&token).unwrap();
        assert!(auth.user_for_claims(&claims).await.is_ok());

        assert!(auth.login("admin@example.com", "NewPassw0rd").await.is_ok());
        assert_matches!(
            auth.login("admin@example.com", "Passw0rd!").await,
            Err(AppError::InvalidCredentials)
        );
    }
}
