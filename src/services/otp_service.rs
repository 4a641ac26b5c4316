use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

use crate::database::UserStore;
use crate::errors::{AppError, Result};
use crate::models::otp::{self, OtpChallenge};
use crate::models::user::normalize_email;
use crate::services::email_service::Mailer;
use crate::services::password::{validate_new_password, PasswordHasher};

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Password reset by emailed one-time code.
///
/// A user has at most one live challenge. Issuing a new one overwrites the
/// previous code, and a successful reset consumes it in the same write that
/// stores the new password.
#[derive(Clone)]
pub struct OtpService {
    users: Arc<dyn UserStore>,
    mailer: Mailer,
    hasher: PasswordHasher,
    ttl: Duration,
}

impl OtpService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Mailer,
        hasher: PasswordHasher,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            mailer,
            hasher,
            ttl,
        }
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = OsRng;
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    pub async fn request_otp(&self, email: &str) -> Result<()> {
        self.request_otp_at(email, Utc::now()).await
    }

    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<()> {
        self.verify_otp_at(email, code, Utc::now()).await
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<()> {
        self.reset_password_at(reset, Utc::now()).await
    }

    pub(crate) async fn request_otp_at(&self, email: &str, now: DateTime<Utc>) -> Result<()> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("There is no user with that email address"))?;
        let user_id = user
            .id
            .ok_or_else(|| AppError::internal("stored user has no id"))?;

        let challenge = OtpChallenge::new(Self::generate_otp(), now, self.ttl);
        self.users.store_otp(&user_id, &challenge).await?;

        if let Err(e) = self.mailer.send_otp(&user.email, &challenge.code).await {
            tracing::error!(user_id = %user_id, error = %e, "OTP email failed, clearing challenge");
            if let Err(clear_err) = self.users.clear_otp(&user_id).await {
                tracing::error!(user_id = %user_id, error = %clear_err, "failed to clear OTP");
            }
            return Err(e.into());
        }

        tracing::info!(user_id = %user_id, "password reset OTP issued");
        Ok(())
    }

    /// Read-only check; the challenge stays live.
    pub(crate) async fn verify_otp_at(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !otp::is_well_formed(code) {
            return Err(AppError::invalid_data("Please enter a valid 6-digit OTP"));
        }

        let user = self.users.find_by_email(email).await?;
        let valid = user
            .as_ref()
            .and_then(|u| u.reset_otp.as_ref())
            .is_some_and(|challenge| challenge.accepts(code, now));

        if valid {
            Ok(())
        } else {
            Err(AppError::InvalidOrExpiredOtp)
        }
    }

    pub(crate) async fn reset_password_at(
        &self,
        reset: &PasswordReset,
        now: DateTime<Utc>,
    ) -> Result<()> {
        validate_new_password(&reset.new_password, &reset.confirm_password)?;
        if !otp::is_well_formed(&reset.otp) {
            return Err(AppError::invalid_data("Please enter a valid 6-digit OTP"));
        }

        let user = self
            .users
            .find_by_email(&reset.email)
            .await?
            .ok_or(AppError::InvalidOrExpiredOtp)?;
        let live = user
            .reset_otp
            .as_ref()
            .is_some_and(|challenge| challenge.accepts(&reset.otp, now));
        if !live {
            return Err(AppError::InvalidOrExpiredOtp);
        }
        let user_id = user
            .id
            .ok_or_else(|| AppError::internal("stored user has no id"))?;

        let password_hash = self.hasher.hash(&reset.new_password)?;

        // the store re-checks the code, so a concurrent reset cannot consume it twice
        let applied = self
            .users
            .reset_password_with_otp(&user_id, &reset.otp, now, &password_hash)
            .await?;
        if !applied {
            return Err(AppError::InvalidOrExpiredOtp);
        }

        tracing::info!(user_id = %user_id, "password reset with OTP");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::InMemoryUserStore;
    use crate::models::user::{Role, User};
    use crate::services::email_service::testing::RecordingEmailSender;
    use crate::services::email_service::EmailErrorKind;
    use assert_matches::assert_matches;

    const EMAIL: &str = "user@example.com";

    struct Fixture {
        users: Arc<InMemoryUserStore>,
        sender: Arc<RecordingEmailSender>,
        service: OtpService,
        hasher: PasswordHasher,
        user: User,
    }

    fn fixture_with_sender(sender: RecordingEmailSender) -> Fixture {
        let hasher = PasswordHasher::new(4);
        let users = Arc::new(InMemoryUserStore::new());
        let user = users.insert(User::new(EMAIL, hasher.hash("OldPassw0rd").unwrap(), Role::Admin));
        let sender = Arc::new(sender);
        let config = AppConfig::for_tests(std::env::temp_dir());
        let mailer = Mailer::new(sender.clone(), &config);
        let service = OtpService::new(users.clone(), mailer, hasher, Duration::minutes(10));
        Fixture {
            users,
            sender,
            service,
            hasher,
            user,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_sender(RecordingEmailSender::new())
    }

    async fn stored_code(f: &Fixture) -> String {
        f.users
            .find_by_email(EMAIL)
            .await
            .unwrap()
            .unwrap()
            .reset_otp
            .unwrap()
            .code
    }

    fn reset(code: &str, new_password: &str, confirm: &str) -> PasswordReset {
        PasswordReset {
            email: EMAIL.to_string(),
            otp: code.to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..200 {
            assert!(otp::is_well_formed(&OtpService::generate_otp()));
        }
    }

    #[tokio::test]
    async fn test_request_otp_stores_and_emails_code() {
        let f = fixture();
        let now = Utc::now();
        f.service.request_otp_at("  USER@example.com", now).await.unwrap();

        let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
        let challenge = user.reset_otp.unwrap();
        assert_eq!(challenge.expires_at.to_chrono().timestamp(), (now + Duration::minutes(10)).timestamp());

        let sent = f.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, EMAIL);
        assert!(sent[0].text.contains(&challenge.code));
    }

    #[tokio::test]
    async fn test_request_otp_unknown_email() {
        let f = fixture();
        assert_matches!(
            f.service.request_otp("nobody@example.com").await,
            Err(AppError::NotFound(_))
        );
        assert!(f.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_email_failure_clears_challenge() {
        let f = fixture_with_sender(RecordingEmailSender::failing(EmailErrorKind::AccessDenied));

        let err = f.service.request_otp(EMAIL).await.unwrap_err();
        assert_matches!(err, AppError::EmailDelivery(e) if e.kind == EmailErrorKind::AccessDenied);

        let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(user.reset_otp.is_none());
    }

    #[tokio::test]
    async fn test_second_request_invalidates_first_code() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let first = stored_code(&f).await;

        // regenerate until the codes differ, a collision is one in a million
        let mut second = first.clone();
        while second == first {
            f.service.request_otp(EMAIL).await.unwrap();
            second = stored_code(&f).await;
        }

        assert_matches!(
            f.service.verify_otp(EMAIL, &first).await,
            Err(AppError::InvalidOrExpiredOtp)
        );
        assert!(f.service.verify_otp(EMAIL, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_does_not_consume() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let code = stored_code(&f).await;

        f.service.verify_otp(EMAIL, &code).await.unwrap();
        f.service.verify_otp(EMAIL, &code).await.unwrap();
        assert_eq!(stored_code(&f).await, code);
    }

    #[tokio::test]
    async fn test_verify_unknown_email_is_invalid_otp() {
        let f = fixture();
        assert_matches!(
            f.service.verify_otp("ghost@example.com", "123456").await,
            Err(AppError::InvalidOrExpiredOtp)
        );
        assert_matches!(
            f.service.verify_otp(EMAIL, "12ab56").await,
            Err(AppError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn test_reset_consumes_code_once() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let code = stored_code(&f).await;

        f.service.reset_password(&reset(&code, "Str0ngPW!", "Str0ngPW!")).await.unwrap();

        let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(user.reset_otp.is_none());
        assert!(user.password_changed_at.is_some());
        assert!(f.hasher.verify("Str0ngPW!", &user.password_hash));
        assert!(!f.hasher.verify("OldPassw0rd", &user.password_hash));

        assert_matches!(
            f.service.reset_password(&reset(&code, "An0therPW!", "An0therPW!")).await,
            Err(AppError::InvalidOrExpiredOtp)
        );
    }

    #[tokio::test]
    async fn test_reset_after_window_fails() {
        let f = fixture();
        let issued = Utc::now();
        f.service.request_otp_at(EMAIL, issued).await.unwrap();
        let code = stored_code(&f).await;

        let later = issued + Duration::minutes(10) + Duration::seconds(1);
        assert_matches!(
            f.service.reset_password_at(&reset(&code, "Str0ngPW!", "Str0ngPW!"), later).await,
            Err(AppError::InvalidOrExpiredOtp)
        );
        assert_matches!(
            f.service.verify_otp_at(EMAIL, &code, later).await,
            Err(AppError::InvalidOrExpiredOtp)
        );

        let user = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(f.hasher.verify("OldPassw0rd", &user.password_hash));
    }

    #[tokio::test]
    async fn test_expired_challenge_in_store_is_rejected() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let code = stored_code(&f).await;

        let id = f.user.id.unwrap();
        f.users.modify(&id, |u| {
            let issued = Utc::now() - Duration::minutes(30);
            u.reset_otp = Some(OtpChallenge::new(code.clone(), issued, Duration::minutes(10)));
        });

        assert_matches!(
            f.service.reset_password(&reset(&code, "Str0ngPW!", "Str0ngPW!")).await,
            Err(AppError::InvalidOrExpiredOtp)
        );
    }

    #[tokio::test]
    async fn test_validation_order_and_no_mutation() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let code = stored_code(&f).await;
        let before = f.users.find_by_email(EMAIL).await.unwrap().unwrap();

        // mismatch wins over every other problem
        assert_matches!(
            f.service.reset_password(&reset("bad", "short", "different")).await,
            Err(AppError::ValidationError(msg)) if msg == "Passwords do not match"
        );
        assert_matches!(
            f.service.reset_password(&reset("bad", "short", "short")).await,
            Err(AppError::ValidationError(msg)) if msg.contains("at least 8")
        );
        assert_matches!(
            f.service.reset_password(&reset("12345", "Str0ngPW!", "Str0ngPW!")).await,
            Err(AppError::ValidationError(msg)) if msg.contains("6-digit")
        );

        let after = f.users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.reset_otp.map(|c| c.code), Some(code));
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_state_unchanged() {
        let f = fixture();
        f.service.request_otp(EMAIL).await.unwrap();
        let code = stored_code(&f).await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert_matches!(
            f.service.reset_password(&reset(wrong, "Str0ngPW!", "Str0ngPW!")).await,
            Err(AppError::InvalidOrExpiredOtp)
        );
        assert_eq!(stored_code(&f).await, code);
    }
}
