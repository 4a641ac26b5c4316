use std::sync::Arc;

use chrono::Duration;

use crate::config::AppConfig;
use crate::database::{PublicationStore, UserStore};
use crate::services::auth_service::AuthService;
use crate::services::email_service::{EmailSender, Mailer};
use crate::services::otp_service::OtpService;
use crate::services::password::PasswordHasher;
use crate::services::storage::UploadStore;
use crate::services::token_service::JwtManager;

/// Everything handlers need, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub publications: Arc<dyn PublicationStore>,
    pub mailer: Mailer,
    pub jwt: JwtManager,
    pub auth: AuthService,
    pub otp_service: OtpService,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        publications: Arc<dyn PublicationStore>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_expiration_hours);
        let mailer = Mailer::new(email_sender, &config);
        let auth = AuthService::new(users.clone(), jwt.clone(), hasher);
        let otp_service = OtpService::new(
            users.clone(),
            mailer.clone(),
            hasher,
            Duration::minutes(config.otp_ttl_minutes),
        );
        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        AppState {
            config: Arc::new(config),
            users,
            publications,
            mailer,
            jwt,
            auth,
            otp_service,
            uploads,
        }
    }
}
