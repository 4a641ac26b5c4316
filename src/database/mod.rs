pub mod connection;
#[cfg(test)]
pub mod memory;
pub mod publications;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::errors::Result;
use crate::models::otp::OtpChallenge;
use crate::models::publication::{Publication, UpdatePublication};
use crate::models::user::{CarouselItem, ProfileUpdate, User};

pub use publications::MongoPublicationStore;
pub use users::MongoUserStore;

/// Credential and profile store. Every write is a single-document update.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>>;

    /// The site owner: the earliest created superadmin.
    async fn find_site_owner(&self) -> Result<Option<User>>;

    /// Replaces any existing challenge.
    async fn store_otp(&self, id: &ObjectId, challenge: &OtpChallenge) -> Result<()>;

    async fn clear_otp(&self, id: &ObjectId) -> Result<()>;

    /// Sets the password and clears the challenge only while `code` is still
    /// the stored, unexpired code. Returns false when nothing was updated.
    async fn reset_password_with_otp(
        &self,
        id: &ObjectId,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool>;

    async fn set_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> Result<Option<User>>;

    async fn replace_carousel(&self, id: &ObjectId, items: &[CarouselItem]) -> Result<Option<User>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait PublicationStore: Send + Sync {
    /// Newest year first.
    async fn list(&self) -> Result<Vec<Publication>>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Publication>>;

    async fn insert(&self, publication: Publication) -> Result<Publication>;

    async fn update(&self, id: &ObjectId, update: &UpdatePublication) -> Result<Option<Publication>>;

    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}
