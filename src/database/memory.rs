//! In-process stores with the same semantics as the MongoDB ones, for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

use crate::database::{PublicationStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::otp::OtpChallenge;
use crate::models::publication::{Publication, UpdatePublication};
use crate::models::user::{normalize_email, CarouselItem, ProfileUpdate, Role, User};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<ObjectId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, mut user: User) -> User {
        let id = user.id.unwrap_or_else(ObjectId::new);
        user.id = Some(id);
        self.users.lock().unwrap().insert(id, user.clone());
        user
    }

    /// Direct mutation hook, used to age challenges in expiry tests.
    pub fn modify<F: FnOnce(&mut User)>(&self, id: &ObjectId, f: F) {
        if let Some(user) = self.users.lock().unwrap().get_mut(id) {
            f(user);
        }
    }

    fn with_user<T>(&self, id: &ObjectId, f: impl FnOnce(&mut User) -> T) -> Option<T> {
        self.users.lock().unwrap().get_mut(id).map(f)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_site_owner(&self) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .filter(|u| u.role == Role::Superadmin)
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn store_otp(&self, id: &ObjectId, challenge: &OtpChallenge) -> Result<()> {
        self.with_user(id, |u| {
            u.reset_otp = Some(challenge.clone());
            u.updated_at = BsonDateTime::now();
        });
        Ok(())
    }

    async fn clear_otp(&self, id: &ObjectId) -> Result<()> {
        self.with_user(id, |u| u.reset_otp = None);
        Ok(())
    }

    async fn reset_password_with_otp(
        &self,
        id: &ObjectId,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool> {
        let applied = self.with_user(id, |u| {
            let valid = u.reset_otp.as_ref().is_some_and(|c| c.accepts(code, now));
            if valid {
                u.password_hash = password_hash.to_string();
                u.password_changed_at = Some(BsonDateTime::from_chrono(now));
                u.reset_otp = None;
                u.updated_at = BsonDateTime::from_chrono(now);
            }
            valid
        });
        Ok(applied.unwrap_or(false))
    }

    async fn set_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_user(id, |u| {
            u.password_hash = password_hash.to_string();
            u.password_changed_at = Some(BsonDateTime::from_chrono(changed_at));
            u.reset_otp = None;
        });
        Ok(())
    }

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> Result<Option<User>> {
        Ok(self.with_user(id, |u| {
            update.apply_to(u);
            u.clone()
        }))
    }

    async fn replace_carousel(&self, id: &ObjectId, items: &[CarouselItem]) -> Result<Option<User>> {
        Ok(self.with_user(id, |u| {
            u.carousel_items = items.to_vec();
            u.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPublicationStore {
    publications: Mutex<Vec<Publication>>,
}

impl InMemoryPublicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublicationStore for InMemoryPublicationStore {
    async fn list(&self) -> Result<Vec<Publication>> {
        let mut all = self.publications.lock().unwrap().clone();
        all.sort_by(|a, b| b.year.cmp(&a.year).then(b.created_at.cmp(&a.created_at)));
        Ok(all)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Publication>> {
        let all = self.publications.lock().unwrap();
        Ok(all.iter().find(|p| p.id.as_ref() == Some(id)).cloned())
    }

    async fn insert(&self, mut publication: Publication) -> Result<Publication> {
        if publication.id.is_some() {
            return Err(AppError::internal("publication already has an id"));
        }
        publication.id = Some(ObjectId::new());
        self.publications.lock().unwrap().push(publication.clone());
        Ok(publication)
    }

    async fn update(&self, id: &ObjectId, update: &UpdatePublication) -> Result<Option<Publication>> {
        let mut all = self.publications.lock().unwrap();
        Ok(all.iter_mut().find(|p| p.id.as_ref() == Some(id)).map(|p| {
            update.apply_to(p);
            p.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let mut all = self.publications.lock().unwrap();
        let before = all.len();
        all.retain(|p| p.id.as_ref() != Some(id));
        Ok(all.len() != before)
    }
}
