use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, DateTime as BsonDateTime, Document},
    options::ReturnDocument,
    Collection, Database,
};

use crate::database::UserStore;
use crate::errors::Result;
use crate::models::otp::OtpChallenge;
use crate::models::user::{normalize_email, CarouselItem, ProfileUpdate, Role, User};

#[derive(Clone)]
pub struct MongoUserStore {
    db: Database,
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: Database) -> Self {
        let users = db.collection("users");
        Self { db, users }
    }

    async fn update_and_return(&self, id: &ObjectId, update: Document) -> Result<Option<User>> {
        let user = self
            .users
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(user)
    }
}

fn profile_set_document(update: &ProfileUpdate) -> Result<Document> {
    let mut set = doc! { "updated_at": BsonDateTime::now() };
    let text_fields = [
        ("profile.name", &update.name),
        ("profile.title", &update.title),
        ("profile.bio", &update.bio),
        ("profile.phone", &update.phone),
        ("profile.location", &update.location),
        ("profile.affiliation", &update.affiliation),
        ("profile.profile_image", &update.profile_image),
        ("profile.cv_url", &update.cv_url),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            set.insert(key, value.as_str());
        }
    }
    if let Some(interests) = &update.research_interests {
        set.insert("profile.research_interests", interests.clone());
    }
    let mut update_doc = doc! { "$set": set };
    if !update.append_carousel.is_empty() {
        update_doc.insert(
            "$push",
            doc! { "carousel_items": { "$each": to_bson(&update.append_carousel)? } },
        );
    }
    Ok(update_doc)
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .users
            .find_one(doc! { "email": normalize_email(email) })
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    async fn find_site_owner(&self) -> Result<Option<User>> {
        let owner = self
            .users
            .find_one(doc! { "role": Role::Superadmin.as_str() })
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(owner)
    }

    async fn store_otp(&self, id: &ObjectId, challenge: &OtpChallenge) -> Result<()> {
        let update = doc! {
            "$set": {
                "reset_otp": to_bson(challenge)?,
                "updated_at": BsonDateTime::now(),
            }
        };
        self.users.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }

    async fn clear_otp(&self, id: &ObjectId) -> Result<()> {
        let update = doc! {
            "$unset": { "reset_otp": "" },
            "$set": { "updated_at": BsonDateTime::now() },
        };
        self.users.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }

    async fn reset_password_with_otp(
        &self,
        id: &ObjectId,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool> {
        let now_bson = BsonDateTime::from_chrono(now);

        let filter = doc! {
            "_id": id,
            "reset_otp.code": code,
            "reset_otp.expires_at": { "$gt": now_bson },
        };
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "password_changed_at": now_bson,
                "updated_at": now_bson,
            },
            "$unset": { "reset_otp": "" },
        };

        let result = self.users.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }

    async fn set_password(
        &self,
        id: &ObjectId,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<()> {
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "password_changed_at": BsonDateTime::from_chrono(changed_at),
                "updated_at": BsonDateTime::from_chrono(changed_at),
            },
            "$unset": { "reset_otp": "" },
        };
        self.users.update_one(doc! { "_id": id }, update).await?;
        Ok(())
    }

    async fn update_profile(&self, id: &ObjectId, update: &ProfileUpdate) -> Result<Option<User>> {
        self.update_and_return(id, profile_set_document(update)?).await
    }

    async fn replace_carousel(&self, id: &ObjectId, items: &[CarouselItem]) -> Result<Option<User>> {
        let update = doc! {
            "$set": {
                "carousel_items": to_bson(items)?,
                "updated_at": BsonDateTime::now(),
            }
        };
        self.update_and_return(id, update).await
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
