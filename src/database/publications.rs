use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, to_document, DateTime as BsonDateTime},
    options::ReturnDocument,
    Collection, Database,
};

use crate::database::PublicationStore;
use crate::errors::{AppError, Result};
use crate::models::publication::{Publication, UpdatePublication};

#[derive(Clone)]
pub struct MongoPublicationStore {
    publications: Collection<Publication>,
}

impl MongoPublicationStore {
    pub fn new(db: &Database) -> Self {
        Self {
            publications: db.collection("publications"),
        }
    }
}

#[async_trait]
impl PublicationStore for MongoPublicationStore {
    async fn list(&self) -> Result<Vec<Publication>> {
        let cursor = self
            .publications
            .find(doc! {})
            .sort(doc! { "year": -1, "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Publication>> {
        Ok(self.publications.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, mut publication: Publication) -> Result<Publication> {
        let result = self.publications.insert_one(&publication).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::internal("inserted publication has no ObjectId"))?;
        publication.id = Some(id);
        Ok(publication)
    }

    async fn update(&self, id: &ObjectId, update: &UpdatePublication) -> Result<Option<Publication>> {
        let mut set = to_document(update)?;
        set.insert("updated_at", BsonDateTime::now());

        let publication = self
            .publications
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(publication)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.publications.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count == 1)
    }
}
