use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Publication {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub venue: String,
    pub year: i32,
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublication {
    #[validate(length(min = 1, max = 500, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub authors: Vec<String>,
    #[serde(default)]
    pub venue: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: i32,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    pub doi: Option<String>,
    #[validate(url(message = "URL must be a valid URL"))]
    pub url: Option<String>,
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl CreatePublication {
    pub fn into_publication(self) -> Publication {
        let now = BsonDateTime::now();
        Publication {
            id: None,
            title: self.title.trim().to_string(),
            authors: self.authors,
            venue: self.venue,
            year: self.year,
            abstract_text: self.abstract_text,
            doi: self.doi,
            url: self.url,
            pdf_url: self.pdf_url,
            tags: self.tags,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

/// PATCH body. Field names double as the stored document keys once
/// serialized, so the store can `$set` it directly.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdatePublication {
    #[validate(length(min = 1, max = 500, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub venue: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: Option<i32>,
    #[serde(rename(deserialize = "abstract"))]
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    #[validate(url(message = "URL must be a valid URL"))]
    pub url: Option<String>,
    pub pdf_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
}

impl UpdatePublication {
    pub fn apply_to(&self, publication: &mut Publication) {
        if let Some(v) = &self.title {
            publication.title = v.clone();
        }
        if let Some(v) = &self.authors {
            publication.authors = v.clone();
        }
        if let Some(v) = &self.venue {
            publication.venue = v.clone();
        }
        if let Some(v) = self.year {
            publication.year = v;
        }
        if let Some(v) = &self.abstract_text {
            publication.abstract_text = v.clone();
        }
        if let Some(v) = &self.doi {
            publication.doi = Some(v.clone());
        }
        if let Some(v) = &self.url {
            publication.url = Some(v.clone());
        }
        if let Some(v) = &self.pdf_url {
            publication.pdf_url = Some(v.clone());
        }
        if let Some(v) = &self.tags {
            publication.tags = v.clone();
        }
        if let Some(v) = self.featured {
            publication.featured = v;
        }
        publication.updated_at = BsonDateTime::now();
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationResponse {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub venue: String,
    pub year: i32,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub pdf_url: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Publication> for PublicationResponse {
    fn from(p: Publication) -> Self {
        PublicationResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: p.title,
            authors: p.authors,
            venue: p.venue,
            year: p.year,
            abstract_text: p.abstract_text,
            doi: p.doi,
            url: p.url,
            pdf_url: p.pdf_url,
            tags: p.tags,
            featured: p.featured,
            created_at: p.created_at.to_chrono().to_rfc3339(),
            updated_at: p.updated_at.to_chrono().to_rfc3339(),
        }
    }
}
