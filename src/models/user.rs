use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::models::otp::OtpChallenge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn welcome_message(&self) -> &'static str {
        match self {
            Role::Admin => "Welcome Admin!",
            Role::Superadmin => "Welcome Super Admin!",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub cv_url: Option<String>,
    #[serde(default)]
    pub research_interests: Vec<String>,
}

/// Upper bound on stored carousel items, whichever route adds them.
pub const MAX_CAROUSEL_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselItem {
    pub image_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,

    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub carousel_items: Vec<CarouselItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_otp: Option<OtpChallenge>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<BsonDateTime>,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        let now = BsonDateTime::now();
        Self {
            id: None,
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
            role,
            profile: Profile::default(),
            carousel_items: Vec::new(),
            reset_otp: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    /// True when the password was changed after a token issued at `issued_at` (unix seconds).
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        self.password_changed_at
            .map(|changed| changed.timestamp_millis() / 1000 > issued_at)
            .unwrap_or(false)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User as returned to its owner. No password hash, no OTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub phone: String,
    pub location: String,
    pub affiliation: String,
    pub profile_image: Option<String>,
    pub cv_url: Option<String>,
    pub research_interests: Vec<String>,
    pub carousel_items: Vec<CarouselItemResponse>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let p = &user.profile;
        UserResponse {
            id: user.id_hex(),
            email: user.email.clone(),
            role: user.role,
            name: p.name.clone(),
            title: p.title.clone(),
            bio: p.bio.clone(),
            phone: p.phone.clone(),
            location: p.location.clone(),
            affiliation: p.affiliation.clone(),
            profile_image: p.profile_image.clone(),
            cv_url: p.cv_url.clone(),
            research_interests: p.research_interests.clone(),
            carousel_items: user.carousel_items.iter().map(CarouselItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItemResponse {
    pub image_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<&CarouselItem> for CarouselItemResponse {
    fn from(item: &CarouselItem) -> Self {
        CarouselItemResponse {
            image_url: item.image_url.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
        }
    }
}

impl From<CarouselItemResponse> for CarouselItem {
    fn from(item: CarouselItemResponse) -> Self {
        CarouselItem {
            image_url: item.image_url,
            title: item.title,
            description: item.description,
        }
    }
}

/// Public read-model of the site owner shown on the home page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub title: String,
    pub bio: String,
    pub affiliation: String,
    pub location: String,
    pub profile_image: Option<String>,
    pub cv_url: Option<String>,
    pub research_interests: Vec<String>,
    pub carousel_items: Vec<CarouselItemResponse>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        let p = &user.profile;
        PublicProfile {
            name: p.name.clone(),
            email: user.email.clone(),
            role: user.role,
            title: p.title.clone(),
            bio: p.bio.clone(),
            affiliation: p.affiliation.clone(),
            location: p.location.clone(),
            profile_image: p.profile_image.clone(),
            cv_url: p.cv_url.clone(),
            research_interests: p.research_interests.clone(),
            carousel_items: user.carousel_items.iter().map(CarouselItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub affiliation: String,
}

impl From<&User> for ContactInfo {
    fn from(user: &User) -> Self {
        ContactInfo {
            name: user.profile.name.clone(),
            email: user.email.clone(),
            phone: user.profile.phone.clone(),
            location: user.profile.location.clone(),
            affiliation: user.profile.affiliation.clone(),
        }
    }
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub affiliation: Option<String>,
    pub profile_image: Option<String>,
    pub cv_url: Option<String>,
    pub research_interests: Option<Vec<String>>,
    pub append_carousel: Vec<CarouselItem>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }

    pub fn apply_to(&self, user: &mut User) {
        let p = &mut user.profile;
        if let Some(v) = &self.name {
            p.name = v.clone();
        }
        if let Some(v) = &self.title {
            p.title = v.clone();
        }
        if let Some(v) = &self.bio {
            p.bio = v.clone();
        }
        if let Some(v) = &self.phone {
            p.phone = v.clone();
        }
        if let Some(v) = &self.location {
            p.location = v.clone();
        }
        if let Some(v) = &self.affiliation {
            p.affiliation = v.clone();
        }
        if let Some(v) = &self.profile_image {
            p.profile_image = Some(v.clone());
        }
        if let Some(v) = &self.cv_url {
            p.cv_url = Some(v.clone());
        }
        if let Some(v) = &self.research_interests {
            p.research_interests = v.clone();
        }
        user.carousel_items.extend(self.append_carousel.iter().cloned());
        user.updated_at = BsonDateTime::now();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}
