use mongodb::{
    bson::doc,
    options::IndexOptions,
    Client, Database, IndexModel,
};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::user::User;

pub async fn get_db_client(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = client.database(&config.database_name);

    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!(database = %config.database_name, ?collections, "connected to MongoDB");
            if !collections.iter().any(|c| c == "users") {
                tracing::warn!("'users' collection not found; admin accounts must be provisioned");
            }
        }
        Err(e) => {
            tracing::error!(database = %config.database_name, error = %e, "database may be inaccessible");
        }
    }

    ensure_indexes(&db).await?;
    Ok(db)
}

async fn ensure_indexes(db: &Database) -> Result<()> {
    let users = db.collection::<User>("users");
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    users.create_index(unique_email).await?;

    let by_year = IndexModel::builder().keys(doc! { "year": -1 }).build();
    db.collection::<mongodb::bson::Document>("publications")
        .create_index(by_year)
        .await?;

    Ok(())
}
