use chrono::Utc;
use log::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{users, Id};

pub mod error;
pub mod user;

/// Inserts a small set of sample users for local development.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    let samples = [
        ("Admin User", "admin@mediagateway.local"),
        ("Jane Smith", "jane.smith@mediagateway.local"),
        ("John Doe", "john.doe@mediagateway.local"),
    ];

    for (name, email) in samples {
        if user::find_by_email(db, email).await?.is_some() {
            debug!("Skipping seed user {email}, already present");
            continue;
        }

        users::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .save(db)
        .await?;

        info!("Seeded user {email}");
    }

    Ok(())
}
