use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::users;
use email_address::EmailAddress;
use log::*;
use sea_orm::ConnectionTrait;

pub use entity_api::user::find_by_email;

pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<users::Model>, Error> {
    Ok(entity_api::user::find_all(db).await?)
}

/// Creates a user after checking that name and email are present, the email is well
/// formed and no other user already has it.
pub async fn create(
    db: &impl ConnectionTrait,
    user_model: users::Model,
) -> Result<users::Model, Error> {
    let name = user_model.name.trim();
    let email = user_model.email.trim();

    if name.is_empty() || email.is_empty() {
        return Err(Error::validation("name and email are required"));
    }

    if !EmailAddress::is_valid(email) {
        return Err(Error::validation(format!("invalid email address: {email}")));
    }

    if find_by_email(db, email).await?.is_some() {
        info!("Refusing to create user: email {email} already exists");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Conflict("email already exists".to_string()),
            )),
        });
    }

    let user = users::Model {
        name: name.to_string(),
        email: email.to_string(),
        ..user_model
    };

    Ok(entity_api::user::create(db, user).await?)
}
