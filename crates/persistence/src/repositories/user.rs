//! User table mapping.

use domain::models::{User, UserStatus};

use super::record_store::{PgRecordStore, PgTable};
use crate::entities::UserEntity;

/// Store for `users`.
pub type UserRepository = PgRecordStore<User>;

impl PgTable for User {
    type Entity = UserEntity;

    const SELECT_COLUMNS: &'static str = "id, city_id, name, email, status, created_at";

    fn from_entity(entity: UserEntity) -> Self {
        entity_to_domain(entity)
    }
}

fn entity_to_domain(entity: UserEntity) -> User {
    User {
        id: entity.id,
        city_id: entity.city_id,
        name: entity.name,
        email: entity.email,
        status: entity.status.parse().unwrap_or(UserStatus::Inactive),
        created_at: entity.created_at,
    }
}
