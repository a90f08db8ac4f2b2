//! City table mapping.

use domain::models::{City, CityStatus};

use super::record_store::{PgRecordStore, PgTable};
use crate::entities::CityEntity;

/// Store for `cities`.
pub type CityRepository = PgRecordStore<City>;

impl PgTable for City {
    type Entity = CityEntity;

    const SELECT_COLUMNS: &'static str = "id, country_id, name, status, created_at";

    fn from_entity(entity: CityEntity) -> Self {
        entity_to_domain(entity)
    }
}

fn entity_to_domain(entity: CityEntity) -> City {
    City {
        id: entity.id,
        country_id: entity.country_id,
        name: entity.name,
        status: entity.status.parse().unwrap_or(CityStatus::Inactive),
        created_at: entity.created_at,
    }
}
