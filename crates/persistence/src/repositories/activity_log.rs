//! Activity log table mapping.

use domain::models::{ActivityLog, ActivityStatus};

use super::record_store::{PgRecordStore, PgTable};
use crate::entities::ActivityLogEntity;

/// Store for `activity_logs`.
pub type ActivityLogRepository = PgRecordStore<ActivityLog>;

impl PgTable for ActivityLog {
    type Entity = ActivityLogEntity;

    const SELECT_COLUMNS: &'static str =
        "id, user_id, action, description, status, ip_address, created_at";

    fn from_entity(entity: ActivityLogEntity) -> Self {
        entity_to_domain(entity)
    }
}

fn entity_to_domain(entity: ActivityLogEntity) -> ActivityLog {
    ActivityLog {
        id: entity.id,
        user_id: entity.user_id,
        action: entity.action,
        description: entity.description,
        status: entity.status.parse().unwrap_or(ActivityStatus::Failure),
        ip_address: entity.ip_address,
        created_at: entity.created_at,
    }
}
