use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::RelationshipStatus;

// -- JWT Claims --

/// JWT claims issued by the external auth service and validated by the
/// duet-api middleware. Canonical definition lives here in duet-types so both
/// sides agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Pairing --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InviteRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub invitee_id: Option<Uuid>,
    pub status: RelationshipStatus,
    pub anniversary_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InviterInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PendingInvitation {
    pub id: Uuid,
    pub inviter: InviterInfo,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: String,
}

// -- Presence --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatRequest {
    pub user_id: Uuid,
    /// Client-reported activity instant. Omitted means "now" on the server.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartnerInfo {
    pub id: Uuid,
    pub name: String,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub partner: Option<PartnerInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchPresenceRequest {
    pub user_ids: Vec<Uuid>,
}

/// Read-time projection; `is_online` is computed, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceSnapshot {
    pub account_id: Uuid,
    pub name: String,
    pub profile_image: Option<String>,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}
