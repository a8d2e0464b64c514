/// Database row types; these map directly to SQLite rows.
/// Distinct from the duet-types API models to keep the DB layer independent.
use duet_types::models::RelationshipStatus;

pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub profile_image: Option<String>,
    /// Never set for an account that has not reported activity.
    pub last_active: Option<String>,
    pub notify_partner_activity: bool,
    pub created_at: String,
}

pub struct RelationshipRow {
    pub id: String,
    pub inviter_id: String,
    /// Null until the invited email resolves to an account (at accept).
    pub invitee_id: Option<String>,
    pub invitee_email: String,
    pub status: RelationshipStatus,
    /// Set exactly once, at the accept transition.
    pub anniversary_date: Option<String>,
    pub resolved_by: Option<String>,
    pub created_at: String,
}

/// A pending invitation joined with the inviter's identity fields.
pub struct PendingInvitationRow {
    pub id: String,
    pub inviter_id: String,
    pub inviter_name: String,
    pub inviter_email: String,
    pub created_at: String,
}
