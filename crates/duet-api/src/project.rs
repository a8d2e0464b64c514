//! Row-to-API projections shared by the pairing and presence handlers.
//! Single and batch presence reads both go through [`snapshot`], so one
//! staleness window applies everywhere.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use duet_db::models::{AccountRow, PendingInvitationRow, RelationshipRow};
use duet_types::api::{
    InviterInfo, PartnerInfo, PendingInvitation, PresenceSnapshot, RelationshipResponse,
};
use duet_types::{presence, time};

pub(crate) fn parse_uuid(raw: &str, field: &'static str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, raw, e);
        Uuid::default()
    })
}

pub(crate) fn parse_ts(raw: &str, field: &'static str) -> DateTime<Utc> {
    time::parse_utc(raw).unwrap_or_else(|| {
        warn!("Corrupt {} '{}'", field, raw);
        DateTime::default()
    })
}

fn last_active_of(row: &AccountRow) -> Option<DateTime<Utc>> {
    match row.last_active.as_deref() {
        Some(raw) => {
            let parsed = time::parse_utc(raw);
            if parsed.is_none() {
                warn!("Corrupt last_active '{}' on account {}", raw, row.id);
            }
            parsed
        }
        None => None,
    }
}

pub(crate) fn relationship_response(row: RelationshipRow) -> RelationshipResponse {
    RelationshipResponse {
        id: parse_uuid(&row.id, "relationship id"),
        inviter_id: parse_uuid(&row.inviter_id, "inviter_id"),
        invitee_id: row
            .invitee_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "invitee_id")),
        status: row.status,
        anniversary_date: row.anniversary_date.as_deref().and_then(time::parse_utc),
        created_at: parse_ts(&row.created_at, "created_at"),
    }
}

pub(crate) fn pending_invitation(row: PendingInvitationRow) -> PendingInvitation {
    PendingInvitation {
        id: parse_uuid(&row.id, "invitation id"),
        inviter: InviterInfo {
            id: parse_uuid(&row.inviter_id, "inviter_id"),
            name: row.inviter_name,
            email: row.inviter_email,
        },
        created_at: parse_ts(&row.created_at, "created_at"),
    }
}

pub(crate) fn partner_info(row: AccountRow) -> PartnerInfo {
    let last_active = last_active_of(&row);
    PartnerInfo {
        id: parse_uuid(&row.id, "account id"),
        name: row.display_name,
        last_active,
    }
}

pub(crate) fn snapshot(row: AccountRow, now: DateTime<Utc>) -> PresenceSnapshot {
    let last_seen = last_active_of(&row);
    PresenceSnapshot {
        account_id: parse_uuid(&row.id, "account id"),
        name: row.display_name,
        profile_image: row.profile_image,
        is_online: presence::is_online(last_seen, now),
        last_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(last_active: Option<&str>) -> AccountRow {
        AccountRow {
            id: "3e0170e7-2f63-4bb1-b26c-5278317d2ecf".into(),
            email: "alex@example.com".into(),
            display_name: "Alex".into(),
            profile_image: Some("https://cdn.example.com/a.png".into()),
            last_active: last_active.map(str::to_string),
            notify_partner_activity: true,
            created_at: "2026-08-01T00:00:00+00:00".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-08-05T12:05:00Z".parse().unwrap()
    }

    #[test]
    fn snapshot_inside_window_is_online() {
        let snap = snapshot(account(Some("2026-08-05T12:01:30+00:00")), now());
        assert!(snap.is_online);
        assert_eq!(snap.name, "Alex");
        assert_eq!(
            snap.profile_image.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert!(snap.last_seen.is_some());
    }

    #[test]
    fn snapshot_at_window_boundary_is_offline() {
        let snap = snapshot(account(Some("2026-08-05T12:00:00+00:00")), now());
        assert!(!snap.is_online);
    }

    #[test]
    fn snapshot_without_activity_is_offline_with_no_last_seen() {
        let snap = snapshot(account(None), now());
        assert!(!snap.is_online);
        assert!(snap.last_seen.is_none());
    }

    #[test]
    fn partner_projection_carries_identity_and_last_active() {
        let info = partner_info(account(Some("2026-08-05T12:01:30+00:00")));
        assert_eq!(info.name, "Alex");
        assert_eq!(
            info.id.to_string(),
            "3e0170e7-2f63-4bb1-b26c-5278317d2ecf"
        );
        assert!(info.last_active.is_some());
    }
}
