use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use duet_db::Database;
use duet_db::models::AccountRow;
use duet_types::api::{ActionResponse, Claims, InviteRequest, PartnerInfo, PendingInvitation};

use crate::error::ApiError;
use crate::project::{partner_info, pending_invitation, relationship_response};
use crate::state::AppState;

pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<InviteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invitee_email = req.email.trim().to_ascii_lowercase();
    if invitee_email.is_empty() || !invitee_email.contains('@') {
        return Err(ApiError::BadRequest("invalid_email"));
    }
    if invitee_email.eq_ignore_ascii_case(&claims.email) {
        return Err(ApiError::BadRequest("cannot_invite_self"));
    }

    let invitation_id = Uuid::new_v4();
    let now = Utc::now();

    // Run the blocking DB work off the async runtime
    let db = state.clone();
    let id = invitation_id.to_string();
    let inviter_id = claims.sub.to_string();
    let inviter_email = claims.email.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .create_invitation(&id, &inviter_id, &inviter_email, &invitee_email, &now.to_rfc3339())
    })
    .await??;

    Ok((StatusCode::CREATED, Json(relationship_response(row))))
}

pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let email = claims.email.to_ascii_lowercase();
    let rows = tokio::task::spawn_blocking(move || db.db.pending_invitations_for(&user_id, &email))
        .await??;

    let invitations: Vec<PendingInvitation> = rows.into_iter().map(pending_invitation).collect();
    Ok(Json(invitations))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();

    let db = state.clone();
    let id = invitation_id.to_string();
    let caller_id = claims.sub.to_string();
    let caller_email = claims.email.clone();
    tokio::task::spawn_blocking(move || {
        db.db
            .accept_invitation(&id, &caller_id, &caller_email, &now.to_rfc3339())
    })
    .await??;

    Ok(Json(ActionResponse {
        message: "invitation accepted".into(),
    }))
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let id = invitation_id.to_string();
    let caller_id = claims.sub.to_string();
    let caller_email = claims.email.clone();
    tokio::task::spawn_blocking(move || db.db.decline_invitation(&id, &caller_id, &caller_email))
        .await??;

    Ok(Json(ActionResponse {
        message: "invitation declined".into(),
    }))
}

/// The caller's active relationship. Absence is a routine 404, not a fault.
pub async fn get_relationship(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let row = tokio::task::spawn_blocking(move || db.db.find_active_relationship(&user_id))
        .await??
        .ok_or(ApiError::NotFound("no_active_relationship"))?;

    Ok(Json(relationship_response(row)))
}

/// The caller's partner projected to identity + last activity; `null` when
/// the caller is unpaired.
pub async fn get_partner(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Option<PartnerInfo>>, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let account = tokio::task::spawn_blocking(move || resolve_partner(&db.db, &user_id)).await??;

    Ok(Json(account.map(partner_info)))
}

/// Whichever side of the caller's active relationship is not the caller,
/// joined to its account row. `None` when no active relationship exists.
pub(crate) fn resolve_partner(db: &Database, user_id: &str) -> duet_db::Result<Option<AccountRow>> {
    let Some(rel) = db.find_active_relationship(user_id)? else {
        return Ok(None);
    };

    let partner_id = if rel.inviter_id == user_id {
        match rel.invitee_id {
            Some(id) => id,
            None => {
                // Accept always resolves the invitee, so an active row without
                // one is corrupt.
                warn!("Active relationship {} has no invitee", rel.id);
                return Ok(None);
            }
        }
    } else {
        rel.inviter_id
    };

    db.get_account_by_id(&partner_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-08-05T12:00:00+00:00";

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_account(db: &Database, email: &str, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_account(&id, email, name, None, NOW).unwrap();
        id
    }

    #[test]
    fn resolve_partner_is_none_for_unpaired_user() {
        let db = db();
        let alex = add_account(&db, "alex@example.com", "Alex");

        assert!(resolve_partner(&db, &alex).unwrap().is_none());
    }

    #[test]
    fn resolve_partner_ignores_pending_invitations() {
        let db = db();
        let alex = add_account(&db, "alex@example.com", "Alex");
        let _sam = add_account(&db, "sam@example.com", "Sam");

        db.create_invitation(
            &Uuid::new_v4().to_string(),
            &alex,
            "alex@example.com",
            "sam@example.com",
            NOW,
        )
        .unwrap();

        assert!(resolve_partner(&db, &alex).unwrap().is_none());
    }

    #[test]
    fn resolve_partner_returns_the_other_side() {
        let db = db();
        let alex = add_account(&db, "alex@example.com", "Alex");
        let sam = add_account(&db, "sam@example.com", "Sam");

        let id = Uuid::new_v4().to_string();
        db.create_invitation(&id, &alex, "alex@example.com", "sam@example.com", NOW)
            .unwrap();
        db.accept_invitation(&id, &sam, "sam@example.com", NOW)
            .unwrap();

        let from_alex = resolve_partner(&db, &alex).unwrap().unwrap();
        assert_eq!(from_alex.id, sam);
        assert_eq!(from_alex.display_name, "Sam");

        let from_sam = resolve_partner(&db, &sam).unwrap().unwrap();
        assert_eq!(from_sam.id, alex);
    }
}
