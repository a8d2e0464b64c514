use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use duet_types::api::{
    BatchPresenceRequest, BeaconRequest, Claims, HeartbeatRequest, HeartbeatResponse,
    PresenceSnapshot,
};

use crate::error::ApiError;
use crate::pairing::resolve_partner;
use crate::project::{partner_info, snapshot};
use crate::state::AppState;

/// Self-reported activity pulse. A caller may only update their own presence,
/// never a partner's; the response carries the partner's identity and last
/// activity so the client can refresh its "online now" signal in one trip.
pub async fn heartbeat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id != claims.sub {
        return Err(ApiError::Forbidden("cannot_update_other_presence"));
    }

    let timestamp = req.timestamp.unwrap_or_else(Utc::now);

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let partner = tokio::task::spawn_blocking(move || {
        db.db.set_last_active(&user_id, &timestamp.to_rfc3339())?;
        resolve_partner(&db.db, &user_id)
    })
    .await??;

    Ok(Json(HeartbeatResponse {
        success: true,
        partner: partner.map(partner_info),
    }))
}

/// Variant without a client timestamp: the server instant is recorded. Same
/// ownership check as the heartbeat.
pub async fn offline_beacon(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BeaconRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id != claims.sub {
        return Err(ApiError::Forbidden("cannot_update_other_presence"));
    }

    let now = Utc::now();

    let db = state.clone();
    let user_id = claims.sub.to_string();
    tokio::task::spawn_blocking(move || db.db.set_last_active(&user_id, &now.to_rfc3339()))
        .await??;

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn single_presence(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();

    let db = state.clone();
    let id = user_id.to_string();
    let account = tokio::task::spawn_blocking(move || db.db.get_account_by_id(&id))
        .await??
        .ok_or(ApiError::NotFound("account_not_found"))?;

    Ok(Json(snapshot(account, now)))
}

/// One snapshot per requested id that exists; unknown ids are omitted rather
/// than failing the batch.
pub async fn batch_presence(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<BatchPresenceRequest>,
) -> Result<Json<Vec<PresenceSnapshot>>, ApiError> {
    // One shared instant for the whole batch: no staleness skew within a
    // single response.
    let now = Utc::now();

    let mut seen = HashSet::new();
    let ids: Vec<String> = req
        .user_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|id| id.to_string())
        .collect();

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.get_accounts_by_ids(&ids)).await??;

    Ok(Json(rows.into_iter().map(|row| snapshot(row, now)).collect()))
}
