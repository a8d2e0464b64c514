use rusqlite::{Connection, OptionalExtension, params};

use duet_types::models::RelationshipStatus;

use crate::models::{AccountRow, PendingInvitationRow, RelationshipRow};
use crate::{Database, DbError, Result};

impl Database {
    // -- Accounts --

    /// Accounts are created at signup by the auth service; this is the store
    /// surface it writes through.
    pub fn create_account(
        &self,
        id: &str,
        email: &str,
        display_name: &str,
        profile_image: Option<&str>,
        now: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (id, email, display_name, profile_image, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, email, display_name, profile_image, now],
            )?;
            Ok(())
        })
    }

    pub fn get_account_by_id(&self, id: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account_by_id(conn, id))
    }

    pub fn get_account_by_email(&self, email: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, display_name, profile_image, last_active,
                            notify_partner_activity, created_at
                     FROM accounts WHERE email = ?1",
                    [email],
                    map_account_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Batch-fetch accounts for a set of ids in one pass. Unknown ids are
    /// simply absent from the result.
    pub fn get_accounts_by_ids(&self, ids: &[String]) -> Result<Vec<AccountRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, email, display_name, profile_image, last_active,
                        notify_partner_activity, created_at
                 FROM accounts WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let bind: Vec<&dyn rusqlite::types::ToSql> = ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(bind.as_slice(), map_account_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Persist a self-reported activity pulse. Last write wins: no ordering
    /// check against the stored value, so a stale client timestamp can regress
    /// it; accepted, not sequenced.
    pub fn set_last_active(&self, id: &str, timestamp: &str) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE accounts SET last_active = ?2 WHERE id = ?1",
                params![id, timestamp],
            )?;
            if updated == 0 {
                return Err(DbError::AccountNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    // -- Relationships --

    /// Create a pending invitation from the caller to an email address.
    /// Refused while either party already has a pending or active row; the
    /// check and the insert run in one transaction on the serialized
    /// connection.
    pub fn create_invitation(
        &self,
        id: &str,
        inviter_id: &str,
        inviter_email: &str,
        invitee_email: &str,
        now: &str,
    ) -> Result<RelationshipRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // The invitee may not have an account yet; the invitation then
            // carries only the email until accept resolves it.
            let invitee_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM accounts WHERE email = ?1",
                    [invitee_email],
                    |row| row.get(0),
                )
                .optional()?;

            if party_is_linked(&tx, Some(inviter_id), inviter_email)? {
                return Err(DbError::AlreadyLinked(inviter_id.to_string()));
            }
            if party_is_linked(&tx, invitee_id.as_deref(), invitee_email)? {
                return Err(DbError::AlreadyLinked(invitee_email.to_string()));
            }

            tx.execute(
                "INSERT INTO relationships (id, inviter_id, invitee_id, invitee_email, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    inviter_id,
                    invitee_id,
                    invitee_email,
                    RelationshipStatus::Pending.as_str(),
                    now
                ],
            )?;

            let row = query_relationship(&tx, id)?
                .ok_or_else(|| DbError::InvitationNotFound(id.to_string()))?;

            tx.commit()?;
            Ok(row)
        })
    }

    /// The single row with `status = ACTIVE` touching the user on either side.
    pub fn find_active_relationship(&self, user_id: &str) -> Result<Option<RelationshipRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, inviter_id, invitee_id, invitee_email, status,
                            anniversary_date, resolved_by, created_at
                     FROM relationships
                     WHERE status = ?2 AND (inviter_id = ?1 OR invitee_id = ?1)",
                    params![user_id, RelationshipStatus::Active.as_str()],
                    map_relationship_row,
                )
                .optional()?;
            row.transpose()
        })
    }

    /// All pending invitations targeting the user (by resolved id or by
    /// invited email), newest first. Inviter identity is joined in the same
    /// query.
    pub fn pending_invitations_for(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Vec<PendingInvitationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.inviter_id, a.display_name, a.email, r.created_at
                 FROM relationships r
                 JOIN accounts a ON r.inviter_id = a.id
                 WHERE r.status = ?3 AND (r.invitee_id = ?1 OR r.invitee_email = ?2)
                 ORDER BY r.created_at DESC",
            )?;

            let rows = stmt
                .query_map(
                    params![user_id, email, RelationshipStatus::Pending.as_str()],
                    |row| {
                        Ok(PendingInvitationRow {
                            id: row.get(0)?,
                            inviter_id: row.get(1)?,
                            inviter_name: row.get(2)?,
                            inviter_email: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// `PENDING -> ACTIVE`. Only the invitee may accept; the anniversary is
    /// set here, exactly once, and the invited email resolves to the caller's
    /// account.
    pub fn accept_invitation(
        &self,
        id: &str,
        caller_id: &str,
        caller_email: &str,
        now: &str,
    ) -> Result<RelationshipRow> {
        self.with_conn(|conn| {
            let row = query_relationship(conn, id)?
                .ok_or_else(|| DbError::InvitationNotFound(id.to_string()))?;
            ensure_pending_invitee(&row, caller_id, caller_email)?;

            // Conditional on status: a concurrent accept or decline that
            // commits first leaves zero rows for this update.
            let updated = conn.execute(
                "UPDATE relationships
                 SET status = ?2, invitee_id = ?3, anniversary_date = ?4, resolved_by = ?3
                 WHERE id = ?1 AND status = ?5",
                params![
                    id,
                    RelationshipStatus::Active.as_str(),
                    caller_id,
                    now,
                    RelationshipStatus::Pending.as_str()
                ],
            )?;
            if updated == 0 {
                return Err(DbError::AlreadyResolved(id.to_string()));
            }

            query_relationship(conn, id)?.ok_or_else(|| DbError::InvitationNotFound(id.to_string()))
        })
    }

    /// `PENDING -> DECLINED`. Same guards as accept; records the decliner in
    /// `resolved_by` and leaves the invitee fields untouched.
    pub fn decline_invitation(
        &self,
        id: &str,
        caller_id: &str,
        caller_email: &str,
    ) -> Result<RelationshipRow> {
        self.with_conn(|conn| {
            let row = query_relationship(conn, id)?
                .ok_or_else(|| DbError::InvitationNotFound(id.to_string()))?;
            ensure_pending_invitee(&row, caller_id, caller_email)?;

            let updated = conn.execute(
                "UPDATE relationships
                 SET status = ?2, resolved_by = ?3
                 WHERE id = ?1 AND status = ?4",
                params![
                    id,
                    RelationshipStatus::Declined.as_str(),
                    caller_id,
                    RelationshipStatus::Pending.as_str()
                ],
            )?;
            if updated == 0 {
                return Err(DbError::AlreadyResolved(id.to_string()));
            }

            query_relationship(conn, id)?.ok_or_else(|| DbError::InvitationNotFound(id.to_string()))
        })
    }
}

fn ensure_pending_invitee(
    row: &RelationshipRow,
    caller_id: &str,
    caller_email: &str,
) -> Result<()> {
    if !row.status.is_pending() {
        return Err(DbError::AlreadyResolved(row.id.clone()));
    }

    let is_invitee = match row.invitee_id.as_deref() {
        Some(invitee_id) => invitee_id == caller_id,
        // Invitations issued before the invitee signed up carry only an email.
        None => row.invitee_email.eq_ignore_ascii_case(caller_email),
    };
    if !is_invitee {
        return Err(DbError::NotInvitee(row.id.clone()));
    }

    Ok(())
}

/// Does this party already sit on a pending or active row, on either side?
fn party_is_linked(conn: &Connection, account_id: Option<&str>, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM relationships
         WHERE status IN (?3, ?4)
           AND (inviter_id = ?1 OR invitee_id = ?1 OR invitee_email = ?2)",
        params![
            account_id.unwrap_or(""),
            email,
            RelationshipStatus::Pending.as_str(),
            RelationshipStatus::Active.as_str()
        ],
    )?;
    Ok(count > 0)
}

fn query_relationship(conn: &Connection, id: &str) -> Result<Option<RelationshipRow>> {
    let row = conn
        .query_row(
            "SELECT id, inviter_id, invitee_id, invitee_email, status,
                    anniversary_date, resolved_by, created_at
             FROM relationships WHERE id = ?1",
            [id],
            map_relationship_row,
        )
        .optional()?;
    row.transpose()
}

fn query_account_by_id(conn: &Connection, id: &str) -> Result<Option<AccountRow>> {
    let row = conn
        .query_row(
            "SELECT id, email, display_name, profile_image, last_active,
                    notify_partner_activity, created_at
             FROM accounts WHERE id = ?1",
            [id],
            map_account_row,
        )
        .optional()?;
    Ok(row)
}

fn map_account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        profile_image: row.get(3)?,
        last_active: row.get(4)?,
        notify_partner_activity: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// The status column is the one place a row can be corrupt in a way the type
/// system would otherwise hide, so the mapper returns a nested result: outer
/// for SQLite, inner for the status parse.
fn map_relationship_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<RelationshipRow>> {
    let id: String = row.get(0)?;
    let raw_status: String = row.get(4)?;

    let Some(status) = RelationshipStatus::from_str(&raw_status) else {
        return Ok(Err(DbError::CorruptRow {
            id,
            column: "status",
            value: raw_status,
        }));
    };

    Ok(Ok(RelationshipRow {
        id,
        inviter_id: row.get(1)?,
        invitee_id: row.get(2)?,
        invitee_email: row.get(3)?,
        status,
        anniversary_date: row.get(5)?,
        resolved_by: row.get(6)?,
        created_at: row.get(7)?,
    }))
}
