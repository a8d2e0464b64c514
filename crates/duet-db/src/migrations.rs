use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS accounts (
            id                       TEXT PRIMARY KEY,
            email                    TEXT NOT NULL UNIQUE,
            display_name             TEXT NOT NULL,
            profile_image            TEXT,
            last_active              TEXT,
            notify_partner_activity  INTEGER NOT NULL DEFAULT 1,
            created_at               TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS relationships (
            id                TEXT PRIMARY KEY,
            inviter_id        TEXT NOT NULL REFERENCES accounts(id),
            invitee_id        TEXT REFERENCES accounts(id),
            invitee_email     TEXT NOT NULL,
            status            TEXT NOT NULL,
            anniversary_date  TEXT,
            resolved_by       TEXT REFERENCES accounts(id),
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_relationships_inviter
            ON relationships(inviter_id, status);

        CREATE INDEX IF NOT EXISTS idx_relationships_invitee
            ON relationships(invitee_id, status);

        CREATE INDEX IF NOT EXISTS idx_relationships_invitee_email
            ON relationships(invitee_email, status);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
