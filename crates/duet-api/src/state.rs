use std::sync::Arc;

use duet_db::Database;

pub type AppState = Arc<AppStateInner>;

/// Built once in main and shared by every handler; the store handle lives for
/// the process lifetime.
pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}
