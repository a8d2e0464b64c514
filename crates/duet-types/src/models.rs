use serde::{Deserialize, Serialize};

/// Lifecycle of a partner link. A `Pending` invitation resolves exactly once,
/// to `Active` (accept) or `Declined` (decline); neither resolved state
/// transitions further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatus {
    Pending,
    Active,
    Declined,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "PENDING",
            RelationshipStatus::Active => "ACTIVE",
            RelationshipStatus::Declined => "DECLINED",
        }
    }

    /// Parse the stored TEXT value. Returns `None` for anything that is not
    /// one of the three known states so callers surface corrupt rows instead
    /// of defaulting.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RelationshipStatus::Pending),
            "ACTIVE" => Some(RelationshipStatus::Active),
            "DECLINED" => Some(RelationshipStatus::Declined),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RelationshipStatus::Pending)
    }
}
