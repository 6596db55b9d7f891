use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller, as seen by the scheduling handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Option<String>,
    /// Registered address, used as the onsite fallback location.
    pub address: Option<String>,
}
