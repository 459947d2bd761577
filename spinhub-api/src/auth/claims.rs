use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Claims carried by an access token and attached to the request after
/// the gate verifies it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Claims {
    /// Subject: the user id, stringified per JWT convention.
    pub sub: String,
    pub user_id: i32,
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
