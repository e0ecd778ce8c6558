//! Response types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::car::Action;

/// Body of `GET /action?<name>`: `{"result": 1}` on success, `0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// 1 if the action ran, 0 if it was unknown or failed
    pub result: u8,
}

impl ActionResponse {
    /// Response for a dispatch outcome.
    pub fn from_success(ok: bool) -> Self {
        Self {
            result: u8::from(ok),
        }
    }

    /// Whether the action ran.
    pub fn is_success(&self) -> bool {
        self.result == 1
    }
}

/// Body of `GET /api/actions`: the action names the car understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsResponse {
    /// Whether the car is powered on
    pub on: bool,
    /// Accepted action names
    pub actions: Vec<Action>,
}
