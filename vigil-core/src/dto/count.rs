//! Count reply of the log service

use serde::{Deserialize, Serialize};

/// Reply to `GET_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}
