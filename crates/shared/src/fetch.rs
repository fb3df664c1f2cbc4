//! Remote fetch state rendered by the client for prices and shared sets

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where a one-shot remote request stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready {
        data: T,
    },
    Error {
        message: String,
    },
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    /// Settle a request. Errors keep only their message; retrying is the
    /// caller's choice.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Ready { data },
            Err(error) => Self::Error {
                message: error.to_string(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialises_with_status_tag() {
        let ready: FetchState<u32> = FetchState::from_result::<String>(Ok(3));
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            json!({ "status": "ready", "data": 3 })
        );
        let failed: FetchState<u32> = FetchState::from_result(Err("503 Service Unavailable"));
        assert_eq!(failed.error(), Some("503 Service Unavailable"));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "status": "error", "message": "503 Service Unavailable" })
        );
    }

    #[test]
    fn default_is_idle() {
        let state: FetchState<()> = FetchState::default();
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({ "status": "idle" }));
        assert!(state.data().is_none());
        assert!(!state.is_loading());
    }
}
