use std::time::Duration;

use compare_core::{PollGeneration, ServerAck, StartReply, StatusReply};
use thiserror::Error;

/// Which family of endpoints the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiLayout {
    /// One implicit search per client: `/start_search`, `/get_messages`, ...
    #[default]
    Flat,
    /// Searches addressed by id: `/search/start`, `/search/{id}/messages`, ...
    SessionScoped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Login,
    Start,
    Messages,
    Stop,
    Save,
}

impl ApiLayout {
    /// Path segments for an operation, relative to the server base URL.
    pub(crate) fn segments<'a>(
        self,
        operation: Operation,
        session_id: Option<&'a str>,
    ) -> Result<Vec<&'a str>, ApiError> {
        let tail = match (self, operation) {
            (_, Operation::Login) => return Ok(vec!["users", "login"]),
            (ApiLayout::Flat, Operation::Start) => return Ok(vec!["start_search"]),
            (ApiLayout::Flat, Operation::Messages) => return Ok(vec!["get_messages"]),
            (ApiLayout::Flat, Operation::Stop) => return Ok(vec!["stop_search"]),
            (ApiLayout::Flat, Operation::Save) => return Ok(vec!["save_search"]),
            (ApiLayout::SessionScoped, Operation::Start) => return Ok(vec!["search", "start"]),
            (ApiLayout::SessionScoped, Operation::Messages) => "messages",
            (ApiLayout::SessionScoped, Operation::Stop) => "stop",
            (ApiLayout::SessionScoped, Operation::Save) => "save",
        };
        let id = session_id
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::MissingSession)?;
        Ok(vec!["search", id, tail])
    }

    /// JSON keys carrying the two name lists in start and save bodies.
    pub(crate) fn list_keys(self) -> (&'static str, &'static str) {
        match self {
            ApiLayout::Flat => ("list1", "list2"),
            ApiLayout::SessionScoped => ("names_list1", "names_list2"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub layout: ApiLayout,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Sent as `Authorization: Bearer <token>` on every request.
    pub bearer_token: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            layout: ApiLayout::Flat,
            poll_interval: Duration::from_millis(2000),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            bearer_token: None,
        }
    }
}

/// Username and password for the server's OAuth2 password login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("session-scoped request without a session id")]
    MissingSession,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("login rejected: {0}")]
    LoginRejected(String),
    #[error("login reply carried no access token")]
    MissingToken,
    #[error("redirect does not name a search session: {0}")]
    BadRedirect(String),
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("client runtime unavailable: {0}")]
    Runtime(String),
}

/// Completed request reported back by the client thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Started(Result<StartReply, ApiError>),
    Polled {
        generation: PollGeneration,
        result: Result<StatusReply, ApiError>,
    },
    Stopped(Result<ServerAck, ApiError>),
    Saved(Result<ServerAck, ApiError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_layout_requires_an_id() {
        let layout = ApiLayout::SessionScoped;
        assert_eq!(
            layout.segments(Operation::Stop, None),
            Err(ApiError::MissingSession)
        );
        assert_eq!(
            layout.segments(Operation::Messages, Some("abc")),
            Ok(vec!["search", "abc", "messages"])
        );
        assert_eq!(
            layout.segments(Operation::Start, None),
            Ok(vec!["search", "start"])
        );
    }

    #[test]
    fn login_path_is_shared_by_both_layouts() {
        for layout in [ApiLayout::Flat, ApiLayout::SessionScoped] {
            assert_eq!(
                layout.segments(Operation::Login, None),
                Ok(vec!["users", "login"])
            );
        }
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let text = format!("{:?}", credentials);
        assert!(text.contains("alice"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn flat_layout_ignores_session_id() {
        assert_eq!(
            ApiLayout::Flat.segments(Operation::Save, Some("abc")),
            Ok(vec!["save_search"])
        );
    }
}
