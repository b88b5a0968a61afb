use crate::ResultSet;

/// Outcome of a start request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartReply {
    /// The server moved the search to a session-scoped address.
    Redirected { session_id: String },
    /// The search runs under the global session.
    Accepted { messages: Vec<String> },
    /// The server refused to start, e.g. too many searches running.
    Rejected { message: String },
}

/// One poll response, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReply {
    pub messages: Vec<String>,
    pub results: Option<ResultSet>,
    pub finished: bool,
    /// Server-supplied message when the error flag was set.
    pub error: Option<String>,
}

/// Response to stop and save requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAck {
    Accepted { message: Option<String> },
    Rejected { message: String },
}
