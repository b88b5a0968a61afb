use crate::{PollGeneration, ResultSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSearch {
        list1: Vec<String>,
        list2: Vec<String>,
    },
    /// Start a poll loop, replacing any loop already running.
    StartPolling {
        generation: PollGeneration,
        session_id: Option<String>,
    },
    StopPolling,
    StopSearch {
        session_id: Option<String>,
    },
    SaveSearch {
        session_id: Option<String>,
        payload: SavePayload,
    },
}

/// Everything the server stores for a saved search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePayload {
    pub list1: Vec<String>,
    pub list2: Vec<String>,
    pub messages: Vec<String>,
    pub results: ResultSet,
}
