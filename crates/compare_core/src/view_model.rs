use crate::{NameEntry, ResultsView};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub list1: Vec<NameEntry>,
    pub list2: Vec<NameEntry>,
    pub input1: String,
    pub input2: String,
    pub messages: Vec<String>,
    /// Shown in place of the message log after a failed launch.
    pub message_panel_error: Option<String>,
    /// `None` leaves the results panel blank.
    pub results: Option<ResultsView>,
    pub search_enabled: bool,
    pub save_enabled: bool,
    pub polling: bool,
    pub launching: bool,
    pub session_id: Option<String>,
    /// Front of the notice queue; must be acknowledged before the next one.
    pub notice: Option<String>,
    /// Notices queued behind the one shown.
    pub pending_notices: usize,
}
