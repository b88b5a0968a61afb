use std::collections::VecDeque;

use crate::render::render_results;
use crate::view_model::AppViewModel;
use crate::{ListId, NameList, ResultSet, SavePayload};

/// Notice raised when Search is pressed with an empty list.
pub const LISTS_EMPTY_NOTICE: &str = "Both lists must have at least one item.";
/// Message panel text shown when the start request never got an answer.
pub const SEARCH_FAILED_TEXT: &str = "An error occurred during search.";

/// Identifies one poll loop. Replies tagged with an older generation are stale.
pub type PollGeneration = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    Polling {
        generation: PollGeneration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub search_enabled: bool,
    pub save_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            search_enabled: true,
            save_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Re-enable Search and Save when a start request fails. Turning this off
    /// leaves Search disabled until the session is reloaded.
    pub reenable_on_start_failure: bool,
    /// Polling is addressed by session id, so a search without one cannot
    /// be followed.
    pub require_session_id: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            reenable_on_start_failure: true,
            require_session_id: false,
        }
    }
}

/// Serialized session state used to survive a restart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub names_list1: Vec<String>,
    pub names_list2: Vec<String>,
    pub messages: Vec<String>,
    pub results: ResultSet,
    /// A poll loop was running when the snapshot was taken.
    pub active: bool,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    list1: NameList,
    list2: NameList,
    input1: String,
    input2: String,
    messages: Vec<String>,
    /// `None` until results are loaded; cleared on every launch.
    results: Option<ResultSet>,
    panel_error: Option<String>,
    session_id: Option<String>,
    launching: bool,
    poller: PollerState,
    last_generation: PollGeneration,
    controls: Controls,
    notices: VecDeque<String>,
    options: ControllerOptions,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ControllerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            list1: self.list1.entries().to_vec(),
            list2: self.list2.entries().to_vec(),
            input1: self.input1.clone(),
            input2: self.input2.clone(),
            messages: self.messages.clone(),
            message_panel_error: self.panel_error.clone(),
            results: self.results.as_ref().map(render_results),
            search_enabled: self.controls.search_enabled,
            save_enabled: self.controls.save_enabled,
            polling: self.is_polling(),
            launching: self.launching,
            session_id: self.session_id.clone(),
            notice: self.notices.front().cloned(),
            pending_notices: self.notices.len().saturating_sub(1),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            names_list1: self.list1.names(),
            names_list2: self.list2.names(),
            messages: self.messages.clone(),
            results: self.results.clone().unwrap_or_default(),
            active: self.is_polling(),
            session_id: self.session_id.clone(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn list(&self, list: ListId) -> &NameList {
        match list {
            ListId::First => &self.list1,
            ListId::Second => &self.list2,
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn poller(&self) -> PollerState {
        self.poller
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Front of the notice queue.
    pub fn notice(&self) -> Option<&str> {
        self.notices.front().map(String::as_str)
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.poller, PollerState::Polling { .. })
    }

    pub(crate) fn options(&self) -> ControllerOptions {
        self.options
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn list_mut(&mut self, list: ListId) -> &mut NameList {
        match list {
            ListId::First => &mut self.list1,
            ListId::Second => &mut self.list2,
        }
    }

    pub(crate) fn input_mut(&mut self, list: ListId) -> &mut String {
        match list {
            ListId::First => &mut self.input1,
            ListId::Second => &mut self.input2,
        }
    }

    pub(crate) fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub(crate) fn push_notice(&mut self, notice: impl Into<String>) {
        self.notices.push_back(notice.into());
        self.dirty = true;
    }

    pub(crate) fn dismiss_notice(&mut self) -> bool {
        let dismissed = self.notices.pop_front().is_some();
        if dismissed {
            self.dirty = true;
        }
        dismissed
    }

    pub(crate) fn set_launching(&mut self, launching: bool) {
        self.launching = launching;
    }

    pub(crate) fn is_launching(&self) -> bool {
        self.launching
    }

    pub(crate) fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    pub(crate) fn set_panel_error(&mut self, text: Option<String>) {
        self.panel_error = text;
    }

    /// Clears messages and results ahead of a fresh search.
    pub(crate) fn reset_findings(&mut self) {
        self.messages.clear();
        self.results = None;
        self.panel_error = None;
    }

    pub(crate) fn append_messages(&mut self, messages: Vec<String>) {
        if !messages.is_empty() {
            self.messages.extend(messages);
            self.dirty = true;
        }
    }

    pub(crate) fn replace_results(&mut self, results: ResultSet) {
        self.results = Some(results);
        self.dirty = true;
    }

    /// Moves the poller to a fresh generation; any earlier loop becomes stale.
    pub(crate) fn start_poller(&mut self) -> PollGeneration {
        self.last_generation += 1;
        self.poller = PollerState::Polling {
            generation: self.last_generation,
        };
        self.last_generation
    }

    /// Returns whether a loop was running.
    pub(crate) fn stop_poller(&mut self) -> bool {
        let was_polling = self.is_polling();
        self.poller = PollerState::Idle;
        was_polling
    }

    pub(crate) fn save_payload(&self) -> SavePayload {
        SavePayload {
            list1: self.list1.names(),
            list2: self.list2.names(),
            messages: self.messages.clone(),
            results: self.results.clone().unwrap_or_default(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: SessionSnapshot) {
        self.list1 = NameList::from_names(&snapshot.names_list1);
        self.list2 = NameList::from_names(&snapshot.names_list2);
        self.messages = snapshot.messages;
        self.results = Some(snapshot.results);
        self.session_id = snapshot.session_id;
        self.panel_error = None;
        self.launching = false;
        self.dirty = true;
    }
}
