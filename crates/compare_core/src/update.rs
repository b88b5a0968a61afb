use compare_logging::{compare_debug, compare_error, compare_info, compare_warn};

use crate::state::{LISTS_EMPTY_NOTICE, SEARCH_FAILED_TEXT};
use crate::{AppState, Effect, ListId, Msg, PollerState, ServerAck, StartReply, StatusReply};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged { list, text } => {
            *state.input_mut(list) = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AddClicked { list } => {
            let input = state.input_mut(list).clone();
            if state.list_mut(list).add(&input).is_some() {
                state.input_mut(list).clear();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EntryGesture {
            list,
            entry,
            gesture,
        } => {
            if gesture.triggers_removal() && state.list_mut(list).remove(entry) {
                compare_debug!("Removed entry {} from {:?}", entry, list);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SearchClicked => search_clicked(&mut state),
        Msg::StartReplied(reply) => start_replied(&mut state, reply),
        Msg::PollReplied { generation, reply } => {
            let current = match state.poller() {
                PollerState::Polling { generation } => Some(generation),
                PollerState::Idle => None,
            };
            if current != Some(generation) {
                compare_debug!(
                    "Discarding poll reply from generation {} (current {:?})",
                    generation,
                    current
                );
                return (state, Vec::new());
            }
            match reply {
                Ok(status) => poll_replied(&mut state, status),
                Err(err) => {
                    compare_warn!("Error fetching messages: {}", err);
                    Vec::new()
                }
            }
        }
        Msg::StopClicked => vec![Effect::StopSearch {
            session_id: state.session_id().map(ToOwned::to_owned),
        }],
        Msg::StopReplied(reply) => stop_replied(&mut state, reply),
        Msg::SaveClicked => {
            if !state.controls().save_enabled {
                compare_debug!("Save ignored: control disabled");
                return (state, Vec::new());
            }
            state.controls_mut().save_enabled = false;
            state.mark_dirty();
            vec![Effect::SaveSearch {
                session_id: state.session_id().map(ToOwned::to_owned),
                payload: state.save_payload(),
            }]
        }
        Msg::SaveReplied(reply) => save_replied(&mut state, reply),
        Msg::Hydrate(snapshot) => {
            let has_session = snapshot.session_id.as_deref().is_some_and(|id| !id.is_empty());
            let resume = snapshot.active && (has_session || !state.options().require_session_id);
            if snapshot.active && !resume {
                compare_warn!("Restored search has no session id; not resuming polling");
            }
            let was_polling = state.is_polling();
            state.restore(snapshot);
            if resume {
                // A running session keeps its controls locked until it ends.
                let controls = state.controls_mut();
                controls.search_enabled = false;
                controls.save_enabled = false;
                vec![start_polling(&mut state)]
            } else {
                let controls = state.controls_mut();
                controls.search_enabled = true;
                controls.save_enabled = true;
                if was_polling {
                    state.stop_poller();
                    vec![Effect::StopPolling]
                } else {
                    Vec::new()
                }
            }
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
    };

    (state, effects)
}

fn search_clicked(state: &mut AppState) -> Vec<Effect> {
    if !state.controls().search_enabled {
        compare_debug!("Search ignored: control disabled");
        return Vec::new();
    }
    if state.list(ListId::First).is_empty() || state.list(ListId::Second).is_empty() {
        state.push_notice(LISTS_EMPTY_NOTICE);
        return Vec::new();
    }

    let controls = state.controls_mut();
    controls.search_enabled = false;
    controls.save_enabled = false;
    state.set_launching(true);
    state.mark_dirty();
    vec![Effect::StartSearch {
        list1: state.list(ListId::First).names(),
        list2: state.list(ListId::Second).names(),
    }]
}

fn start_replied(state: &mut AppState, reply: Result<StartReply, String>) -> Vec<Effect> {
    if !state.is_launching() {
        compare_warn!("Ignoring start reply with no launch pending");
        return Vec::new();
    }
    state.set_launching(false);
    state.mark_dirty();

    match reply {
        Ok(StartReply::Redirected { session_id }) => {
            compare_info!("Search moved to session {}", session_id);
            state.set_session_id(Some(session_id));
            state.reset_findings();
            vec![start_polling(state)]
        }
        Ok(StartReply::Accepted { .. }) if state.options().require_session_id => {
            compare_error!("Start reply named no session; nothing to poll");
            state.set_panel_error(Some(SEARCH_FAILED_TEXT.to_string()));
            reconcile_after_start_failure(state);
            Vec::new()
        }
        Ok(StartReply::Accepted { messages }) => {
            state.reset_findings();
            state.append_messages(messages);
            vec![start_polling(state)]
        }
        Ok(StartReply::Rejected { message }) => {
            state.push_notice(message);
            reconcile_after_start_failure(state);
            Vec::new()
        }
        Err(err) => {
            compare_error!("Start request failed: {}", err);
            state.set_panel_error(Some(SEARCH_FAILED_TEXT.to_string()));
            reconcile_after_start_failure(state);
            Vec::new()
        }
    }
}

fn reconcile_after_start_failure(state: &mut AppState) {
    if state.options().reenable_on_start_failure {
        let controls = state.controls_mut();
        controls.search_enabled = true;
        controls.save_enabled = true;
    }
}

fn start_polling(state: &mut AppState) -> Effect {
    if state.is_polling() {
        compare_info!("Clearing existing poll loop");
    }
    let generation = state.start_poller();
    compare_info!("Starting poll loop generation {}", generation);
    Effect::StartPolling {
        generation,
        session_id: state.session_id().map(ToOwned::to_owned),
    }
}

fn poll_replied(state: &mut AppState, status: StatusReply) -> Vec<Effect> {
    state.append_messages(status.messages);
    if let Some(results) = status.results {
        state.replace_results(results);
    }

    let terminal = match status.error {
        Some(message) => {
            state.push_notice(message);
            true
        }
        None => status.finished,
    };
    if !terminal {
        return Vec::new();
    }

    state.stop_poller();
    let controls = state.controls_mut();
    controls.search_enabled = true;
    controls.save_enabled = true;
    state.mark_dirty();
    vec![Effect::StopPolling]
}

fn stop_replied(state: &mut AppState, reply: Result<ServerAck, String>) -> Vec<Effect> {
    state.controls_mut().search_enabled = true;
    state.mark_dirty();

    match reply {
        Ok(ServerAck::Accepted { message }) => {
            compare_info!("Search stopped");
            if let Some(message) = message {
                state.push_notice(message);
            }
            if state.stop_poller() {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Ok(ServerAck::Rejected { message }) => {
            compare_warn!("Failed to stop search: {}", message);
            state.push_notice(message);
            Vec::new()
        }
        Err(err) => {
            compare_error!("Stop request failed: {}", err);
            Vec::new()
        }
    }
}

fn save_replied(state: &mut AppState, reply: Result<ServerAck, String>) -> Vec<Effect> {
    state.controls_mut().search_enabled = true;
    state.mark_dirty();

    match reply {
        Ok(ServerAck::Accepted { message }) => {
            compare_info!("Search saved");
            if let Some(message) = message {
                state.push_notice(message);
            }
        }
        Ok(ServerAck::Rejected { message }) => {
            compare_warn!("Failed to save search: {}", message);
            state.push_notice(message);
            state.controls_mut().save_enabled = true;
        }
        Err(err) => {
            compare_error!("Save request failed: {}", err);
            state.controls_mut().save_enabled = true;
        }
    }
    Vec::new()
}
