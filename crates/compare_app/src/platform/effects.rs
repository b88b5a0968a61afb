use std::sync::{mpsc, Arc};

use compare_client::{ApiError, ClientEvent, ClientHandle, ClientSettings, EventSink};
use compare_core::{Effect, Msg};
use compare_logging::{compare_debug, compare_info};

use super::Inbox;

/// Hands effects to the client thread and feeds its events back as messages.
pub struct EffectRunner {
    client: ClientHandle,
}

impl EffectRunner {
    pub fn new(settings: &ClientSettings, inbox: mpsc::Sender<Inbox>) -> Result<Self, ApiError> {
        let sink = Arc::new(AppEventSink { inbox });
        let client = ClientHandle::new(settings, sink)?;
        compare_info!(
            "Client ready base_url={} layout={:?} poll_interval={:?}",
            settings.base_url,
            settings.layout,
            settings.poll_interval
        );
        Ok(Self { client })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSearch { list1, list2 } => {
                    compare_info!(
                        "StartSearch list1_len={} list2_len={}",
                        list1.len(),
                        list2.len()
                    );
                    self.client.start_search(list1, list2);
                }
                Effect::StartPolling {
                    generation,
                    session_id,
                } => {
                    compare_debug!(
                        "StartPolling generation={} session_id={:?}",
                        generation,
                        session_id
                    );
                    self.client.start_polling(generation, session_id);
                }
                Effect::StopPolling => {
                    compare_debug!("StopPolling");
                    self.client.stop_polling();
                }
                Effect::StopSearch { session_id } => {
                    compare_info!("StopSearch session_id={:?}", session_id);
                    self.client.stop_search(session_id);
                }
                Effect::SaveSearch {
                    session_id,
                    payload,
                } => {
                    compare_info!(
                        "SaveSearch session_id={:?} messages={} stores={}",
                        session_id,
                        payload.messages.len(),
                        payload.results.store_count()
                    );
                    self.client.save_search(session_id, payload);
                }
            }
        }
    }
}

struct AppEventSink {
    inbox: mpsc::Sender<Inbox>,
}

impl EventSink for AppEventSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.inbox.send(Inbox::Update(event_to_msg(event)));
    }
}

fn event_to_msg(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::Started(result) => Msg::StartReplied(result.map_err(|e| e.to_string())),
        ClientEvent::Polled { generation, result } => Msg::PollReplied {
            generation,
            reply: result.map_err(|e| e.to_string()),
        },
        ClientEvent::Stopped(result) => Msg::StopReplied(result.map_err(|e| e.to_string())),
        ClientEvent::Saved(result) => Msg::SaveReplied(result.map_err(|e| e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compare_core::{ServerAck, StatusReply};
    use pretty_assertions::assert_eq;

    #[test]
    fn poll_event_keeps_generation_and_error_text() {
        let msg = event_to_msg(ClientEvent::Polled {
            generation: 4,
            result: Err(ApiError::HttpStatus(502)),
        });
        assert_eq!(
            msg,
            Msg::PollReplied {
                generation: 4,
                reply: Err(ApiError::HttpStatus(502).to_string()),
            }
        );
    }

    #[test]
    fn replies_pass_through() {
        let ack = ServerAck::Accepted {
            message: Some("Search stopped".into()),
        };
        assert_eq!(
            event_to_msg(ClientEvent::Stopped(Ok(ack.clone()))),
            Msg::StopReplied(Ok(ack))
        );
        assert_eq!(
            event_to_msg(ClientEvent::Polled {
                generation: 1,
                result: Ok(StatusReply::default()),
            }),
            Msg::PollReplied {
                generation: 1,
                reply: Ok(StatusReply::default()),
            }
        );
    }
}
