use std::sync::{mpsc, Arc};
use std::thread;

use compare_core::{PollGeneration, SavePayload};
use compare_logging::{compare_debug, compare_warn};

use crate::api::{ReqwestSearchApi, SearchApi};
use crate::poller::Poller;
use crate::{ApiError, ClientEvent, ClientSettings};

/// Receives completed requests from the client thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

enum ClientCommand {
    Start {
        list1: Vec<String>,
        list2: Vec<String>,
    },
    StartPolling {
        generation: PollGeneration,
        session_id: Option<String>,
    },
    StopPolling,
    Stop {
        session_id: Option<String>,
    },
    Save {
        session_id: Option<String>,
        payload: SavePayload,
    },
}

/// Front of the client thread. Commands run on a tokio runtime owned by that
/// thread; results come back through the [`EventSink`].
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    pub fn new(settings: &ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestSearchApi::new(settings)?);
        Self::with_api(api, settings, sink)
    }

    pub fn with_api(
        api: Arc<dyn SearchApi>,
        settings: &ClientSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| ApiError::Runtime(err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let poll_interval = settings.poll_interval;

        thread::spawn(move || {
            let mut poller = Poller::new(poll_interval);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::StartPolling {
                        generation,
                        session_id,
                    } => {
                        let api = api.clone();
                        let sink = sink.clone();
                        poller.start(runtime.handle(), generation, move || {
                            let api = api.clone();
                            let sink = sink.clone();
                            let session_id = session_id.clone();
                            async move {
                                let result = api.status(session_id.as_deref()).await;
                                if let Err(err) = &result {
                                    compare_warn!("Poll generation {} failed: {}", generation, err);
                                }
                                sink.emit(ClientEvent::Polled { generation, result });
                            }
                        });
                    }
                    ClientCommand::StopPolling => {
                        poller.stop();
                    }
                    request => {
                        let api = api.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), request, sink.as_ref()).await;
                        });
                    }
                }
            }
            compare_debug!("Client command channel closed");
            poller.stop();
        });

        Ok(Self { cmd_tx })
    }

    pub fn start_search(&self, list1: Vec<String>, list2: Vec<String>) {
        self.send(ClientCommand::Start { list1, list2 });
    }

    pub fn start_polling(&self, generation: PollGeneration, session_id: Option<String>) {
        self.send(ClientCommand::StartPolling {
            generation,
            session_id,
        });
    }

    pub fn stop_polling(&self) {
        self.send(ClientCommand::StopPolling);
    }

    pub fn stop_search(&self, session_id: Option<String>) {
        self.send(ClientCommand::Stop { session_id });
    }

    pub fn save_search(&self, session_id: Option<String>, payload: SavePayload) {
        self.send(ClientCommand::Save {
            session_id,
            payload,
        });
    }

    fn send(&self, command: ClientCommand) {
        if self.cmd_tx.send(command).is_err() {
            compare_warn!("Client thread is gone; command dropped");
        }
    }
}

async fn handle_request(api: &dyn SearchApi, command: ClientCommand, sink: &dyn EventSink) {
    let event = match command {
        ClientCommand::Start { list1, list2 } => ClientEvent::Started(api.start(&list1, &list2).await),
        ClientCommand::Stop { session_id } => {
            ClientEvent::Stopped(api.stop(session_id.as_deref()).await)
        }
        ClientCommand::Save {
            session_id,
            payload,
        } => ClientEvent::Saved(api.save(session_id.as_deref(), &payload).await),
        ClientCommand::StartPolling { .. } | ClientCommand::StopPolling => return,
    };
    sink.emit(event);
}
