//! Price compare client: HTTP access to the search server and the poll timer.
mod api;
mod handle;
mod persist;
mod poller;
mod types;
mod wire;

pub use api::{login_blocking, ReqwestSearchApi, SearchApi};
pub use handle::{ChannelEventSink, ClientHandle, EventSink};
pub use persist::{read_state_file, write_state_file, PersistError};
pub use poller::Poller;
pub use types::{ApiError, ApiLayout, ClientEvent, ClientSettings, Credentials};
pub use wire::{results_to_json, ResultsPayload};
