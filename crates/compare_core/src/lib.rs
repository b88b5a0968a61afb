//! Price compare core: pure search-session state machine and view-model helpers.
mod effect;
mod list;
mod msg;
mod render;
mod reply;
mod results;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, SavePayload};
pub use list::{EntryId, ListId, NameEntry, NameList, RemoveGesture, LONG_PRESS_THRESHOLD};
pub use msg::Msg;
pub use render::{render_results, ProductLink, ResultsView, StoreView, NO_RESULTS_NOTICE};
pub use reply::{ServerAck, StartReply, StatusReply};
pub use results::{ProductEntry, ResultSet, StoreProducts};
pub use state::{
    AppState, ControllerOptions, Controls, PollGeneration, PollerState, SessionSnapshot,
    LISTS_EMPTY_NOTICE, SEARCH_FAILED_TEXT,
};
pub use update::update;
pub use view_model::AppViewModel;
