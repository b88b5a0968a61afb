mod app;
mod effects;
pub mod logging;
mod persistence;
mod ui;

use compare_core::Msg;

pub use app::run_app;

/// Everything the main loop reacts to, in arrival order.
pub(crate) enum Inbox {
    /// A line typed by the user.
    Command(String),
    /// A completed request or poll tick from the client thread.
    Update(Msg),
    /// Standard input reached end of file.
    InputClosed,
}
