use crate::{EntryId, ListId, PollGeneration, RemoveGesture, ServerAck, SessionSnapshot, StartReply, StatusReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the input box of a list.
    InputChanged { list: ListId, text: String },
    /// User asked to add the current input to a list.
    AddClicked { list: ListId },
    /// User performed a removal gesture on a list entry.
    EntryGesture {
        list: ListId,
        entry: EntryId,
        gesture: RemoveGesture,
    },
    /// User clicked Search.
    SearchClicked,
    /// Start request finished. `Err` carries a transport failure description.
    StartReplied(Result<StartReply, String>),
    /// A poll tick finished.
    PollReplied {
        generation: PollGeneration,
        reply: Result<StatusReply, String>,
    },
    /// User clicked Stop.
    StopClicked,
    StopReplied(Result<ServerAck, String>),
    /// User clicked Save.
    SaveClicked,
    SaveReplied(Result<ServerAck, String>),
    /// Restore a previously persisted session.
    Hydrate(SessionSnapshot),
    /// User acknowledged the front notice.
    NoticeDismissed,
}
