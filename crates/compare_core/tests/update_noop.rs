use compare_core::{update, AppState, ListId, Msg};

#[test]
fn blank_add_is_noop() {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::AddClicked { list: ListId::First });

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

#[test]
fn dismiss_without_notice_changes_nothing() {
    let (mut next, effects) = update(AppState::new(), Msg::NoticeDismissed);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
