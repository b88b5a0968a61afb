//! Text rendering of the view model.
//!
//! `render_full` prints every panel; `render_changes` prints only the panels
//! that differ between two views, with new log messages printed as a tail.

use compare_core::{AppViewModel, NameEntry, ResultsView, NO_RESULTS_NOTICE};

pub fn render_full(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(render_lists(view));
    lines.push("messages:".to_string());
    lines.extend(render_messages(&view.messages, view.message_panel_error.as_deref()));
    lines.extend(render_results(view.results.as_ref()));
    lines.push(status_line(view));
    lines.extend(render_notice(view));
    lines
}

pub fn render_changes(prev: &AppViewModel, next: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.list1 != next.list1
        || prev.list2 != next.list2
        || prev.input1 != next.input1
        || prev.input2 != next.input2
    {
        lines.extend(render_lists(next));
    }

    if prev.message_panel_error != next.message_panel_error {
        if let Some(error) = &next.message_panel_error {
            lines.push(format!("! {}", error));
        }
    }
    if next.messages.starts_with(&prev.messages) {
        lines.extend(
            next.messages[prev.messages.len()..]
                .iter()
                .map(|message| format!("> {}", message)),
        );
    } else {
        lines.push("messages:".to_string());
        lines.extend(render_messages(&next.messages, None));
    }

    if prev.results != next.results {
        lines.extend(render_results(next.results.as_ref()));
    }

    if prev.search_enabled != next.search_enabled
        || prev.save_enabled != next.save_enabled
        || prev.polling != next.polling
        || prev.launching != next.launching
    {
        lines.push(status_line(next));
    }

    if prev.notice != next.notice || prev.pending_notices != next.pending_notices {
        lines.extend(render_notice(next));
    }
    lines
}

fn render_lists(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    for (number, entries, input) in [
        (1, &view.list1, &view.input1),
        (2, &view.list2, &view.input2),
    ] {
        lines.push(format!("list {}: {}", number, entries_text(entries)));
        if !input.is_empty() {
            lines.push(format!("  input: {}", input));
        }
    }
    lines
}

fn entries_text(entries: &[NameEntry]) -> String {
    if entries.is_empty() {
        return "(empty)".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| format!("[{}] {}", idx + 1, entry.name))
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_messages(messages: &[String], panel_error: Option<&str>) -> Vec<String> {
    if let Some(error) = panel_error {
        return vec![format!("! {}", error)];
    }
    messages.iter().map(|message| format!("> {}", message)).collect()
}

fn render_results(results: Option<&ResultsView>) -> Vec<String> {
    let Some(results) = results else {
        return Vec::new();
    };
    let mut lines = vec!["results:".to_string()];
    match results {
        ResultsView::NoResults => lines.push(NO_RESULTS_NOTICE.to_string()),
        ResultsView::Stores(stores) => {
            for (idx, store) in stores.iter().enumerate() {
                lines.push(format!("{}. {}", idx + 1, store.label));
                for product in &store.products {
                    lines.push(format!("   - {} <{}>", product.label, product.href));
                }
            }
        }
    }
    lines
}

fn status_line(view: &AppViewModel) -> String {
    let session = if view.launching {
        "starting"
    } else if view.polling {
        "searching"
    } else {
        "idle"
    };
    format!(
        "[{}] search: {} | save: {}",
        session,
        on_off(view.search_enabled),
        on_off(view.save_enabled)
    )
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn render_notice(view: &AppViewModel) -> Vec<String> {
    let Some(notice) = &view.notice else {
        return Vec::new();
    };
    let mut line = format!("*** {} ***", notice);
    if view.pending_notices > 0 {
        line.push_str(&format!(" (+{} more)", view.pending_notices));
    }
    vec![line, "(press enter to continue)".to_string()]
}
