use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use compare_client::login_blocking;
use compare_core::{update, AppState, AppViewModel, Msg};
use compare_logging::{compare_debug, compare_info, compare_warn};

use super::effects::EffectRunner;
use super::persistence::SnapshotStore;
use super::ui::commands::{self, Command, CommandError, HELP};
use super::ui::render::{render_changes, render_full};
use super::Inbox;
use crate::config::ResolvedConfig;

pub fn run_app(mut config: ResolvedConfig) -> Result<()> {
    if let Some(credentials) = config.credentials.take() {
        let token = login_blocking(&config.client, &credentials)
            .with_context(|| format!("logging in as {}", credentials.username))?;
        compare_info!("Logged in as {}", credentials.username);
        config.client.bearer_token = Some(token);
    }

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();

    let runner = EffectRunner::new(&config.client, inbox_tx.clone())
        .context("starting search client")?;
    spawn_stdin_reader(inbox_tx);

    let mut app = App::new(AppState::with_options(config.options), runner, config.state_file);
    app.print(&render_full(&app.last_view))?;
    app.print(&["type `help` for commands".to_string()])?;

    if let Some(snapshot) = app.store.load() {
        compare_info!("Restoring session from {:?}", app.store.path());
        app.dispatch(Msg::Hydrate(snapshot))?;
    }

    while let Ok(item) = inbox_rx.recv() {
        match item {
            Inbox::Command(line) => {
                if !app.handle_line(&line)? {
                    break;
                }
            }
            Inbox::Update(msg) => app.dispatch(msg)?,
            Inbox::InputClosed => {
                compare_debug!("Standard input closed");
                break;
            }
        }
    }

    app.store.save(&app.state.snapshot());
    compare_info!("Exiting");
    Ok(())
}

fn spawn_stdin_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if inbox.send(Inbox::Command(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    compare_warn!("Failed to read standard input: {}", err);
                    break;
                }
            }
        }
        let _ = inbox.send(Inbox::InputClosed);
    });
}

#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    Dispatch(Vec<Msg>),
    Print(Vec<String>),
    ShowAll,
    Quit,
    Ignore,
}

/// Decides what a typed line does. While a notice is shown the line only
/// acknowledges it, whatever it says.
fn route_line(state: &AppState, line: &str) -> LineAction {
    if state.notice().is_some() {
        return LineAction::Dispatch(vec![Msg::NoticeDismissed]);
    }

    let command = match commands::parse(line) {
        Ok(command) => command,
        Err(CommandError::Empty) => return LineAction::Ignore,
        Err(err) => return LineAction::Print(vec![format!("error: {}", err)]),
    };

    match command {
        Command::Quit => LineAction::Quit,
        Command::Show => LineAction::ShowAll,
        Command::Help => LineAction::Print(vec![HELP.to_string()]),
        command => match command.into_msgs(state) {
            Ok(msgs) => LineAction::Dispatch(msgs),
            Err(err) => LineAction::Print(vec![format!("error: {}", err)]),
        },
    }
}

struct App {
    state: AppState,
    runner: EffectRunner,
    store: SnapshotStore,
    last_view: AppViewModel,
}

impl App {
    fn new(state: AppState, runner: EffectRunner, state_file: std::path::PathBuf) -> Self {
        let last_view = state.view();
        Self {
            state,
            runner,
            store: SnapshotStore::new(state_file),
            last_view,
        }
    }

    /// Returns `false` once the user asked to quit.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        match route_line(&self.state, line) {
            LineAction::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg)?;
                }
            }
            LineAction::Print(lines) => self.print(&lines)?,
            LineAction::ShowAll => {
                let view = self.state.view();
                self.print(&render_full(&view))?;
            }
            LineAction::Quit => return Ok(false),
            LineAction::Ignore => {}
        }
        Ok(true)
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);

        let was_dirty = state.consume_dirty();
        self.state = state;
        if !was_dirty {
            return Ok(());
        }

        let view = self.state.view();
        let lines = render_changes(&self.last_view, &view);
        self.last_view = view;
        self.print(&lines)?;
        self.store.save(&self.state.snapshot());
        Ok(())
    }

    fn print(&self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        Ok(())
    }
}
