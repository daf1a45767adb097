use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use wiki_client::{
    api::{ApiClient, Session},
    dashboard::{execute, Outcome, Request},
    editor, Dashboard,
};

use crate::output;

#[derive(Debug)]
enum ShellEvent {
    Line(String),
    Outcome(Outcome),
    Closed,
}

/// Destructive command waiting for a y/N answer on the next line
enum PendingConfirm {
    Delete(String),
    Restore(String),
}

const HELP: &str = "\
commands:
  ls [query]       list documents, filtered by title
  open <id>        select a document
  show [--html]    print the selected document
  edit             edit the selected document in $EDITOR
  save | cancel    save or discard the edit
  diff             summarize unsaved changes
  history          show or hide the revision history
  restore <rev>    make an older revision current
  new              create a document
  rm <id>          delete a document
  refresh          reload the document list
  quit";

struct Shell {
    dashboard: Dashboard,
    api: Arc<ApiClient>,
    session: Session,
    tx: mpsc::Sender<ShellEvent>,
    confirm: Option<PendingConfirm>,
}

/// Interactive loop. Requests run on their own tasks and report back over
/// the event channel, so answers are applied in whatever order they arrive.
pub async fn run(api: Arc<ApiClient>, session: Session) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<ShellEvent>(100);
    let (ack_tx, ack_rx) = mpsc::channel::<()>(1);
    spawn_input(tx.clone(), ack_rx);

    let mut shell = Shell {
        dashboard: Dashboard::new(session.user().clone()),
        api,
        session,
        tx,
        confirm: None,
    };

    print!("Signed in as ");
    output::print_user(shell.dashboard.user());
    println!("Type `help` for commands.");
    let request = shell.dashboard.refresh();
    shell.dispatch(request);
    prompt();

    while let Some(event) = rx.recv().await {
        match event {
            ShellEvent::Line(line) => {
                if shell.handle_line(line.trim()) {
                    break;
                }
                prompt();
                // Let the reader take the next line only once this one is done,
                // so it never competes with an external editor for the terminal
                if ack_tx.send(()).await.is_err() {
                    break;
                }
            }
            ShellEvent::Outcome(outcome) => {
                shell.on_outcome(outcome);
                prompt();
            }
            ShellEvent::Closed => break,
        }
    }

    Ok(())
}

fn spawn_input(tx: mpsc::Sender<ShellEvent>, mut ack_rx: mpsc::Receiver<()>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(ShellEvent::Line(line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = tx.send(ShellEvent::Closed).await;
                    break;
                }
            }
            if ack_rx.recv().await.is_none() {
                break;
            }
        }
    });
}

fn prompt() {
    print!("wiki> ");
    let _ = io::stdout().flush();
}

impl Shell {
    fn dispatch(&self, request: Request) {
        let api = Arc::clone(&self.api);
        let session = self.session.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = execute(&*api, &session, request).await;
            let _ = tx.send(ShellEvent::Outcome(outcome)).await;
        });
    }

    /// Returns true when the shell should exit
    fn handle_line(&mut self, line: &str) -> bool {
        if let Some(pending) = self.confirm.take() {
            self.answer(pending, output::is_yes(line));
            return false;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let result = match command {
            "" => Ok(()),
            "help" | "?" => {
                println!("{}", HELP);
                Ok(())
            }
            "quit" | "exit" | "q" => return true,
            "ls" => {
                self.dashboard.set_search(arg);
                output::print_listing(&self.dashboard);
                Ok(())
            }
            "refresh" => {
                let request = self.dashboard.refresh();
                self.dispatch(request);
                Ok(())
            }
            "open" if !arg.is_empty() => {
                let request = self.dashboard.select(arg);
                self.dispatch(request);
                Ok(())
            }
            "show" => {
                match self.dashboard.selected() {
                    Some(doc) => output::print_document(doc, arg == "--html"),
                    None => println!("No document selected."),
                }
                Ok(())
            }
            "edit" => self.edit(),
            "diff" => {
                match self.dashboard.pending_changes() {
                    Some(summary) => println!("{}", summary),
                    None => println!("Not editing."),
                }
                Ok(())
            }
            "save" => self.dashboard.begin_save().map(|request| self.dispatch(request)),
            "cancel" => {
                self.dashboard.cancel_edit();
                println!("Edit discarded.");
                Ok(())
            }
            "history" => self.dashboard.toggle_history().map(|shown| {
                if let (true, Some(doc)) = (shown, self.dashboard.selected()) {
                    output::print_history(doc, self.dashboard.can_edit(doc));
                }
            }),
            "new" => self.dashboard.begin_create().map(|request| self.dispatch(request)),
            "rm" if !arg.is_empty() => self.ask(PendingConfirm::Delete(arg.to_string())),
            "restore" if !arg.is_empty() => self.ask(PendingConfirm::Restore(arg.to_string())),
            _ => {
                println!("Unknown command '{}'. Type `help` for commands.", line);
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("{}", err);
        }
        false
    }

    /// Run the permission checks now, ask for confirmation on the next line
    fn ask(&mut self, pending: PendingConfirm) -> Result<(), wiki_client::DashboardError> {
        let mut defer = |prompt: &str| {
            println!("{} [y/N]", prompt);
            true
        };
        match &pending {
            PendingConfirm::Delete(id) => self.dashboard.begin_delete(id, &mut defer)?,
            PendingConfirm::Restore(rev) => self.dashboard.begin_restore(rev, &mut defer)?,
        };
        self.confirm = Some(pending);
        Ok(())
    }

    fn answer(&mut self, pending: PendingConfirm, yes: bool) {
        let mut answer = |_: &str| yes;
        let result = match &pending {
            PendingConfirm::Delete(id) => self.dashboard.begin_delete(id, &mut answer),
            PendingConfirm::Restore(rev) => self.dashboard.begin_restore(rev, &mut answer),
        };

        match result {
            Ok(request) => self.dispatch(request),
            Err(err) => println!("{}", err),
        }
    }

    fn edit(&mut self) -> Result<(), wiki_client::DashboardError> {
        if !self.dashboard.is_editing() {
            self.dashboard.begin_edit()?;
        }
        let Some(buffer) = self.dashboard.edit_buffer().cloned() else {
            return Ok(());
        };

        match editor::edit_externally(&buffer) {
            Ok(edited) => {
                *self.dashboard.edit_buffer_mut()? = edited;
                if let Some(summary) = self.dashboard.pending_changes() {
                    println!("Unsaved: {}. `save` to keep, `cancel` to discard.", summary);
                }
            }
            Err(err) => println!("{:#}", err),
        }
        Ok(())
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        let stale = outcome
            .epoch()
            .is_some_and(|epoch| epoch != self.dashboard.epoch());
        let report: fn(&Dashboard) = match &outcome {
            Outcome::Listed(_) => output::print_listing,
            _ if stale => |_| println!("(ignored a late response for a previous selection)"),
            Outcome::Fetched { .. } => report_fetched,
            Outcome::Created { .. } => report_created,
            Outcome::Saved { .. } | Outcome::Restored { .. } => report_revision,
            Outcome::Deleted { .. } => |_| println!("Document deleted."),
            Outcome::Failed { .. } => |_| {}
        };

        println!();
        match self.dashboard.apply(outcome) {
            Ok(()) => report(&self.dashboard),
            Err(err) => println!("{}", err),
        }
    }
}

fn report_fetched(dashboard: &Dashboard) {
    if let Some(doc) = dashboard.selected() {
        output::print_document(doc, false);
    }
}

fn report_created(dashboard: &Dashboard) {
    if let Some(doc) = dashboard.selected() {
        println!(
            "Created '{}' [{}]. `edit` to write, `save` to keep.",
            doc.title, doc.id
        );
    }
}

fn report_revision(dashboard: &Dashboard) {
    if let Some(doc) = dashboard.selected() {
        let current = doc
            .current_revision()
            .map(|r| r.changes.as_str())
            .unwrap_or("-");
        println!(
            "'{}' now at revision {} ({}).",
            doc.title,
            doc.revision_total(),
            current
        );
    }
}
