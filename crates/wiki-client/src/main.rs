use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiki_client::{
    api::{self, ApiClient, IdentityService, Session, TokenSlot},
    editor, Config, Dashboard,
};
use wiki_shared::{
    api::{LoginRequest, RegisterRequest},
    validation, Role,
};

mod output;
mod shell;

#[derive(Parser)]
#[command(name = "wiki", version, about = "Read and edit the company wiki")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = Role::Viewer)]
        role: Role,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List documents, optionally filtered by title
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print a document
    Show {
        id: String,
        /// Render the Markdown to HTML
        #[arg(long)]
        html: bool,
        /// Include the revision history
        #[arg(long)]
        history: bool,
    },
    /// Create a document and open it in the editor
    New {
        /// Create with the default content and skip the editor
        #[arg(long)]
        no_edit: bool,
    },
    /// Edit a document in $EDITOR and save a new revision
    Edit { id: String },
    /// Delete a document and its history
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Make an older revision the current version
    Restore {
        id: String,
        revision: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiki=info,wiki_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let api = ApiClient::from_config(&config)?;
    let slot = TokenSlot::default_location()?;

    match cli.command {
        Command::Register { name, email, role } => register(&api, &slot, &name, &email, role).await,
        Command::Login { email } => login(&api, &slot, &email).await,
        Command::Logout => {
            slot.clear()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = require_session(&api, &slot).await?;
            output::print_user(session.user());
            println!("Server: {}", api.base_url());
            Ok(())
        }
        Command::List { search } => {
            let session = require_session(&api, &slot).await?;
            let mut dashboard = open_dashboard(&api, &session).await?;
            if let Some(query) = search {
                dashboard.set_search(&query);
            }
            output::print_listing(&dashboard);
            Ok(())
        }
        Command::Show { id, html, history } => {
            let session = require_session(&api, &slot).await?;
            let dashboard = open_document(&api, &session, &id).await?;
            let doc = dashboard.selected().context("Document did not load")?;
            output::print_document(doc, html);
            if history {
                println!();
                output::print_history(doc, dashboard.can_edit(doc));
            }
            Ok(())
        }
        Command::New { no_edit } => {
            let session = require_session(&api, &slot).await?;
            let mut dashboard = open_dashboard(&api, &session).await?;
            let request = dashboard.begin_create()?;
            dashboard.run(&api, &session, request).await?;

            let doc = dashboard.selected().context("Created document missing")?;
            println!("Created '{}' [{}]", doc.title, doc.id);
            if no_edit {
                return Ok(());
            }
            edit_and_save(&mut dashboard, &api, &session).await
        }
        Command::Edit { id } => {
            let session = require_session(&api, &slot).await?;
            let mut dashboard = open_document(&api, &session, &id).await?;
            dashboard.begin_edit()?;
            edit_and_save(&mut dashboard, &api, &session).await
        }
        Command::Delete { id, yes } => {
            let session = require_session(&api, &slot).await?;
            let mut dashboard = open_dashboard(&api, &session).await?;
            let request = dashboard.begin_delete(&id, &mut |prompt: &str| {
                yes || output::ask_yes_no(prompt)
            })?;
            dashboard.run(&api, &session, request).await?;
            println!("Deleted document {}.", id);
            Ok(())
        }
        Command::Restore { id, revision, yes } => {
            let session = require_session(&api, &slot).await?;
            let mut dashboard = open_document(&api, &session, &id).await?;
            let request = dashboard.begin_restore(&revision, &mut |prompt: &str| {
                yes || output::ask_yes_no(prompt)
            })?;
            dashboard.run(&api, &session, request).await?;

            let doc = dashboard.selected().context("Restored document missing")?;
            let current = doc.current_revision().map(|r| r.changes.as_str()).unwrap_or("-");
            println!("Restored '{}': {}", doc.title, current);
            Ok(())
        }
        Command::Shell => {
            let session = require_session(&api, &slot).await?;
            shell::run(Arc::new(api), session).await
        }
    }
}

async fn register(
    api: &ApiClient,
    slot: &TokenSlot,
    name: &str,
    email: &str,
    role: Role,
) -> Result<()> {
    let password = output::ask_secret("Password:")?;
    let confirm = output::ask_secret("Confirm password:")?;
    validation::validate_registration(name, email, &password, &confirm)?;

    let session = api
        .register(RegisterRequest {
            name: name.trim().to_string(),
            email: validation::normalize_email(email),
            password,
            role,
        })
        .await?;

    slot.save(session.token())?;
    print!("Registered ");
    output::print_user(session.user());
    Ok(())
}

async fn login(api: &ApiClient, slot: &TokenSlot, email: &str) -> Result<()> {
    let password = output::ask_secret("Password:")?;
    validation::validate_login(email, &password)?;

    let session = api
        .login(LoginRequest {
            email: validation::normalize_email(email),
            password,
        })
        .await?;

    slot.save(session.token())?;
    print!("Signed in as ");
    output::print_user(session.user());
    Ok(())
}

async fn require_session(api: &ApiClient, slot: &TokenSlot) -> Result<Session> {
    api::resume(api, slot)
        .await?
        .ok_or_else(|| anyhow!("Not signed in. Run `wiki login --email <EMAIL>` first."))
}

/// Dashboard with the document listing loaded
async fn open_dashboard(api: &ApiClient, session: &Session) -> Result<Dashboard> {
    let mut dashboard = Dashboard::new(session.user().clone());
    let request = dashboard.refresh();
    dashboard.run(api, session, request).await?;
    Ok(dashboard)
}

/// Dashboard with the listing loaded and `id` selected
async fn open_document(api: &ApiClient, session: &Session, id: &str) -> Result<Dashboard> {
    let mut dashboard = open_dashboard(api, session).await?;
    let request = dashboard.select(id);
    dashboard.run(api, session, request).await?;
    Ok(dashboard)
}

/// Open the edit buffer in $EDITOR, then save it unless nothing changed
async fn edit_and_save(
    dashboard: &mut Dashboard,
    api: &ApiClient,
    session: &Session,
) -> Result<()> {
    let buffer = dashboard
        .edit_buffer()
        .cloned()
        .context("Not in edit mode")?;
    let edited = editor::edit_externally(&buffer)?;

    if edited == buffer {
        dashboard.cancel_edit();
        println!("No changes.");
        return Ok(());
    }

    *dashboard.edit_buffer_mut()? = edited;
    if let Some(summary) = dashboard.pending_changes() {
        println!("Saving: {}", summary);
    }

    let request = dashboard.begin_save()?;
    dashboard.run(api, session, request).await?;

    if let Some(doc) = dashboard.selected() {
        println!("Saved '{}' ({} revisions).", doc.title, doc.revision_total());
    }
    Ok(())
}
