mod config;
mod console;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AuthClient, ClientError, ContractWorkspace, DeleteOutcome, DispatchOutcome, DraftCommand,
    FileCredentialStore, HttpContractGateway, SessionGuard, SourceFile,
};
use shared::{
    domain::{ContractId, FieldKind},
    protocol::RegisterRequest,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "contracts", about = "Upload, review and manage analysed contracts")]
struct Args {
    /// Overrides `server_url` from contracts.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    List,
    View {
        id: ContractId,
    },
    /// Upload a PDF or DOCX, review the extracted fields and save them.
    Upload {
        path: PathBuf,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = console::parse_assignment)]
        set: Vec<(FieldKind, String)>,
        #[arg(long)]
        yes: bool,
    },
    /// Re-open a stored contract, adjust fields and save them.
    Edit {
        id: ContractId,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = console::parse_assignment)]
        set: Vec<(FieldKind, String)>,
        #[arg(long)]
        yes: bool,
    },
    Delete {
        id: ContractId,
        #[arg(long)]
        yes: bool,
    },
}

struct App {
    server_url: String,
    session: Arc<SessionGuard>,
}

impl App {
    fn auth(&self) -> AuthClient {
        AuthClient::new(self.server_url.clone(), self.session.clone())
    }

    fn workspace(&self) -> ContractWorkspace {
        let gateway = HttpContractGateway::new(self.server_url.clone(), self.session.clone());
        ContractWorkspace::new(Arc::new(gateway), self.session.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let server_url = config::validate_server_url(&settings.server_url)?;
    let store = FileCredentialStore::new(settings.credential_path.clone());
    let session = SessionGuard::new(Arc::new(store)).with_context(|| {
        format!(
            "failed to load session from '{}'",
            settings.credential_path.display()
        )
    })?;
    info!(server_url = %server_url, "contracts: starting");
    let app = App {
        server_url,
        session: Arc::new(session),
    };

    match args.command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            app.auth()
                .login(&email, &password)
                .await
                .map_err(report)?;
            println!("Signed in as {email}.");
        }
        Command::Register {
            username,
            full_name,
            email,
            password,
        } => {
            let request = RegisterRequest {
                username,
                full_name,
                email,
                password: password_or_prompt(password)?,
            };
            app.auth().register(&request).await.map_err(report)?;
            println!(
                "Account created. Sign in with `contracts login --email {}`.",
                request.email
            );
        }
        Command::Logout => {
            app.auth().logout().await;
            println!("Signed out.");
        }
        Command::List => {
            let mut workspace = app.workspace();
            workspace.refresh().await.map_err(report)?;
            print!("{}", console::render_listing(workspace.contracts()));
        }
        Command::View { id } => {
            let mut workspace = app.workspace();
            let contract = workspace.request_view(id).await.map_err(report)?;
            println!("Contract {} {}", contract.id, contract.filename);
            print!("{}", console::render_fields(&contract.fields));
        }
        Command::Upload { path, set, yes } => {
            let file = SourceFile::read(&path).await?;
            let mut workspace = app.workspace();
            expect_applied(
                workspace
                    .dispatch(DraftCommand::SelectFile(Some(file)))
                    .await,
            )?;
            expect_applied(workspace.dispatch(DraftCommand::SubmitExtract).await)?;
            review_and_commit(&mut workspace, set, yes).await?;
        }
        Command::Edit { id, set, yes } => {
            let mut workspace = app.workspace();
            expect_applied(workspace.request_edit(id).await)?;
            review_and_commit(&mut workspace, set, yes).await?;
        }
        Command::Delete { id, yes } => {
            let mut workspace = app.workspace();
            let confirm = console::confirmer(yes);
            match workspace
                .request_delete(id, confirm.as_ref())
                .await
                .map_err(report)?
            {
                DeleteOutcome::Deleted => {
                    println!("Contract {id} deleted.");
                    print!("{}", console::render_listing(workspace.contracts()));
                }
                DeleteOutcome::Declined => println!("Nothing deleted."),
            }
        }
    }

    Ok(())
}

/// Applies `--set` edits, shows the draft and saves it once confirmed.
async fn review_and_commit(
    workspace: &mut ContractWorkspace,
    edits: Vec<(FieldKind, String)>,
    yes: bool,
) -> Result<()> {
    for (field, value) in edits {
        expect_applied(
            workspace
                .dispatch(DraftCommand::EditField { field, value })
                .await,
        )?;
    }
    print!(
        "{}",
        console::render_draft(workspace.draft(), workspace.controls())
    );

    if !console::confirmer(yes).confirm("Save these values?") {
        workspace.dispatch(DraftCommand::Cancel).await;
        println!("Discarded; nothing was saved.");
        return Ok(());
    }
    match workspace.dispatch(DraftCommand::SubmitSave).await {
        DispatchOutcome::Committed(id) => {
            println!("Contract {id} saved.");
            Ok(())
        }
        other => expect_applied(other),
    }
}

fn expect_applied(outcome: DispatchOutcome) -> Result<()> {
    match outcome {
        DispatchOutcome::Applied | DispatchOutcome::Committed(_) => Ok(()),
        DispatchOutcome::Notice(notice) => {
            println!("{notice}");
            Ok(())
        }
        DispatchOutcome::Ignored(reason) => bail!("{reason}"),
        DispatchOutcome::Recoverable(error) | DispatchOutcome::RedirectToLogin(error) => {
            Err(report(error))
        }
    }
}

fn report(error: ClientError) -> anyhow::Error {
    let headline = if error.requires_reauth() {
        format!("{} Run `contracts login`.", error.user_message())
    } else {
        error.user_message()
    };
    anyhow::Error::new(error).context(headline)
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => console::read_line("Password").context("failed to read password"),
    }
}
