use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use taskdeck_core::app::{App, AppBuilder, DashboardModel};
use taskdeck_core::config::ClientConfig;
use taskdeck_core::domain::{
    MilestoneDraft, MilestoneId, MilestoneStatus, ProjectDraft, ProjectId, ProjectPatch,
    ProjectStatus, UserId, parse_date,
};
use taskdeck_core::impls::InMemoryBackend;
use tracing::{Level, info, warn};

mod cli;

use cli::{Cli, Commands, ProjectCommands, TaskCommands, UserCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    let mut builder = AppBuilder::new(config);
    if cli.demo {
        info!("using demo data");
        builder = builder.backend(Arc::new(InMemoryBackend::seeded()));
    }
    let app = builder.build().context("failed to initialize client")?;

    match cli.command {
        Commands::Dashboard { follow } => dashboard(&app, follow).await,
        Commands::Projects { command } => projects(&app, command).await,
        Commands::Tasks {
            command: TaskCommands::List,
        } => print_json(&app.dispatcher().fetch_tasks().await?),
        Commands::Users {
            command: UserCommands::List,
        } => print_json(&app.dispatcher().fetch_users().await?),
        Commands::Login { token } => {
            if app.config.token.is_some() {
                warn!("TASKDECK_TOKEN is set and takes precedence over the saved token");
            }
            app.credentials
                .save(&token)
                .context("failed to save token")?;
            println!("Token saved.");
            Ok(())
        }
        Commands::Logout => {
            app.credentials.clear().context("failed to remove token")?;
            println!("Logged out.");
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn dashboard(app: &App, follow: bool) -> Result<()> {
    let name = app.config.greeting_name();
    let mut session = app.mount_dashboard();

    let model = if follow {
        session
            .watch(name, |model| println!("{model}"))
            .await
    } else {
        session.settled().await;
        let model = session.model(name);
        print!("{model}");
        model
    };

    match model {
        DashboardModel::Ready(view) if !view.errors.is_empty() => {
            bail!("{} dashboard fetch(es) failed", view.errors.len())
        }
        _ => Ok(()),
    }
}

async fn projects(app: &App, command: ProjectCommands) -> Result<()> {
    let dispatcher = app.dispatcher();
    match command {
        ProjectCommands::List { mine: false } => print_json(&dispatcher.fetch_projects().await?),
        ProjectCommands::List { mine: true } => {
            print_json(&dispatcher.fetch_user_projects().await?)
        }
        ProjectCommands::Create {
            name,
            description,
            status,
            due_date,
            members,
        } => {
            let draft = ProjectDraft {
                name,
                description,
                status: status.map(ProjectStatus::from),
                due_date: due_date.as_deref().map(date_arg).transpose()?,
                team: members.into_iter().map(UserId::from).collect(),
            };
            print_json(&dispatcher.create_project(&draft).await?)
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            status,
            due_date,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                status: status.map(ProjectStatus::from),
                due_date: due_date.as_deref().map(date_arg).transpose()?,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one of --name, --description, --status, --due-date");
            }
            print_json(&dispatcher.update_project(&ProjectId::from(id), &patch).await?)
        }
        ProjectCommands::Delete { id } => {
            let deleted = dispatcher.delete_project(&ProjectId::from(id)).await?;
            print_json(&serde_json::json!({ "id": deleted }))
        }
        ProjectCommands::AddMember { id, user } => print_json(
            &dispatcher
                .add_team_member(&ProjectId::from(id), &UserId::from(user))
                .await?,
        ),
        ProjectCommands::RemoveMember { id, user } => print_json(
            &dispatcher
                .remove_team_member(&ProjectId::from(id), &UserId::from(user))
                .await?,
        ),
        ProjectCommands::AddMilestone {
            id,
            title,
            description,
            due_date,
        } => {
            let milestone = MilestoneDraft {
                description,
                due_date: due_date.as_deref().map(date_arg).transpose()?,
                ..MilestoneDraft::new(title)
            };
            print_json(
                &dispatcher
                    .add_milestone(&ProjectId::from(id), &milestone)
                    .await?,
            )
        }
        ProjectCommands::MilestoneStatus {
            id,
            milestone,
            status,
        } => print_json(
            &dispatcher
                .update_milestone_status(
                    &ProjectId::from(id),
                    &MilestoneId::from(milestone),
                    &MilestoneStatus::from(status),
                )
                .await?,
        ),
    }
}

fn date_arg(raw: &str) -> Result<DateTime<Utc>> {
    parse_date(raw).with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
