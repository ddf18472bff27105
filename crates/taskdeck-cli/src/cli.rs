use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Project and task dashboard client", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: <config dir>/taskdeck/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the API, overrides config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Use built-in demo data instead of a server
    #[arg(long, global = true)]
    pub demo: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch tasks, projects and users and print the admin dashboard
    Dashboard {
        /// Print the dashboard on every state change, not only at the end
        #[arg(short, long)]
        follow: bool,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Store the bearer token sent with every request
    Login {
        token: String,
    },
    /// Forget the stored bearer token
    Logout,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List {
        /// Only projects the current user belongs to
        #[arg(long)]
        mine: bool,
    },
    /// Create a project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// active, completed, on-hold
        #[arg(long)]
        status: Option<String>,
        /// YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due_date: Option<String>,
        /// Initial team member ids
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Update fields of a project
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Delete a project
    Delete {
        id: String,
    },
    /// Add a user to a project's team
    AddMember {
        id: String,
        user: String,
    },
    /// Remove a user from a project's team
    RemoveMember {
        id: String,
        user: String,
    },
    /// Add a milestone to a project
    AddMilestone {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Set the status of a milestone (pending, in-progress, completed)
    MilestoneStatus {
        id: String,
        milestone: String,
        status: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["taskdeck", "projects", "list", "--mine", "--demo", "-vv"])
            .unwrap();
        assert!(cli.demo);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Projects {
                command: ProjectCommands::List { mine: true }
            }
        ));
    }

    #[test]
    fn parses_milestone_status() {
        let cli = Cli::try_parse_from(["taskdeck", "projects", "milestone-status", "p1", "m1", "completed"])
            .unwrap();
        let Commands::Projects {
            command: ProjectCommands::MilestoneStatus { id, milestone, status },
        } = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!((id.as_str(), milestone.as_str(), status.as_str()), ("p1", "m1", "completed"));
    }

    #[test]
    fn create_requires_a_name() {
        assert!(Cli::try_parse_from(["taskdeck", "projects", "create"]).is_err());
    }
}
