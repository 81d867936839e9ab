use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::str::FromStr;

use crate::query::{FilterClause, SortKey};
use crate::types::{TicketId, TicketPriority, TicketStatus, VALID_PRIORITIES, VALID_STATUSES};

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Browse and manage tickets on a ticket service")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides TICKETDESK_URL and the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests and retries to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tickets
    Ls {
        /// Filter as criterion=value (status, priority, description); repeatable
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<FilterClause>,

        /// Sort key: id, priority, status, title, description, tags
        #[arg(short, long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,

        /// Sort in descending order
        #[arg(long)]
        desc: bool,

        /// Maximum number of tickets to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Display a single ticket
    #[command(visible_alias = "s")]
    Show {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Create a new ticket
    #[command(visible_alias = "c")]
    Create {
        /// Ticket title
        title: String,

        /// Description text
        #[arg(short, long)]
        description: String,

        /// Priority: low, medium, high (default: low)
        #[arg(short, long, default_value = "low", value_parser = parse_priority)]
        priority: TicketPriority,
    },

    /// Set ticket status
    Status {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,

        /// New status: open, in-progress, closed (case-insensitive)
        #[arg(value_parser = parse_status)]
        status: TicketStatus,
    },

    /// Mark ticket as in progress
    Start {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Close a ticket. Closed tickets cannot be changed afterwards
    Close {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Move an in-progress ticket back to open
    Reopen {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Change a ticket's title and/or description
    #[command(visible_alias = "e")]
    Edit {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,

        /// New title (default: keep current)
        #[arg(short, long)]
        title: Option<String>,

        /// New description (default: keep current)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a ticket
    #[command(visible_alias = "delete")]
    Rm {
        /// Ticket ID
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Interactive session: filter, sort and edit tickets line by line
    #[command(visible_alias = "b")]
    Browse,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print one configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (base_url, timeout, connect_timeout, retries, default_sort, default_order)
        key: String,

        /// New value
        value: String,
    },

    /// Print the config file path
    Path,
}

impl Cli {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            LsOptions, cmd_browse, cmd_config_get, cmd_config_path, cmd_config_set,
            cmd_config_show, cmd_create, cmd_delete, cmd_edit, cmd_ls, cmd_show, cmd_status,
            connect,
        };

        let output = OutputOptions { json: self.json };
        let url = self.url.as_deref();

        match self.command {
            Commands::Ls {
                filters,
                sort,
                desc,
                limit,
            } => {
                let (backend, config) = connect(url)?;
                let options = LsOptions {
                    filters,
                    sort,
                    desc,
                    limit,
                };
                cmd_ls(backend, &config, options, output).await
            }

            Commands::Show { id } => cmd_show(connect(url)?.0, id, output).await,

            Commands::Create {
                title,
                description,
                priority,
            } => cmd_create(connect(url)?.0, &title, &description, priority, output).await,

            Commands::Status { id, status } => {
                cmd_status(connect(url)?.0, id, status, output).await
            }
            Commands::Start { id } => {
                cmd_status(connect(url)?.0, id, TicketStatus::InProgress, output).await
            }
            Commands::Close { id } => {
                cmd_status(connect(url)?.0, id, TicketStatus::Closed, output).await
            }
            Commands::Reopen { id } => {
                cmd_status(connect(url)?.0, id, TicketStatus::Open, output).await
            }

            Commands::Edit {
                id,
                title,
                description,
            } => {
                cmd_edit(
                    connect(url)?.0,
                    id,
                    title.as_deref(),
                    description.as_deref(),
                    output,
                )
                .await
            }

            Commands::Rm { id } => cmd_delete(connect(url)?.0, id, output).await,

            Commands::Browse => {
                let (backend, config) = connect(url)?;
                cmd_browse(backend, &config).await
            }

            Commands::Config { action } => match action {
                ConfigAction::Show => cmd_config_show(output),
                ConfigAction::Get { key } => cmd_config_get(&key, output),
                ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
                ConfigAction::Path => cmd_config_path(output),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_priority(s: &str) -> Result<TicketPriority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        VALID_PRIORITIES,
    )
}

fn parse_status(s: &str) -> Result<TicketStatus, String> {
    parse_with_validation(
        s,
        |v| TicketStatus::from_str(v).map_err(|_| String::new()),
        "status",
        VALID_STATUSES,
    )
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "sort key",
        SortKey::ALL_STRINGS,
    )
}

fn parse_filter(s: &str) -> Result<FilterClause, String> {
    FilterClause::parse(s).map_err(|e| e.to_string())
}

fn parse_ticket_id(s: &str) -> Result<TicketId, String> {
    if s.trim().is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    s.parse()
        .map_err(|_| format!("Invalid ticket ID '{s}'. Must be a positive integer"))
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "ticketdesk", &mut io::stdout());
}
