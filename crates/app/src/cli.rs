//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use invoicer_domain::{Ordering, SearchParams};

/// Command-line client for the invoicing API.
#[derive(Parser, Debug)]
#[command(name = "invoicer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "INVOICER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored and how long it stays valid
    Status,
    /// Refresh the access token now
    Refresh,
    /// Invoice operations
    Invoices {
        #[command(subcommand)]
        command: InvoiceCommand,
    },
}

/// Invoice subcommands.
#[derive(Subcommand, Debug)]
pub enum InvoiceCommand {
    /// List one page of invoices
    List(ListArgs),
    /// Create an invoice from a JSON file
    Create {
        /// Path to the invoice JSON object
        payload: PathBuf,
    },
}

/// Paging and filtering for `invoices list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Records per page
    #[arg(long, default_value_t = 10)]
    pub page_size: u32,

    /// Sort field
    #[arg(long, default_value = "CREATED_DATE")]
    pub sort_by: String,

    /// Sort direction (ASCENDING or DESCENDING)
    #[arg(long, default_value = "DESCENDING")]
    pub ordering: Ordering,

    /// Free-text filter
    #[arg(long)]
    pub keyword: Option<String>,
}

impl From<ListArgs> for SearchParams {
    fn from(args: ListArgs) -> Self {
        Self {
            page_num: args.page,
            page_size: args.page_size,
            sort_by: args.sort_by,
            ordering: args.ordering,
            keyword: args.keyword.filter(|k| !k.trim().is_empty()),
        }
    }
}
