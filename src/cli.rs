//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use commenter_core::UiMode;

/// Command-line client for the commenter chat service.
///
/// Session cookies and display preferences persist between runs, so a
/// `login` is remembered by every later command until `logout`.
#[derive(Parser, Debug)]
#[command(name = "commenter")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the API base URL
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Keep cookies and preferences in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with e-mail and password
    Login(LoginArgs),
    /// Create an account and sign in
    SignUp(SignUpArgs),
    /// Restore the stored session and show the signed-in user
    Whoami,
    /// Sign out and forget session cookies
    Logout,
    /// Edit the signed-in user's profile
    UpdateProfile(UpdateProfileArgs),
    /// Check whether a URL serves an image
    ProbeImage {
        /// URL to check
        url: String,
    },
    /// Show or change display preferences
    Ui {
        #[command(subcommand)]
        command: UiCommand,
    },
    /// List stored session cookies (values are never shown)
    Cookies,
}

#[derive(ClapArgs, Debug)]
pub struct LoginArgs {
    /// Account e-mail
    #[arg(long)]
    pub email: String,

    /// Password; read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct SignUpArgs {
    /// Account e-mail
    #[arg(long)]
    pub email: String,

    /// Display name shown next to comments
    #[arg(long)]
    pub display_name: String,

    /// Password; read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct UpdateProfileArgs {
    /// New display name
    #[arg(long)]
    pub display_name: Option<String>,

    /// New e-mail
    #[arg(long)]
    pub email: Option<String>,

    /// New status line
    #[arg(long)]
    pub status: Option<String>,

    /// New password
    #[arg(long)]
    pub password: Option<String>,

    /// Use an externally hosted picture
    #[arg(long, value_name = "URL", group = "picture")]
    pub pic_url: Option<String>,

    /// Upload a local picture
    #[arg(long, value_name = "PATH", group = "picture")]
    pub pic_file: Option<PathBuf>,

    /// Generate an initials avatar on this RRGGBB background
    #[arg(long, value_name = "RRGGBB", group = "picture")]
    pub initials: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum UiCommand {
    /// Print the current preferences
    Show,
    /// Change one or more preferences
    Set {
        /// Colour scheme: system, light or dark
        #[arg(long)]
        mode: Option<UiMode>,

        /// Text scale factor (clamped to 0.5-1.5)
        #[arg(long)]
        text_scale: Option<f32>,
    },
}
