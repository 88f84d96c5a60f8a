//! CLI command handlers.

mod account;
mod cookies;
mod ui;

use anyhow::Result;
use commenter_core::AppContext;

use crate::cli::{Command, UiCommand};

pub use account::{
    run_login_command, run_logout_command, run_probe_image_command, run_sign_up_command,
    run_update_profile_command, run_whoami_command,
};
pub use cookies::run_cookies_command;
pub use ui::{run_ui_set_command, run_ui_show_command};

/// Runs the handler for `command`.
pub async fn dispatch(command: &Command, context: &AppContext) -> Result<()> {
    match command {
        Command::Login(args) => run_login_command(context, args).await,
        Command::SignUp(args) => run_sign_up_command(context, args).await,
        Command::Whoami => run_whoami_command(context).await,
        Command::Logout => run_logout_command(context).await,
        Command::UpdateProfile(args) => run_update_profile_command(context, args).await,
        Command::ProbeImage { url } => run_probe_image_command(context, url).await,
        Command::Ui { command } => match command {
            UiCommand::Show => run_ui_show_command(context),
            UiCommand::Set { mode, text_scale } => run_ui_set_command(context, *mode, *text_scale),
        },
        Command::Cookies => run_cookies_command(context),
    }
}
