//! Account command handlers: login, sign-up, whoami, logout, profile edits.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result, anyhow, bail};
use commenter_core::api::FieldError;
use commenter_core::{ActionOutcome, AppContext, PictureSource, ProfileChanges, ReauthOutcome, User};
use tracing::info;

use crate::cli::{LoginArgs, SignUpArgs, UpdateProfileArgs};

pub async fn run_login_command(context: &AppContext, args: &LoginArgs) -> Result<()> {
    let password = password_or_stdin(args.password.as_deref())?;
    let outcome = context
        .account()
        .login(&args.email, &password)
        .await
        .context("Login request failed")?;
    report_outcome("Signed in", outcome)
}

pub async fn run_sign_up_command(context: &AppContext, args: &SignUpArgs) -> Result<()> {
    let password = password_or_stdin(args.password.as_deref())?;
    let outcome = context
        .account()
        .sign_up(&args.email, &password, &args.display_name)
        .await
        .context("Sign-up request failed")?;
    report_outcome("Account created", outcome)
}

pub async fn run_whoami_command(context: &AppContext) -> Result<()> {
    match restore_session(context).await? {
        Some(user) => print_user(&user),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn run_logout_command(context: &AppContext) -> Result<()> {
    context
        .account()
        .logout()
        .await
        .context("Logout request failed; local session was cleared")?;
    println!("Signed out");
    Ok(())
}

pub async fn run_update_profile_command(
    context: &AppContext,
    args: &UpdateProfileArgs,
) -> Result<()> {
    let Some(current) = restore_session(context).await? else {
        bail!("Not signed in; run `commenter login` first");
    };

    let mut changes = ProfileChanges::from_user(&current);
    if let Some(display_name) = &args.display_name {
        changes.display_name.clone_from(display_name);
    }
    if let Some(email) = &args.email {
        changes.email.clone_from(email);
    }
    if let Some(status) = &args.status {
        changes.status.clone_from(status);
    }
    if let Some(password) = &args.password {
        changes.password.clone_from(password);
    }

    let picture = if let Some(url) = &args.pic_url {
        if !context.account().check_picture_url(url).await {
            bail!("'{url}' does not serve an image");
        }
        PictureSource::Url(url.clone())
    } else if let Some(path) = &args.pic_file {
        PictureSource::File(path.clone())
    } else if let Some(background) = &args.initials {
        PictureSource::Initials {
            background: background.clone(),
        }
    } else {
        PictureSource::Unchanged(current.pic.clone())
    };

    let outcome = context
        .account()
        .update_profile(&changes, picture)
        .await
        .context("Profile update failed")?;
    report_outcome("Profile updated", outcome)
}

pub async fn run_probe_image_command(context: &AppContext, url: &str) -> Result<()> {
    let is_image = context.account().check_picture_url(url).await;
    println!("{is_image}");
    Ok(())
}

async fn restore_session(context: &AppContext) -> Result<Option<User>> {
    let outcome = context
        .account()
        .re_auth()
        .await
        .context("Session check failed")?;
    Ok(match outcome {
        ReauthOutcome::Restored(user) => Some(user),
        ReauthOutcome::Expired => {
            info!("Session expired; sign in again");
            None
        }
        ReauthOutcome::SignedOut => None,
    })
}

fn report_outcome(success_label: &str, outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Success(user) => {
            println!("{success_label}");
            print_user(&user);
            Ok(())
        }
        ActionOutcome::Rejected(error) => Err(anyhow!(describe_rejection(&error))),
        ActionOutcome::PayloadTooLarge => bail!("Picture is too large for the server"),
        ActionOutcome::ServerError => bail!("Server error; please try again"),
        ActionOutcome::Unhandled { status, message } => bail!(
            "Unexpected response (HTTP {status}): {}",
            message.as_deref().unwrap_or("<no message>")
        ),
    }
}

fn describe_rejection(error: &FieldError) -> String {
    format!("{}: {}", error.field.as_str(), error.rejection)
}

fn print_user(user: &User) {
    println!("uid = {}", user.uid);
    println!("display_name = {}", user.display_name);
    println!("email = {}", user.email);
    if !user.pic.is_empty() {
        println!("pic = {}", user.pic);
    }
    if !user.status.is_empty() {
        println!("status = {}", user.status);
    }
}

fn password_or_stdin(password: Option<&str>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password.to_string());
    }
    if io::stdin().is_terminal() {
        bail!("No password given; pass --password or pipe it on stdin");
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let password = buffer.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password provided on stdin");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commenter_core::api::{Field, Rejection};

    #[test]
    fn test_describe_rejection_names_field() {
        let error = FieldError {
            field: Field::Password,
            rejection: Rejection::IncorrectPassword,
            clears: &[Field::Password],
        };
        assert_eq!(describe_rejection(&error), "password: Incorrect password");
    }

    #[test]
    fn test_report_outcome_fails_for_non_success() {
        assert!(report_outcome("ok", ActionOutcome::ServerError).is_err());
        let err = report_outcome(
            "ok",
            ActionOutcome::Unhandled {
                status: 418,
                message: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("418"));
    }
}
