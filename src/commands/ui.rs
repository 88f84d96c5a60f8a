//! UI preference command handlers.

use anyhow::{Context, Result, bail};
use commenter_core::{AppContext, UiMode, UiPreferences};

pub fn run_ui_show_command(context: &AppContext) -> Result<()> {
    print_preferences(context.ui().current());
    Ok(())
}

pub fn run_ui_set_command(
    context: &AppContext,
    mode: Option<UiMode>,
    text_scale: Option<f32>,
) -> Result<()> {
    if mode.is_none() && text_scale.is_none() {
        bail!("Nothing to change; pass --mode and/or --text-scale");
    }

    let mut updated = context.ui().current();
    if let Some(mode) = mode {
        updated = context
            .ui()
            .set_mode(mode)
            .context("Failed to save UI mode")?;
    }
    if let Some(text_scale) = text_scale {
        updated = context
            .ui()
            .set_text_scale(text_scale)
            .context("Failed to save text scale")?;
    }
    print_preferences(updated);
    Ok(())
}

fn print_preferences(preferences: UiPreferences) {
    println!("ui_mode = {}", preferences.ui_mode);
    println!("text_scale = {:.2}", preferences.tsf);
}
