//! Lists stored session cookies without their values.

use anyhow::Result;
use commenter_core::AppContext;

pub fn run_cookies_command(context: &AppContext) -> Result<()> {
    let cookies = context.jar().all();
    if cookies.is_empty() {
        println!("No session cookies stored");
        return Ok(());
    }

    for cookie in &cookies {
        let expires = cookie
            .expires
            .map_or_else(|| "session".to_string(), |at| at.to_string());
        println!(
            "{}\t{}\t{}\texpires={}{}{}",
            cookie.domain,
            cookie.name,
            cookie.path,
            expires,
            if cookie.secure { "\tsecure" } else { "" },
            if cookie.http_only { "\thttponly" } else { "" },
        );
    }
    Ok(())
}
