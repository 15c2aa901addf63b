use crate::error::{CliError, Result};
use colored::Colorize;
use rtc_access::{inspect_lenient, TokenView, JOIN_CHANNEL};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

pub fn handle_inspect_command(
    token: Option<String>,
    token_file: Option<PathBuf>,
    lenient: bool,
    json_output: bool,
    verbose: bool,
) -> Result<()> {
    let token = read_token(token, token_file)?;
    debug!(length = token.len(), lenient, "inspecting token");

    let view = if lenient {
        inspect_lenient(&token)
    } else {
        rtc_token::inspect(&token)?
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view, verbose);
    }
    Ok(())
}

fn read_token(token: Option<String>, token_file: Option<PathBuf>) -> Result<String> {
    let token = match (token, token_file) {
        (Some(token), _) => token,
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::InvalidInput("No token provided".to_string()));
    }
    Ok(token.to_string())
}

/// Print a decoded token as labelled fields.
pub fn print_view(view: &TokenView, verbose: bool) {
    if let Some(error) = &view.error {
        println!("{} Token could not be fully decoded: {error}", "!".yellow());
    }

    let version = if view.token_version.is_empty() {
        "(none)"
    } else {
        view.token_version.as_str()
    };
    println!("{}", "Token:".bright_cyan());
    println!("  Version: {version}");
    println!("  Base64 length: {}", view.token_base64_length);
    println!("  Byte length: {}", view.byte_length);
    println!("  Signature: {}", view.signature_hex);
    println!("  App ID: {} ({})", view.app_id_hex, view.app_id_ascii);
    println!("  Channel CRC: {}", format_crc(view.channel_crc));
    println!("  UID CRC: {}", format_crc(view.uid_crc));

    println!("{}", "Privileges:".bright_cyan());
    println!("  Count: {}", view.message.count);
    for item in &view.message.items {
        let name = if item.privilege == JOIN_CHANNEL {
            " (join channel)"
        } else {
            ""
        };
        println!(
            "  - privilege {}{name}, expires at {}",
            item.privilege, item.expire_ts
        );
    }
    if !view.is_complete() && view.error.is_none() {
        println!(
            "  {} {} of {} entries present",
            "!".yellow(),
            view.message.items.len(),
            view.message.count
        );
    }

    if verbose {
        println!("{}", "Raw:".bright_cyan());
        println!("  Message: {}", view.message_hex);
        println!("  Content: {}", view.raw_hex);
    }
}

fn format_crc(crc: Option<u32>) -> String {
    match crc {
        Some(crc) => format!("{crc} (0x{crc:08x})"),
        None => "(missing)".to_string(),
    }
}
