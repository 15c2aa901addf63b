use crate::cli::Credentials;
use crate::commands::inspect::print_view;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use colored::Colorize;
use rand::Rng;
use rtc_access::{AccessConfig, AccessTokenService, IssuedToken, Role, TokenMode};
use tracing::info;

/// Range random uids are drawn from when `--uid` is omitted.
const RANDOM_UID_RANGE: std::ops::RangeInclusive<u32> = 1000..=900_999;

/// Arguments of `rtc-token issue`
pub struct IssueRequest {
    pub channel: Option<String>,
    pub uid: Option<String>,
    pub role: Option<Role>,
    pub expire: Option<u32>,
    pub inspect: bool,
    pub credentials: Credentials,
}

pub fn handle_issue_command(request: IssueRequest, json_output: bool, verbose: bool) -> Result<()> {
    let cli_config = CliConfig::load()?;

    let channel = request
        .channel
        .or(cli_config.default_channel.clone())
        .ok_or_else(|| {
            CliError::InvalidInput(
                "Channel is required (--channel or `rtc-token config set default_channel <name>`)"
                    .to_string(),
            )
        })?;

    let uid = request.uid.unwrap_or_else(|| {
        let uid = rand::thread_rng().gen_range(RANDOM_UID_RANGE);
        info!(uid, "no uid given, using a random one");
        uid.to_string()
    });

    let service = build_service(
        &request.credentials,
        request.role.unwrap_or(cli_config.role()),
        request.expire.unwrap_or(cli_config.expire_seconds()),
    )?;

    if request.inspect {
        let inspected = service.issue_and_inspect(&channel, &uid)?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&inspected)?);
        } else {
            print_issued(&inspected.issued, Some(service.config().default_role), verbose);
            if let Some(view) = &inspected.view {
                println!();
                print_view(view, verbose);
            }
        }
        return Ok(());
    }

    let issued = service.issue(&channel, &uid)?;
    if json_output {
        println!("{}", issued.to_json()?);
    } else {
        print_issued(&issued, Some(service.config().default_role), verbose);
    }
    Ok(())
}

pub fn handle_issue_rtm_command(
    account: String,
    expire: Option<u32>,
    credentials: Credentials,
    json_output: bool,
    verbose: bool,
) -> Result<()> {
    let cli_config = CliConfig::load()?;
    let service = build_service(
        &credentials,
        Role::default(),
        expire.unwrap_or(cli_config.expire_seconds()),
    )?;

    let issued = service.issue_rtm(&account)?;
    if json_output {
        println!("{}", issued.to_json()?);
    } else {
        print_issued(&issued, None, verbose);
    }
    Ok(())
}

fn build_service(
    credentials: &Credentials,
    role: Role,
    expire_seconds: u32,
) -> Result<AccessTokenService> {
    let app_id = credentials
        .app_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            CliError::Config("App ID is required (--app-id or AGORA_APP_ID)".to_string())
        })?;

    let mut builder = AccessConfig::builder()
        .app_id(app_id)
        .default_role(role)
        .default_expire_seconds(expire_seconds);
    if let Some(certificate) = credentials.app_certificate.as_deref() {
        if !certificate.is_empty() {
            builder = builder.app_certificate(certificate);
        }
    }

    Ok(AccessTokenService::new(builder.build()?)?)
}

/// `role` is `None` for messaging tokens, which carry no role.
fn print_issued(issued: &IssuedToken, role: Option<Role>, verbose: bool) {
    match (&issued.token, issued.mode()) {
        (Some(token), TokenMode::Secure) => {
            println!("{} Token issued", "✓".green());
            if verbose {
                println!("  Channel: {}", display_channel(&issued.channel).bright_cyan());
                println!("  Uid: {}", issued.uid.bright_cyan());
                if let Some(role) = role {
                    println!("  Role: {role}");
                }
                if let Some(expires_at) = issued.expires_at {
                    println!("  Expires: {}", expires_at.to_rfc3339());
                }
            }
            println!("{token}");
        }
        _ => {
            println!(
                "{} No app certificate configured: tokenless mode, no token issued",
                "!".yellow()
            );
            if verbose {
                println!("  Channel: {}", display_channel(&issued.channel));
                println!("  Uid: {}", issued.uid);
            }
        }
    }
}

fn display_channel(channel: &str) -> &str {
    if channel.is_empty() {
        "(none)"
    } else {
        channel
    }
}
