//! Issue a channel token from the environment and print its decoded fields.
//!
//! ```text
//! AGORA_APP_ID=... AGORA_APP_CERTIFICATE=... cargo run --example gen_and_inspect -- my-channel
//! ```

use rtc_token::{inspect, issue, Identity, IssueOptions, TokenError};

fn main() -> Result<(), TokenError> {
    let channel = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "test-channel".to_string());
    let app_id = std::env::var("AGORA_APP_ID").ok();
    let app_certificate = std::env::var("AGORA_APP_CERTIFICATE").ok();

    let identity = Identity::Numeric(12345);
    let token = issue(
        app_id.as_deref(),
        app_certificate.as_deref(),
        &channel,
        &identity,
        IssueOptions::default(),
    )?;

    let Some(token) = token else {
        println!("No AGORA_APP_CERTIFICATE set: tokenless mode, nothing to inspect");
        return Ok(());
    };

    println!("Generated token: {token}\n");
    let view = inspect(&token)?;
    println!("Version:      {}", view.token_version);
    println!("App ID:       {}", view.app_id_hex);
    println!("Channel CRC:  {:?}", view.channel_crc);
    println!("UID CRC:      {:?}", view.uid_crc);
    for item in &view.message.items {
        println!(
            "Privilege {}: expires at {}",
            item.privilege, item.expire_ts
        );
    }
    Ok(())
}
