use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub fn user_agent(contact: &str) -> String {
    let base = format!("afl_tipster/{}", env!("CARGO_PKG_VERSION"));
    let contact = contact.trim();
    if contact.is_empty() {
        base
    } else {
        format!("{base} ({contact})")
    }
}

pub fn http_client(timeout_secs: u64, contact: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(user_agent(contact))
        .build()
        .context("failed to build http client")
}
