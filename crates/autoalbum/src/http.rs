//! Shared blocking HTTP client setup for the hosted services.

use std::time::Duration;

use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("autoalbum/", env!("CARGO_PKG_VERSION"));

/// Builds a blocking client with the given request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}
