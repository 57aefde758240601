use std::time::Duration;

use reqwest::{Client, ClientBuilder, Error};

/// Stable product token so catalog operators can identify our requests.
pub const APP_USER_AGENT: &str = concat!("theme-admin/", env!("CARGO_PKG_VERSION"));

pub fn apply_default_user_agent(builder: ClientBuilder) -> ClientBuilder {
    builder.user_agent(APP_USER_AGENT)
}

pub fn build_http_client(builder: ClientBuilder) -> Result<Client, Error> {
    apply_default_user_agent(builder).build()
}

/// Client used for catalog calls and archive downloads
pub fn build_catalog_client(timeout_secs: u64) -> Result<Client, Error> {
    build_http_client(
        Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs.max(1))),
    )
}
