use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout of the first caller wins.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// Minimal GET seam so the aggregator can run against a fake in tests.
pub trait HttpFetch {
    fn get_text(&self, url: &str) -> Result<String>;
}

impl HttpFetch for Client {
    fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .get(url)
            .header(USER_AGENT, concat!("standings_sync/", env!("CARGO_PKG_VERSION")))
            .send()
            .context("request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http {status}"));
        }
        resp.text().context("failed reading body")
    }
}

impl<T: HttpFetch + ?Sized> HttpFetch for &T {
    fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url)
    }
}
