use std::fmt::Write as _;

use crate::{
    config::ConfigError,
    http::{self, ApiError},
};

pub mod campaigns;
mod input;
pub mod lists;
pub mod subscribers;
mod table;
pub mod templates;
pub mod transactional;

pub use campaigns::{CampaignsCommand, format_campaign_output};
pub use lists::{ListsArgs, lists};
pub use subscribers::SubscribersCommand;
pub use templates::TemplatesCommand;
pub use transactional::TxCommand;

/// Formats a failed command for stderr.
///
/// Configuration problems get a `[config]` prefix and API failures an `[api]`
/// prefix plus the HTTP status when one was received. With `debug` set, the
/// decoded response body of an API failure is appended as pretty JSON.
pub fn render_error(err: &anyhow::Error, debug: bool) -> String {
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return format!("[config] {}", config);
    }

    let api = err
        .downcast_ref::<ApiError>()
        .or_else(|| err.downcast_ref::<http::Error>().and_then(http::Error::as_api));

    match api {
        Some(api) => render_api_error(api, debug),
        None => format!("{:#}", err),
    }
}

fn render_api_error(err: &ApiError, debug: bool) -> String {
    let mut out = format!("[api] {}", err.message());
    if err.status() != 0 {
        let _ = write!(out, " (status {})", err.status());
    }

    if let Some(body) = err.body().filter(|_| debug) {
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        let _ = write!(out, "\n{}", pretty);
    }

    out
}
