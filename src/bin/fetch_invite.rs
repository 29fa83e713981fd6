//! Download the calendar document for an invite link's query string.
//!
//! Usage: `fetch_invite '<query>' [output.ics]`

use inviteday::components::GenerationClient;
use inviteday::error::{config_error, Error};
use inviteday::invite::links::ics_download_url;
use inviteday::invite::{EventRequest, QueryParams};
use inviteday::startup;
use std::env;
use std::fs;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    let mut args = env::args().skip(1);
    let query = args
        .next()
        .ok_or_else(|| config_error("usage: fetch_invite '<query>' [output.ics]"))?;
    let output = args.next().unwrap_or_else(|| "invite.ics".to_string());

    let config = startup::load_config()?;

    let request = EventRequest::from_params(&QueryParams::from_query(&query))?;
    let url = ics_download_url(&request, &config.ics_service_host)?;

    let document = GenerationClient::new().fetch_document(&url).await?;
    fs::write(&output, &document).map_err(Error::Io)?;

    info!("Saved '{}' to {}", request.title, output);
    Ok(())
}
