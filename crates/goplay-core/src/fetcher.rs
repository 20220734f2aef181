//! Snippet page scraping
//!
//! Shared playground links resolve to an HTML page that embeds the program in
//! a code element (`#code` on the public playground). Fetching is a plain
//! GET followed by a select-and-read of the matched text.

use reqwest::Client;
use scraper::{Html, Selector};

use crate::errors::{PlaygroundError, Result};

/// Extract the text of every element matching `selector` from an HTML
/// document.
///
/// The text is the concatenation, in document order, of all descendant text
/// nodes of all matches and is returned as-is. Returns `CodeNotFound` when
/// nothing matches or the combined text is empty.
pub fn extract_code(html: &str, selector: &str) -> Result<String> {
    let selector = Selector::parse(selector).map_err(|e| {
        PlaygroundError::Config(format!("invalid code selector '{}': {:?}", selector, e))
    })?;

    let document = Html::parse_document(html);
    let code: String = document
        .select(&selector)
        .flat_map(|element| element.text())
        .collect();

    if code.is_empty() {
        return Err(PlaygroundError::CodeNotFound);
    }
    Ok(code)
}

pub(crate) async fn fetch_page(client: &Client, link: &str) -> Result<String> {
    log::debug!("Fetching snippet page: {}", link);

    let response = client
        .get(link)
        .send()
        .await
        .map_err(PlaygroundError::FetchTransport)?
        .error_for_status()
        .map_err(PlaygroundError::FetchTransport)?;

    response.text().await.map_err(PlaygroundError::FetchTransport)
}
