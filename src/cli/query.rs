//! `puremark list`, `puremark search` and `puremark open`.

use anyhow::{bail, Context, Result};
use console::style;

use crate::client::{BookmarkStore, HttpStore};
use crate::config::Config;
use crate::db::Bookmark;
use crate::search::{self, MAX_RATING, MIN_QUERY_LEN};
use crate::session::Session;

/// Print every bookmark, newest first.
pub async fn run_list(config: &Config) -> Result<()> {
    let store = HttpStore::new(&config.client.server_url);
    let bookmarks = store
        .list_bookmarks()
        .await
        .with_context(|| format!("failed to reach {}", store.base_url()))?;

    if bookmarks.is_empty() {
        println!("{}", style("No bookmarks yet").dim());
        return Ok(());
    }

    let max_clicks = bookmarks.iter().map(|b| b.clicks).max().unwrap_or(0);
    for bookmark in &bookmarks {
        print_row(None, bookmark, search::click_rating(bookmark.clicks, max_clicks));
    }
    println!(
        "\n{} {} bookmarks",
        style("✓").green(),
        style(bookmarks.len()).bold()
    );
    Ok(())
}

/// Print the ranked result window for `query`.
pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    let session = load_session(config, query).await?;

    if session.results().is_empty() {
        println!("{}", style(no_results_message(query)).dim());
        return Ok(());
    }

    for (i, (bookmark, rating)) in session
        .results()
        .iter()
        .zip(session.ratings())
        .enumerate()
    {
        print_row(Some(i + 1), bookmark, rating);
    }
    Ok(())
}

/// Open the `index`-th result (1-based): record the usage and print the URL.
pub async fn run_open(config: &Config, query: &str, index: usize) -> Result<()> {
    let mut session = load_session(config, query).await?;

    let len = session.results().len();
    if len == 0 {
        bail!(no_results_message(query));
    }
    if index == 0 || index > len {
        bail!("Index {} is out of range (1-{})", index, len);
    }

    match session.open(index - 1).await {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => bail!("Nothing to open"),
    }
}

async fn load_session(config: &Config, query: &str) -> Result<Session<HttpStore>> {
    let store = HttpStore::new(&config.client.server_url);
    // Probe first so an unreachable server is an error rather than an empty list.
    store
        .list_bookmarks()
        .await
        .with_context(|| format!("failed to reach {}", store.base_url()))?;

    let mut session = Session::new(store);
    session.load().await;
    session.set_query(query);
    Ok(session)
}

fn print_row(position: Option<usize>, bookmark: &Bookmark, rating: u8) {
    let position = position
        .map(|p| format!("{:>2}.", p))
        .unwrap_or_else(|| "  -".to_string());
    let tags = if bookmark.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", bookmark.tags.join(", "))
    };

    println!(
        "{} {} {}{}  {}",
        style(position).dim(),
        style(rating_bar(rating)).yellow(),
        style(&bookmark.title).bold(),
        style(tags).cyan(),
        style(&bookmark.url).dim()
    );
}

/// `rating` filled dots out of the maximum.
fn rating_bar(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let empty = MAX_RATING as usize - filled;
    format!("{}{}", "●".repeat(filled), "○".repeat(empty))
}

fn no_results_message(query: &str) -> String {
    if query.chars().count() < MIN_QUERY_LEN {
        format!("Type at least {} characters to search", MIN_QUERY_LEN)
    } else {
        format!("No bookmarks match \"{}\"", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bar() {
        assert_eq!(rating_bar(0), "○○○");
        assert_eq!(rating_bar(2), "●●○");
        assert_eq!(rating_bar(3), "●●●");
        assert_eq!(rating_bar(9), "●●●");
    }

    #[test]
    fn test_no_results_message() {
        assert_eq!(no_results_message("g"), "Type at least 2 characters to search");
        assert_eq!(no_results_message("zz"), "No bookmarks match \"zz\"");
    }
}
