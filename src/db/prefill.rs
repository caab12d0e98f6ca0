//! Starter bookmarks for an empty store.

use sqlx::SqlitePool;

use super::models::NewBookmark;
use super::queries::create_bookmark;
use crate::error::MarkResult;

/// (title, url, tags) of the starter set.
const STARTER_BOOKMARKS: &[(&str, &str, &[&str])] = &[
    ("Google", "https://google.com", &["search"]),
    ("Youtube", "https://youtube.com", &["video"]),
    ("Wikipedia", "https://wikipedia.org", &["reference"]),
    ("Reddit", "https://reddit.com", &["social"]),
    ("Github", "https://github.com", &["dev"]),
    ("Duckduckgo", "https://duckduckgo.com", &["search"]),
    ("Amazon", "https://amazon.com", &["shopping"]),
    ("Netflix", "https://netflix.com", &["video"]),
    ("Linkedin", "https://linkedin.com", &["social"]),
    ("Gemini Google", "https://gemini.google.com", &["ai"]),
    ("Chatgpt", "https://chatgpt.com", &["ai"]),
    ("Openai", "https://openai.com", &["ai"]),
    ("Twitch", "https://twitch.tv", &["video"]),
    ("Discord", "https://discord.com", &["social"]),
    ("Spotify", "https://spotify.com", &["music"]),
    ("Music Youtube", "https://music.youtube", &["music"]),
    ("Bbc", "https://bbc.com", &["news"]),
    ("Nytimes", "https://nytimes.com", &["news"]),
    ("Weather", "https://weather.com", &["news"]),
    ("Imdb", "https://imdb.com", &["reference"]),
    ("Booking", "https://booking.com", &["travel"]),
    ("Paypal", "https://paypal.com", &["finance"]),
    ("Ebay", "https://ebay.com", &["shopping"]),
    ("Etsy", "https://etsy.com", &["shopping"]),
    ("Apple", "https://apple.com", &["tech"]),
    ("Microsoft", "https://microsoft.com", &["tech"]),
    ("Office", "https://office.com", &["work"]),
    ("Zoom", "https://zoom.us", &["work"]),
    ("Telegram", "https://telegram.org", &["social"]),
    ("Brave", "https://brave.com", &["search"]),
];

/// Insert the starter set when the store has no bookmarks yet.
///
/// Returns how many bookmarks were inserted.
pub async fn prefill_if_empty(pool: &SqlitePool) -> MarkResult<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    tracing::info!("Pre-filling database with starter bookmarks...");
    for (title, url, tags) in STARTER_BOOKMARKS {
        create_bookmark(
            pool,
            &NewBookmark {
                id: None,
                title: title.to_string(),
                url: url.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                favicon_url: None,
            },
        )
        .await?;
    }
    tracing::info!("Database pre-filled with {} bookmarks", STARTER_BOOKMARKS.len());

    Ok(STARTER_BOOKMARKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{list_bookmarks, test_pool};

    #[tokio::test]
    async fn test_prefill_only_when_empty() {
        let pool = test_pool().await;

        let inserted = prefill_if_empty(&pool).await.unwrap();
        assert_eq!(inserted, STARTER_BOOKMARKS.len());
        assert_eq!(prefill_if_empty(&pool).await.unwrap(), 0);

        let list = list_bookmarks(&pool).await.unwrap();
        assert_eq!(list.len(), STARTER_BOOKMARKS.len());
        assert!(list.iter().all(|b| b.clicks == 0 && b.tags.len() == 1));
    }
}
