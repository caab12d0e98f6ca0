//! Database queries.
//!
//! Uses runtime query checking to avoid needing a database connection at compile time.

use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::{MarkError, MarkResult};
use crate::{feedback, link};

/// Bookmark columns plus tags folded into one comma-joined column.
const BOOKMARK_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        b.url,
        b.faviconUrl,
        b.clicks,
        b.createdAt,
        b.updatedAt,
        (SELECT GROUP_CONCAT(t.tag_name, ',' ORDER BY t.id)
           FROM tags t
          WHERE t.bookmark_id = b.id) AS tags
    FROM bookmarks b
"#;

/// Statements replacing the store contents with an attached `incoming` database.
const IMPORT_STATEMENTS: &[&str] = &[
    "DELETE FROM tags",
    "DELETE FROM bookmarks",
    "DELETE FROM settings",
    r#"INSERT INTO bookmarks (id, title, url, faviconUrl, clicks, createdAt, updatedAt)
       SELECT id, title, url, faviconUrl, MAX(0, COALESCE(clicks, 0)), createdAt, updatedAt
         FROM incoming.bookmarks"#,
    r#"INSERT INTO tags (bookmark_id, tag_name)
       SELECT bookmark_id, tag_name
         FROM incoming.tags
        WHERE bookmark_id IN (SELECT id FROM bookmarks)
        ORDER BY id"#,
    "INSERT INTO settings (key, value) SELECT key, value FROM incoming.settings",
];

/// List all bookmarks, newest first.
pub async fn list_bookmarks(pool: &SqlitePool) -> sqlx::Result<Vec<Bookmark>> {
    let rows = sqlx::query_as::<_, BookmarkRow>(&format!(
        "{BOOKMARK_SELECT} ORDER BY b.createdAt DESC, b.rowid DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Bookmark::from).collect())
}

/// Get a bookmark by ID.
pub async fn get_bookmark<'e, E>(executor: E, id: &str) -> sqlx::Result<Option<Bookmark>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, BookmarkRow>(&format!("{BOOKMARK_SELECT} WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Bookmark::from))
}

/// Find the ID of a bookmark with this URL, ignoring case.
pub async fn find_by_url(pool: &SqlitePool, url: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar("SELECT id FROM bookmarks WHERE url = ? COLLATE NOCASE")
        .bind(url)
        .fetch_optional(pool)
        .await
}

/// Create a bookmark with zero clicks.
pub async fn create_bookmark(pool: &SqlitePool, new: &NewBookmark) -> MarkResult<Bookmark> {
    let url = link::normalize_url(&new.url);
    validate_fields(&url, new.favicon_url.as_deref(), &new.tags)?;

    if find_by_url(pool, &url).await?.is_some() {
        return Err(MarkError::Conflict(
            "Bookmark with this URL already exists".to_string(),
        ));
    }

    let id = new
        .id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let now = now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO bookmarks (id, title, url, faviconUrl, clicks, createdAt, updatedAt)
        VALUES (?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&url)
    .bind(non_blank(new.favicon_url.as_deref()))
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_tags(&mut tx, &id, &new.tags).await?;

    let bookmark = get_bookmark(&mut *tx, &id)
        .await?
        .ok_or_else(|| MarkError::NotFound(id.clone()))?;

    tx.commit().await?;
    tracing::debug!(id = %bookmark.id, url = %bookmark.url, "bookmark created");

    Ok(bookmark)
}

/// Update title, URL, favicon and tags. Clicks are left alone.
pub async fn update_bookmark(
    pool: &SqlitePool,
    id: &str,
    update: &BookmarkUpdate,
) -> MarkResult<Bookmark> {
    let url = link::normalize_url(&update.url);
    validate_fields(&url, update.favicon_url.as_deref(), &update.tags)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE bookmarks
        SET title = ?, url = ?, faviconUrl = ?, updatedAt = ?
        WHERE id = ?
        "#,
    )
    .bind(&update.title)
    .bind(&url)
    .bind(non_blank(update.favicon_url.as_deref()))
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MarkError::NotFound(format!("Bookmark {} not found", id)));
    }

    sqlx::query("DELETE FROM tags WHERE bookmark_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_tags(&mut tx, id, &update.tags).await?;

    let bookmark = get_bookmark(&mut *tx, id)
        .await?
        .ok_or_else(|| MarkError::NotFound(format!("Bookmark {} not found", id)))?;

    tx.commit().await?;
    Ok(bookmark)
}

/// Delete a bookmark. Tags are deleted by cascade.
pub async fn delete_bookmark(pool: &SqlitePool, id: &str) -> MarkResult<()> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MarkError::NotFound(format!("Bookmark {} not found", id)));
    }
    Ok(())
}

/// Record that `opened_id` was opened while `displayed_ids` were on screen.
///
/// Increments the opened bookmark and decrements every other displayed one,
/// floored at zero, in a single transaction. Nothing is written when
/// validation fails or the opened bookmark does not exist.
pub async fn record_open(
    pool: &SqlitePool,
    opened_id: &str,
    displayed_ids: &[String],
) -> MarkResult<Bookmark> {
    feedback::validate(opened_id, displayed_ids)?;

    let mut tx = pool.begin().await?;

    let bumped = sqlx::query("UPDATE bookmarks SET clicks = COALESCE(clicks, 0) + 1 WHERE id = ?")
        .bind(opened_id)
        .execute(&mut *tx)
        .await?;

    if bumped.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(MarkError::NotFound(format!(
            "Bookmark {} not found",
            opened_id
        )));
    }

    let mut demote = QueryBuilder::<Sqlite>::new(
        "UPDATE bookmarks SET clicks = MAX(0, COALESCE(clicks, 0) - 1) WHERE id != ",
    );
    demote.push_bind(opened_id);
    demote.push(" AND id IN (");
    let mut ids = demote.separated(", ");
    for id in displayed_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(")");
    demote.build().execute(&mut *tx).await?;

    let bookmark = get_bookmark(&mut *tx, opened_id)
        .await?
        .ok_or_else(|| MarkError::NotFound(format!("Bookmark {} not found", opened_id)))?;

    tx.commit().await?;
    tracing::debug!(
        id = %opened_id,
        clicks = bookmark.clicks,
        displayed = displayed_ids.len(),
        "open recorded"
    );

    Ok(bookmark)
}

/// All settings as key to boolean.
pub async fn get_settings(pool: &SqlitePool) -> sqlx::Result<SettingsMap> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(key, value)| (key, value == "true"))
        .collect())
}

/// Insert or overwrite settings, then return the full map.
pub async fn upsert_settings(
    pool: &SqlitePool,
    entries: &[(String, String)],
) -> sqlx::Result<SettingsMap> {
    let mut tx = pool.begin().await?;
    for (key, value) in entries {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    get_settings(pool).await
}

/// Write a consistent copy of the database to `dest`, which must not exist.
///
/// Fails when nothing was written; an in-memory database accepts
/// `VACUUM INTO` without producing a file.
pub async fn export_snapshot(pool: &SqlitePool, dest: &Path) -> MarkResult<()> {
    sqlx::query("VACUUM INTO ?")
        .bind(dest.to_string_lossy().into_owned())
        .execute(pool)
        .await?;

    let written = tokio::fs::metadata(dest)
        .await
        .map(|meta| meta.len())
        .unwrap_or(0);
    if written == 0 {
        return Err(MarkError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("database snapshot was not written to {}", dest.display()),
        )));
    }
    Ok(())
}

/// Replace bookmarks, tags and settings with the contents of the database
/// file at `src`. On failure the current contents are kept.
pub async fn import_snapshot(pool: &SqlitePool, src: &Path) -> MarkResult<()> {
    let mut conn = pool.acquire().await?;

    sqlx::query("ATTACH DATABASE ? AS incoming")
        .bind(src.to_string_lossy().into_owned())
        .execute(&mut *conn)
        .await?;

    let copied = copy_from_incoming(&mut conn).await;

    // Detach even when the copy failed; the connection goes back to the pool.
    let detached = sqlx::query("DETACH DATABASE incoming")
        .execute(&mut *conn)
        .await;

    copied?;
    detached?;
    Ok(())
}

async fn copy_from_incoming(conn: &mut SqliteConnection) -> MarkResult<()> {
    let mut tx = conn.begin().await?;
    for statement in IMPORT_STATEMENTS {
        if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
            tx.rollback().await?;
            return Err(MarkError::Validation(format!(
                "Incompatible database file: {}",
                e
            )));
        }
    }
    tx.commit().await?;
    Ok(())
}

async fn insert_tags(
    conn: &mut SqliteConnection,
    bookmark_id: &str,
    tags: &[String],
) -> sqlx::Result<()> {
    for tag in tags {
        sqlx::query("INSERT INTO tags (bookmark_id, tag_name) VALUES (?, ?)")
            .bind(bookmark_id)
            .bind(tag.trim())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn validate_fields(url: &str, favicon_url: Option<&str>, tags: &[String]) -> MarkResult<()> {
    if !link::is_valid_url(url.trim()) {
        return Err(MarkError::Validation("Invalid URL".to_string()));
    }

    if let Some(favicon) = favicon_url {
        if !link::is_valid_image_url(favicon) {
            return Err(MarkError::Validation(
                "Favicon must be a valid image URL".to_string(),
            ));
        }
    }

    if tags.iter().any(|tag| !link::is_valid_tag(tag)) {
        return Err(MarkError::Validation(
            "Tags can only contain letters, numbers, hyphens and underscores".to_string(),
        ));
    }

    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{file_test_pool, test_pool};

    async fn seed(pool: &SqlitePool, id: &str, clicks: i64) {
        create_bookmark(
            pool,
            &NewBookmark {
                id: Some(id.to_string()),
                title: id.to_string(),
                url: format!("https://{}.example", id.to_lowercase()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        sqlx::query("UPDATE bookmarks SET clicks = ? WHERE id = ?")
            .bind(clicks)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn clicks_of(pool: &SqlitePool, id: &str) -> i64 {
        get_bookmark(pool, id).await.unwrap().unwrap().clicks
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_with_tags() {
        let pool = test_pool().await;
        let created = create_bookmark(
            &pool,
            &NewBookmark {
                id: None,
                title: "Rust".into(),
                url: " https://rust-lang.org/ ".into(),
                tags: ids(&["lang", "systems", "docs"]),
                favicon_url: Some("https://rust-lang.org/favicon.ico".into()),
            },
        )
        .await
        .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.url, "https://rust-lang.org");
        assert_eq!(created.clicks, 0);
        assert_eq!(created.tags, vec!["lang", "systems", "docs"]);

        let fetched = get_bookmark(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_url() {
        let pool = test_pool().await;
        seed(&pool, "A", 0).await;

        let err = create_bookmark(
            &pool,
            &NewBookmark {
                title: "Again".into(),
                url: "HTTPS://A.EXAMPLE".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MarkError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let pool = test_pool().await;
        let bad_url = NewBookmark {
            title: "x".into(),
            url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            create_bookmark(&pool, &bad_url).await,
            Err(MarkError::Validation(_))
        ));

        let bad_tag = NewBookmark {
            title: "x".into(),
            url: "https://x.example".into(),
            tags: ids(&["ok", "not,ok"]),
            ..Default::default()
        };
        assert!(matches!(
            create_bookmark(&pool, &bad_tag).await,
            Err(MarkError::Validation(_))
        ));

        let bad_icon = NewBookmark {
            title: "x".into(),
            url: "https://x.example".into(),
            favicon_url: Some("https://x.example/icon.html".into()),
            ..Default::default()
        };
        assert!(matches!(
            create_bookmark(&pool, &bad_icon).await,
            Err(MarkError::Validation(_))
        ));
        assert!(list_bookmarks(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = test_pool().await;
        seed(&pool, "Old", 0).await;
        sqlx::query("UPDATE bookmarks SET createdAt = 1 WHERE id = 'Old'")
            .execute(&pool)
            .await
            .unwrap();
        seed(&pool, "New", 0).await;

        let list = list_bookmarks(&pool).await.unwrap();
        let order: Vec<&str> = list.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(order, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_update_replaces_tags_and_keeps_clicks() {
        let pool = test_pool().await;
        seed(&pool, "A", 4).await;

        let updated = update_bookmark(
            &pool,
            "A",
            &BookmarkUpdate {
                title: "Renamed".into(),
                url: "https://renamed.example".into(),
                tags: ids(&["one", "two"]),
                favicon_url: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.tags, vec!["one", "two"]);
        assert_eq!(updated.clicks, 4);

        let missing = update_bookmark(&pool, "nope", &BookmarkUpdate::from(&updated)).await;
        assert!(matches!(missing, Err(MarkError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_tags() {
        let pool = test_pool().await;
        create_bookmark(
            &pool,
            &NewBookmark {
                id: Some("T".into()),
                title: "Tagged".into(),
                url: "https://tagged.example".into(),
                tags: ids(&["a", "b"]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        delete_bookmark(&pool, "T").await.unwrap();

        let tag_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(tag_count, 0);
        assert!(matches!(
            delete_bookmark(&pool, "T").await,
            Err(MarkError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_record_open_redistributes_clicks() {
        let pool = test_pool().await;
        seed(&pool, "A", 2).await;
        seed(&pool, "B", 0).await;
        seed(&pool, "C", 5).await;
        seed(&pool, "D", 3).await;

        let opened = record_open(&pool, "A", &ids(&["A", "B", "C"])).await.unwrap();

        assert_eq!(opened.id, "A");
        assert_eq!(opened.clicks, 3);
        assert_eq!(clicks_of(&pool, "B").await, 0);
        assert_eq!(clicks_of(&pool, "C").await, 4);
        // not displayed, untouched
        assert_eq!(clicks_of(&pool, "D").await, 3);
    }

    #[tokio::test]
    async fn test_record_open_returns_tags() {
        let pool = test_pool().await;
        create_bookmark(
            &pool,
            &NewBookmark {
                id: Some("T".into()),
                title: "Tagged".into(),
                url: "https://tagged.example".into(),
                tags: ids(&["x", "y"]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let opened = record_open(&pool, "T", &ids(&["T"])).await.unwrap();
        assert_eq!(opened.tags, vec!["x", "y"]);
        assert_eq!(opened.clicks, 1);
    }

    #[tokio::test]
    async fn test_record_open_rejects_oversized_window() {
        let pool = test_pool().await;
        let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        for name in names {
            seed(&pool, name, 1).await;
        }

        let err = record_open(&pool, "A", &ids(&names)).await.unwrap_err();
        assert!(matches!(err, MarkError::Validation(_)));

        for name in names {
            assert_eq!(clicks_of(&pool, name).await, 1);
        }
    }

    #[tokio::test]
    async fn test_record_open_unknown_id_writes_nothing() {
        let pool = test_pool().await;
        seed(&pool, "B", 2).await;

        let err = record_open(&pool, "ghost", &ids(&["ghost", "B"])).await.unwrap_err();
        assert!(matches!(err, MarkError::NotFound(_)));
        assert_eq!(clicks_of(&pool, "B").await, 2);
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let pool = test_pool().await;
        let map = upsert_settings(
            &pool,
            &[
                (AUTO_DETECT_CLIPBOARD_LINKS.to_string(), "false".to_string()),
                ("compactMode".to_string(), "true".to_string()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(map.get(AUTO_DETECT_CLIPBOARD_LINKS), Some(&false));
        assert_eq!(map.get("compactMode"), Some(&true));
        assert_eq!(get_settings(&pool).await.unwrap(), map);
    }

    #[tokio::test]
    async fn test_export_then_import_restores_contents() {
        let dir = tempfile::tempdir().unwrap();
        let pool = file_test_pool(dir.path()).await;
        seed(&pool, "Keep", 7).await;

        let snapshot = dir.path().join("snapshot.sqlite");
        export_snapshot(&pool, &snapshot).await.unwrap();

        seed(&pool, "Later", 0).await;
        delete_bookmark(&pool, "Keep").await.unwrap();

        import_snapshot(&pool, &snapshot).await.unwrap();

        let list = list_bookmarks(&pool).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "Keep");
        assert_eq!(list[0].clicks, 7);
    }

    #[tokio::test]
    async fn test_export_without_file_is_an_error() {
        let pool = test_pool().await;
        seed(&pool, "Keep", 1).await;

        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.sqlite");

        let err = export_snapshot(&pool, &snapshot).await.unwrap_err();
        assert!(matches!(err, MarkError::Io(_)));
        assert!(!snapshot.exists());
    }

    #[tokio::test]
    async fn test_record_open_failed_demotion_writes_nothing() {
        let pool = test_pool().await;
        seed(&pool, "A", 2).await;
        seed(&pool, "B", 3).await;

        sqlx::query(
            r#"
            CREATE TRIGGER refuse_demotion
            BEFORE UPDATE OF clicks ON bookmarks
            WHEN OLD.id = 'B'
            BEGIN
                SELECT RAISE(ABORT, 'boom');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = record_open(&pool, "A", &ids(&["A", "B"])).await.unwrap_err();
        assert!(matches!(err, MarkError::Database(_)));

        // The increment on A was rolled back with the failed demotion.
        assert_eq!(clicks_of(&pool, "A").await, 2);
        assert_eq!(clicks_of(&pool, "B").await, 3);
    }

    #[tokio::test]
    async fn test_import_incompatible_file_keeps_contents() {
        let pool = test_pool().await;
        seed(&pool, "Keep", 1).await;

        let dir = tempfile::tempdir().unwrap();
        let other_path = dir.path().join("other.sqlite");
        let other = crate::db::connect(&other_path).await.unwrap();
        sqlx::query("CREATE TABLE unrelated (x INTEGER)")
            .execute(&other)
            .await
            .unwrap();
        other.close().await;

        let err = import_snapshot(&pool, &other_path).await.unwrap_err();
        assert!(matches!(err, MarkError::Validation(_)));
        assert_eq!(list_bookmarks(&pool).await.unwrap().len(), 1);
    }
}
