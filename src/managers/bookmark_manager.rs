//! Bookmark Manager for Linkshelf.
//!
//! Implements `BookmarkManagerTrait`: CRUD, filtered listing, duplicate
//! lookups, tag aggregation and visit tracking, backed by SQLite via `rusqlite`.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::types::bookmark::{
    Bookmark, BookmarkDraft, BookmarkFilter, BookmarkPatch, SortOrder, TagCount,
};
use crate::types::errors::BookmarkError;

const BOOKMARK_COLUMNS: &str = "b.id, b.title, b.url, b.description, b.favicon, \
     b.view_count, b.last_visited, b.date_added, b.archived, b.pinned";

/// Trait defining bookmark store operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(&mut self, draft: &BookmarkDraft) -> Result<Bookmark, BookmarkError>;
    fn get_bookmark(&self, id: &str) -> Result<Option<Bookmark>, BookmarkError>;
    /// Exact match on the stored url.
    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>, BookmarkError>;
    /// Loose match: exact on any variant first, then substring containment.
    fn find_matching(&self, variants: &[String]) -> Result<Option<Bookmark>, BookmarkError>;
    fn list_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, BookmarkError>;
    fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<Bookmark, BookmarkError>;
    fn set_archived(&mut self, id: &str, archived: bool) -> Result<Bookmark, BookmarkError>;
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    /// Returns whether a row was deleted. Deleting a missing id is not an error.
    fn remove_bookmark(&mut self, id: &str) -> Result<bool, BookmarkError>;
    fn tag_counts(&self) -> Result<Vec<TagCount>, BookmarkError>;
    /// Atomically bumps `view_count` and stamps `last_visited`, returning the updated record.
    fn record_visit(&mut self, id: &str) -> Result<Bookmark, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Current time in unix milliseconds.
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn millis_to_datetime(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
    }

    /// Reads a bookmark row (without tags) into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let last_visited: Option<i64> = row.get(6)?;
        let date_added: i64 = row.get(7)?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
            tags: Vec::new(),
            favicon: row.get(4)?,
            view_count: row.get(5)?,
            last_visited: last_visited
                .map(|ms| Self::millis_to_datetime(6, ms))
                .transpose()?,
            date_added: Self::millis_to_datetime(7, date_added)?,
            archived: row.get(8)?,
            pinned: row.get(9)?,
        })
    }

    fn load_tags(&self, bookmark_id: &str) -> Result<Vec<String>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM bookmark_tags WHERE bookmark_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map(params![bookmark_id], |row| row.get(0))?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    fn write_tags(&self, bookmark_id: &str, tags: &[String]) -> Result<(), BookmarkError> {
        self.conn.execute(
            "DELETE FROM bookmark_tags WHERE bookmark_id = ?1",
            params![bookmark_id],
        )?;
        let mut stmt = self.conn.prepare(
            "INSERT INTO bookmark_tags (bookmark_id, position, tag) VALUES (?1, ?2, ?3)",
        )?;
        for (position, tag) in tags.iter().enumerate() {
            stmt.execute(params![bookmark_id, position as i64, tag])?;
        }
        Ok(())
    }

    fn with_tags(&self, mut bookmark: Bookmark) -> Result<Bookmark, BookmarkError> {
        bookmark.tags = self.load_tags(&bookmark.id)?;
        Ok(bookmark)
    }

    /// Runs a single-row bookmark query and attaches tags.
    fn query_one(&self, sql: &str, args: &[Value]) -> Result<Option<Bookmark>, BookmarkError> {
        let found = self
            .conn
            .query_row(sql, params_from_iter(args.iter()), Self::row_to_bookmark)
            .optional()?;
        found.map(|b| self.with_tags(b)).transpose()
    }

    fn require(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        self.get_bookmark(id)?
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    fn set_flag(&mut self, id: &str, column: &str, value: bool) -> Result<Bookmark, BookmarkError> {
        let sql = format!("UPDATE bookmarks SET {column} = ?1 WHERE id = ?2");
        let affected = self.conn.execute(&sql, params![value, id])?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        self.require(id)
    }

    fn placeholders(count: usize) -> String {
        vec!["?"; count].join(", ")
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Inserts a bookmark and its tags in one transaction.
    fn add_bookmark(&mut self, draft: &BookmarkDraft) -> Result<Bookmark, BookmarkError> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO bookmarks (id, title, url, description, favicon, view_count, last_visited, date_added, archived, pinned) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6, ?7, ?8)",
            params![
                id,
                draft.title,
                draft.url,
                draft.description,
                draft.favicon,
                now,
                draft.archived,
                draft.pinned
            ],
        )?;
        self.write_tags(&id, &draft.tags)?;
        tx.commit()?;

        debug!(%id, url = %draft.url, "inserted bookmark");
        self.require(&id)
    }

    fn get_bookmark(&self, id: &str) -> Result<Option<Bookmark>, BookmarkError> {
        let sql = format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks b WHERE b.id = ?");
        self.query_one(&sql, &[Value::from(id.to_string())])
    }

    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>, BookmarkError> {
        let sql = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b WHERE b.url = ? ORDER BY b.rowid LIMIT 1"
        );
        self.query_one(&sql, &[Value::from(url.to_string())])
    }

    fn find_matching(&self, variants: &[String]) -> Result<Option<Bookmark>, BookmarkError> {
        if variants.is_empty() {
            return Ok(None);
        }
        let args: Vec<Value> = variants.iter().cloned().map(Value::from).collect();

        let exact = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b WHERE b.url IN ({}) ORDER BY b.rowid LIMIT 1",
            Self::placeholders(variants.len())
        );
        if let Some(found) = self.query_one(&exact, &args)? {
            return Ok(Some(found));
        }

        let contains = variants
            .iter()
            .map(|_| "instr(b.url, ?) > 0")
            .collect::<Vec<_>>()
            .join(" OR ");
        let loose = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b WHERE {contains} ORDER BY b.rowid LIMIT 1"
        );
        self.query_one(&loose, &args)
    }

    fn list_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut sql = format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks b WHERE 1 = 1");
        let mut args: Vec<Value> = Vec::new();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(" AND instr(fold_case(b.title), fold_case(?)) > 0");
            args.push(Value::from(search.to_string()));
        }

        if let Some(archived) = filter.archived {
            sql.push_str(" AND b.archived = ?");
            args.push(Value::from(archived));
        }

        let mut required: Vec<&String> = Vec::new();
        for tag in &filter.tags {
            if !required.contains(&tag) {
                required.push(tag);
            }
        }
        if !required.is_empty() {
            sql.push_str(&format!(
                " AND (SELECT COUNT(DISTINCT t.tag) FROM bookmark_tags t \
                 WHERE t.bookmark_id = b.id AND t.tag IN ({})) = ?",
                Self::placeholders(required.len())
            ));
            args.extend(required.iter().map(|t| Value::from((*t).clone())));
            args.push(Value::from(required.len() as i64));
        }

        sql.push_str(match filter.sort {
            SortOrder::RecentlyAdded => " ORDER BY b.date_added DESC, b.rowid DESC",
            SortOrder::MostVisited => " ORDER BY b.view_count DESC, b.date_added DESC, b.rowid DESC",
            // NULL sorts lowest, so never-visited bookmarks land at the end
            SortOrder::RecentlyVisited => {
                " ORDER BY b.last_visited DESC, b.date_added DESC, b.rowid DESC"
            }
        });

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(self.with_tags(row?)?);
        }
        Ok(results)
    }

    fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<Bookmark, BookmarkError> {
        self.set_flag(id, "pinned", pinned)
    }

    fn set_archived(&mut self, id: &str, archived: bool) -> Result<Bookmark, BookmarkError> {
        self.set_flag(id, "archived", archived)
    }

    /// Applies every present field of the patch. Tags are replaced wholesale.
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        if patch.is_empty() {
            return self.require(id);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        let text_fields = [
            ("title = ?", &patch.title),
            ("url = ?", &patch.url),
            ("description = ?", &patch.description),
            ("favicon = ?", &patch.favicon),
        ];
        for (assignment, value) in text_fields {
            if let Some(value) = value {
                assignments.push(assignment);
                args.push(Value::from(value.clone()));
            }
        }
        for (assignment, value) in [("archived = ?", patch.archived), ("pinned = ?", patch.pinned)] {
            if let Some(value) = value {
                assignments.push(assignment);
                args.push(Value::from(value));
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        if assignments.is_empty() {
            // Tags-only patch, still verify the bookmark exists
            self.require(id)?;
        } else {
            let sql = format!("UPDATE bookmarks SET {} WHERE id = ?", assignments.join(", "));
            args.push(Value::from(id.to_string()));
            let affected = tx.execute(&sql, params_from_iter(args.iter()))?;
            if affected == 0 {
                return Err(BookmarkError::NotFound(id.to_string()));
            }
        }
        if let Some(tags) = &patch.tags {
            self.write_tags(id, tags)?;
        }
        tx.commit()?;

        self.require(id)
    }

    fn remove_bookmark(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Counts every (bookmark, tag) occurrence, most used first, ties by name.
    fn tag_counts(&self) -> Result<Vec<TagCount>, BookmarkError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag, COUNT(*) AS count FROM bookmark_tags t \
             JOIN bookmarks b ON b.id = t.bookmark_id \
             GROUP BY t.tag ORDER BY count DESC, t.tag ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TagCount {
                tag: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn record_visit(&mut self, id: &str) -> Result<Bookmark, BookmarkError> {
        let sql = "UPDATE bookmarks SET view_count = view_count + 1, last_visited = ?1 \
                   WHERE id = ?2 \
                   RETURNING id, title, url, description, favicon, \
                   view_count, last_visited, date_added, archived, pinned";
        let updated = self
            .conn
            .query_row(sql, params![Self::now(), id], Self::row_to_bookmark)
            .optional()?;
        match updated {
            Some(bookmark) => self.with_tags(bookmark),
            None => Err(BookmarkError::NotFound(id.to_string())),
        }
    }
}
