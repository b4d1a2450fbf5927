//! SQLite-backed social graph
//!
//! Implements `GraphStore` over four tables: `users`, `posts`, `posted`
//! (user to post, one author per post) and `shared_from` (reshare to
//! original). The connection sits behind a mutex; every trait call is a
//! single statement, so analyses never hold a transaction open.

use crate::StoreError;
use factline_domain::traits::{GraphStore, ServiceError};
use factline_domain::{Post, Posting, User};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const POST_COLUMNS: &str =
    "p.post_id, p.text, p.claim_text, p.platform, p.created_at, p.engagement_count, p.reach";

/// SQLite implementation of `GraphStore`
///
/// # Examples
///
/// ```no_run
/// use factline_store::SqliteGraphStore;
///
/// let graph = SqliteGraphStore::new("graph.db").unwrap();
/// ```
pub struct SqliteGraphStore {
    conn: Mutex<Connection>,
}

impl SqliteGraphStore {
    /// Open (or create) a graph database
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            post_id: row.get(0)?,
            text: row.get(1)?,
            claim_text: row.get(2)?,
            platform: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
            engagement_count: row.get::<_, i64>(5)? as u64,
            reach: row.get::<_, i64>(6)? as u64,
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let account_created: Option<i64> = row.get(4)?;
        Ok(User {
            user_id: row.get(0)?,
            username: row.get(1)?,
            followers_count: row.get::<_, i64>(2)? as u64,
            platform: row.get(3)?,
            account_created: account_created.map(|t| t as u64),
        })
    }

    /// Insert or update a user
    pub fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO users (user_id, username, followers_count, platform, account_created)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
             username = excluded.username, followers_count = excluded.followers_count,
             platform = excluded.platform, account_created = excluded.account_created",
            params![
                &user.user_id,
                &user.username,
                user.followers_count as i64,
                &user.platform,
                user.account_created.map(|t| t as i64),
            ],
        )?;
        Ok(())
    }

    /// Insert or update a post
    pub fn put_post(&self, post: &Post) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO posts (post_id, text, claim_text, platform, created_at, engagement_count, reach)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(post_id) DO UPDATE SET
             text = excluded.text, claim_text = excluded.claim_text,
             platform = excluded.platform, created_at = excluded.created_at,
             engagement_count = excluded.engagement_count, reach = excluded.reach",
            params![
                &post.post_id,
                &post.text,
                &post.claim_text,
                &post.platform,
                post.created_at as i64,
                post.engagement_count as i64,
                post.reach as i64,
            ],
        )?;
        Ok(())
    }

    /// Posts whose claim text contains `needle` (case-sensitive)
    pub fn find_posts(&self, needle: &str) -> Result<Vec<Post>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts p WHERE instr(p.claim_text, ?1) > 0
             ORDER BY p.created_at, p.post_id",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map(params![needle], Self::row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Look up a post by id
    pub fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError> {
        let conn = self.conn()?;
        let post = conn
            .query_row(
                &format!("SELECT {} FROM posts p WHERE p.post_id = ?1", POST_COLUMNS),
                params![post_id],
                Self::row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Look up a user by id
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT user_id, username, followers_count, platform, account_created
                 FROM users WHERE user_id = ?1",
                params![user_id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Author of a post, if both the edge and the user exist
    pub fn get_author(&self, post_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT u.user_id, u.username, u.followers_count, u.platform, u.account_created
                 FROM posted pd JOIN users u ON u.user_id = pd.user_id
                 WHERE pd.post_id = ?1",
                params![post_id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Direct reshares of a post, oldest first
    pub fn get_reshares(&self, post_id: &str) -> Result<Vec<Post>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shared_from s JOIN posts p ON p.post_id = s.reshare_id
             WHERE s.original_id = ?1
             ORDER BY p.created_at, p.post_id",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map(params![post_id], Self::row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// `POSTED` edges inside `[from, to]`, oldest first
    pub fn get_postings(&self, from: u64, to: u64) -> Result<Vec<Posting>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT pd.user_id, pd.post_id, p.text, pd.posted_at
             FROM posted pd JOIN posts p ON p.post_id = pd.post_id
             WHERE pd.posted_at BETWEEN ?1 AND ?2
             ORDER BY pd.posted_at, pd.post_id",
        )?;
        let postings = stmt
            .query_map(params![from as i64, to as i64], |row| {
                Ok(Posting {
                    user_id: row.get(0)?,
                    post_id: row.get(1)?,
                    text: row.get(2)?,
                    posted_at: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(postings)
    }

    /// Node counts `(users, posts)`
    pub fn counts(&self) -> Result<(usize, usize), StoreError> {
        let conn = self.conn()?;
        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        let posts: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?;
        Ok((users as usize, posts as usize))
    }
}

impl GraphStore for SqliteGraphStore {
    fn upsert_user(&self, user: &User) -> Result<(), ServiceError> {
        self.put_user(user).map_err(ServiceError::from)
    }

    fn upsert_post(&self, post: &Post) -> Result<(), ServiceError> {
        self.put_post(post).map_err(ServiceError::from)
    }

    fn link_posted(&self, user_id: &str, post_id: &str, posted_at: u64) -> Result<(), ServiceError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO posted (post_id, user_id, posted_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(post_id) DO UPDATE SET
             user_id = excluded.user_id, posted_at = excluded.posted_at",
            params![post_id, user_id, posted_at as i64],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }

    fn link_shared_from(&self, reshare_id: &str, original_id: &str) -> Result<(), ServiceError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO shared_from (reshare_id, original_id) VALUES (?1, ?2)",
            params![reshare_id, original_id],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }

    fn posts_containing(&self, needle: &str) -> Result<Vec<Post>, ServiceError> {
        self.find_posts(needle).map_err(ServiceError::from)
    }

    fn post(&self, post_id: &str) -> Result<Option<Post>, ServiceError> {
        self.get_post(post_id).map_err(ServiceError::from)
    }

    fn author_of(&self, post_id: &str) -> Result<Option<User>, ServiceError> {
        self.get_author(post_id).map_err(ServiceError::from)
    }

    fn reshares_of(&self, post_id: &str) -> Result<Vec<Post>, ServiceError> {
        self.get_reshares(post_id).map_err(ServiceError::from)
    }

    fn postings_between(&self, from: u64, to: u64) -> Result<Vec<Posting>, ServiceError> {
        self.get_postings(from, to).map_err(ServiceError::from)
    }
}
