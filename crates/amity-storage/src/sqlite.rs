//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::{Migratable, SchemaVersion};
use crate::traits::FriendshipStore;
use amity_core::{
    EdgeScope, Friendship, FriendshipId, FriendshipQuery, FriendshipStatus, FriendableRef,
    GroupMembership, TableNames,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const FRIENDSHIP_COLUMNS: &str =
    "id, sender_type, sender_id, recipient_type, recipient_id, status, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    tables: TableNames,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>, tables: TableNames) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;
        Self::with_connection(conn, tables)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory(tables: TableNames) -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;
        Self::with_connection(conn, tables)
    }

    fn with_connection(conn: Connection, tables: TableNames) -> StorageResult<Self> {
        tables
            .validate()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
            tables,
        };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))
    }

    /// WHERE clause and its bound values for a query
    fn where_clause(&self, query: &FriendshipQuery) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        let sender = "(sender_type = ? AND sender_id = ?)";
        let recipient = "(recipient_type = ? AND recipient_id = ?)";

        match &query.scope {
            EdgeScope::Touching { subject, direction } => {
                let mut sides = Vec::new();
                if direction.includes_outgoing() {
                    sides.push(sender);
                    push_ref(&mut values, subject);
                }
                if direction.includes_incoming() {
                    sides.push(recipient);
                    push_ref(&mut values, subject);
                }
                clauses.push(format!("({})", sides.join(" OR ")));
            }
            EdgeScope::Between(a, b) => {
                clauses.push(format!(
                    "(({sender} AND {recipient}) OR ({sender} AND {recipient}))"
                ));
                push_ref(&mut values, a);
                push_ref(&mut values, b);
                push_ref(&mut values, b);
                push_ref(&mut values, a);
            }
            EdgeScope::Directed { sender: s, recipient: r } => {
                clauses.push(format!("({sender} AND {recipient})"));
                push_ref(&mut values, s);
                push_ref(&mut values, r);
            }
            EdgeScope::TouchingAny(entities) => {
                if entities.is_empty() {
                    clauses.push("0".to_string());
                } else {
                    let mut sides = Vec::new();
                    for entity in entities {
                        sides.push(format!("{sender} OR {recipient}"));
                        push_ref(&mut values, entity);
                        push_ref(&mut values, entity);
                    }
                    clauses.push(format!("({})", sides.join(" OR ")));
                }
            }
        }

        if !query.statuses.is_empty() {
            let placeholders = vec!["?"; query.statuses.len()].join(", ");
            clauses.push(format!("status IN ({})", placeholders));
            values.extend(query.statuses.iter().map(|s| Value::Integer(s.code())));
        }

        if let Some(filter) = &query.group {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM {m} gm WHERE gm.friendship_id = {f}.id \
                 AND gm.group_slug = ? AND NOT (gm.friend_type = ? AND gm.friend_id = ?))",
                m = self.tables.group_memberships,
                f = self.tables.friendships,
            ));
            values.push(Value::Text(filter.group.clone()));
            push_ref(&mut values, &filter.tagged_by);
        }

        (clauses.join(" AND "), values)
    }

    fn select(&self, query: &FriendshipQuery, limit: Option<usize>) -> StorageResult<Vec<Friendship>> {
        let (clause, mut values) = self.where_clause(query);
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY rowid",
            FRIENDSHIP_COLUMNS, self.tables.friendships, clause
        );

        let pagination = query.pagination;
        let limit = match limit {
            Some(limit) => Some((limit, 0)),
            None if !pagination.is_unbounded() => Some((pagination.per_page, pagination.offset())),
            None => None,
        };
        if let Some((limit, offset)) = limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
        }

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(values), read_row)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut friendships = Vec::new();
        for row in rows {
            let row = row.map_err(|e| StorageError::Database(e.to_string()))?;
            friendships.push(row.into_friendship()?);
        }
        Ok(friendships)
    }
}

fn push_ref(values: &mut Vec<Value>, entity: &FriendableRef) {
    values.push(Value::Text(entity.entity_type.to_string()));
    values.push(Value::Text(entity.entity_id.to_string()));
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow(format!("bad timestamp {:?}: {}", raw, e)))
}

/// Raw column values of a friendship row
struct FriendshipRow {
    id: String,
    sender_type: String,
    sender_id: String,
    recipient_type: String,
    recipient_id: String,
    status: i64,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<FriendshipRow> {
    Ok(FriendshipRow {
        id: row.get(0)?,
        sender_type: row.get(1)?,
        sender_id: row.get(2)?,
        recipient_type: row.get(3)?,
        recipient_id: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl FriendshipRow {
    fn into_friendship(self) -> StorageResult<Friendship> {
        let id = FriendshipId::from_string(&self.id)
            .map_err(|e| StorageError::CorruptRow(format!("bad id {:?}: {}", self.id, e)))?;
        let status = FriendshipStatus::from_code(self.status)
            .ok_or_else(|| StorageError::CorruptRow(format!("unknown status code {}", self.status)))?;

        Ok(Friendship {
            id,
            sender: FriendableRef::new(self.sender_type, self.sender_id),
            recipient: FriendableRef::new(self.recipient_type, self.recipient_id),
            status,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl Migratable for SqliteStorage {
    fn schema_version(&self) -> StorageResult<u32> {
        let conn = self.lock()?;
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        Ok(version as u32)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!("PRAGMA user_version = {};", version))
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        Ok(())
    }

    fn apply(&self, step: &SchemaVersion) -> StorageResult<()> {
        let conn = self.lock()?;
        let f = &self.tables.friendships;
        let m = &self.tables.group_memberships;

        let sql = match step.version {
            1 => format!(
                r#"
                CREATE TABLE IF NOT EXISTS {f} (
                    id TEXT PRIMARY KEY,
                    sender_type TEXT NOT NULL,
                    sender_id TEXT NOT NULL,
                    recipient_type TEXT NOT NULL,
                    recipient_id TEXT NOT NULL,
                    status INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_{f}_sender ON {f}(sender_type, sender_id);
                CREATE INDEX IF NOT EXISTS idx_{f}_recipient ON {f}(recipient_type, recipient_id);
                "#
            ),
            2 => format!(
                r#"
                CREATE TABLE IF NOT EXISTS {m} (
                    friendship_id TEXT NOT NULL REFERENCES {f}(id) ON DELETE CASCADE,
                    friend_type TEXT NOT NULL,
                    friend_id TEXT NOT NULL,
                    group_slug TEXT NOT NULL,
                    UNIQUE (friendship_id, friend_type, friend_id, group_slug)
                );
                "#
            ),
            other => {
                return Err(StorageError::Migration(format!(
                    "Unknown schema version {}",
                    other
                )))
            }
        };

        conn.execute_batch(&sql)
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl FriendshipStore for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Friendship operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_friendship(&self, friendship: &Friendship) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                self.tables.friendships, FRIENDSHIP_COLUMNS
            ),
            params![
                friendship.id.to_string(),
                friendship.sender.entity_type.to_string(),
                friendship.sender.entity_id.to_string(),
                friendship.recipient.entity_type.to_string(),
                friendship.recipient.entity_id.to_string(),
                friendship.status.code(),
                friendship.created_at.to_rfc3339(),
                friendship.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_friendship(&self, id: &FriendshipId) -> StorageResult<Option<Friendship>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    FRIENDSHIP_COLUMNS, self.tables.friendships
                ),
                params![id.to_string()],
                read_row,
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        row.map(FriendshipRow::into_friendship).transpose()
    }

    async fn find_friendships(&self, query: &FriendshipQuery) -> StorageResult<Vec<Friendship>> {
        self.select(query, None)
    }

    async fn first_friendship(&self, query: &FriendshipQuery) -> StorageResult<Option<Friendship>> {
        Ok(self.select(query, Some(1))?.into_iter().next())
    }

    async fn count_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize> {
        let (clause, values) = self.where_clause(query);
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {}", self.tables.friendships, clause),
                params_from_iter(values),
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(count as usize)
    }

    async fn friendship_exists(&self, query: &FriendshipQuery) -> StorageResult<bool> {
        let (clause, values) = self.where_clause(query);
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                &format!(
                    "SELECT EXISTS (SELECT 1 FROM {} WHERE {})",
                    self.tables.friendships, clause
                ),
                params_from_iter(values),
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(exists)
    }

    async fn update_status(
        &self,
        query: &FriendshipQuery,
        status: FriendshipStatus,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let (clause, filter_values) = self.where_clause(query);
        let mut values = vec![
            Value::Integer(status.code()),
            Value::Text(updated_at.to_rfc3339()),
        ];
        values.extend(filter_values);

        let conn = self.lock()?;
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET status = ?, updated_at = ? WHERE {}",
                    self.tables.friendships, clause
                ),
                params_from_iter(values),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(changed)
    }

    async fn delete_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize> {
        let (clause, values) = self.where_clause(query);
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let ids: Vec<String> = {
            let mut stmt = tx
                .prepare(&format!(
                    "SELECT id FROM {} WHERE {}",
                    self.tables.friendships, clause
                ))
                .map_err(|e| StorageError::Database(e.to_string()))?;
            let rows = stmt
                .query_map(params_from_iter(values), |row| row.get(0))
                .map_err(|e| StorageError::Database(e.to_string()))?;
            let ids = rows
                .collect::<rusqlite::Result<Vec<String>>>()
                .map_err(|e| StorageError::Database(e.to_string()))?;
            ids
        };

        let mut removed = 0;
        for id in &ids {
            tx.execute(
                &format!(
                    "DELETE FROM {} WHERE friendship_id = ?1",
                    self.tables.group_memberships
                ),
                params![id],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
            removed += tx
                .execute(
                    &format!("DELETE FROM {} WHERE id = ?1", self.tables.friendships),
                    params![id],
                )
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Group membership operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_membership(&self, membership: &GroupMembership) -> StorageResult<bool> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (friendship_id, friend_type, friend_id, group_slug) \
                     VALUES (?1, ?2, ?3, ?4)",
                    self.tables.group_memberships
                ),
                params![
                    membership.friendship_id.to_string(),
                    membership.member.entity_type.to_string(),
                    membership.member.entity_id.to_string(),
                    membership.group,
                ],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    async fn delete_memberships(
        &self,
        friendship_id: &FriendshipId,
        member: &FriendableRef,
        group: Option<&str>,
    ) -> StorageResult<usize> {
        let mut sql = format!(
            "DELETE FROM {} WHERE friendship_id = ? AND friend_type = ? AND friend_id = ?",
            self.tables.group_memberships
        );
        let mut values = vec![Value::Text(friendship_id.to_string())];
        push_ref(&mut values, member);
        if let Some(group) = group {
            sql.push_str(" AND group_slug = ?");
            values.push(Value::Text(group.to_string()));
        }

        let conn = self.lock()?;
        let removed = conn
            .execute(&sql, params_from_iter(values))
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(removed)
    }

    async fn memberships_for(&self, friendship_id: &FriendshipId) -> StorageResult<Vec<GroupMembership>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT friend_type, friend_id, group_slug FROM {} \
                 WHERE friendship_id = ?1 ORDER BY rowid",
                self.tables.group_memberships
            ))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![friendship_id.to_string()], |row| {
                let friend_type: String = row.get(0)?;
                let friend_id: String = row.get(1)?;
                let group: String = row.get(2)?;
                Ok((friend_type, friend_id, group))
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut memberships = Vec::new();
        for row in rows {
            let (friend_type, friend_id, group) =
                row.map_err(|e| StorageError::Database(e.to_string()))?;
            memberships.push(GroupMembership::new(
                *friendship_id,
                group,
                FriendableRef::new(friend_type, friend_id),
            ));
        }
        Ok(memberships)
    }
}
