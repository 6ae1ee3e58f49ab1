//! PostgreSQL session store.

use async_trait::async_trait;
use log_gateway_access::Session;
use log_gateway_core::SessionId;
use sqlx::{FromRow, PgPool};

use super::store::{SessionStore, SessionStoreError};

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    data: serde_json::Value,
}

impl SessionRow {
    fn try_into_session(self) -> Result<Session, SessionStoreError> {
        serde_json::from_value(self.data).map_err(|e| SessionStoreError::Corrupt {
            session_id: self.id,
            details: e.to_string(),
        })
    }
}

fn backend(e: sqlx::Error) -> SessionStoreError {
    SessionStoreError::Backend {
        details: e.to_string(),
    }
}

/// Session store backed by the `sessions` table.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM sessions
            WHERE id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(SessionRow::try_into_session).transpose()
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let data = serde_json::to_value(session).map_err(|e| SessionStoreError::Corrupt {
            session_id: session.id().to_string(),
            details: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(session.id().to_string())
        .bind(data)
        .bind(session.created_at())
        .bind(session.expires_at())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }
}
