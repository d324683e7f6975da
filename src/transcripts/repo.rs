use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Transcript record in the database. Serialized as-is into responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transcript {
    pub id: i64,
    pub text: String,
    pub language: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    text: &str,
    language: Option<&str>,
) -> anyhow::Result<Transcript> {
    let row = sqlx::query_as::<_, Transcript>(
        r#"
        INSERT INTO transcripts (text, language)
        VALUES ($1, $2)
        RETURNING id, text, language, created_at
        "#,
    )
    .bind(text)
    .bind(language)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_latest(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Transcript>> {
    let rows = sqlx::query_as::<_, Transcript>(
        r#"
        SELECT id, text, language, created_at
        FROM transcripts
        ORDER BY id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Transcript>> {
    let row = sqlx::query_as::<_, Transcript>(
        r#"
        SELECT id, text, language, created_at
        FROM transcripts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
