//! Idempotent schema for the demo `items` table.

use sqlx::PgPool;

const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        price DECIMAL(10, 2) NOT NULL,
        is_active BOOLEAN DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
    )
"#;

const CREATE_ITEMS_ACTIVE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_items_is_active ON items(is_active)";

/// Create the items table and its index when missing
///
/// Runs before every items operation, so it must stay safe to repeat.
pub async fn ensure_items_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_ITEMS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ITEMS_ACTIVE_INDEX).execute(pool).await?;
    Ok(())
}
