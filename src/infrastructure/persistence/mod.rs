pub mod sla;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .connect(database_url)
            .await?;

        // Enable foreign keys for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Create the SLA tables and indexes if they do not exist yet.
    pub async fn bootstrap_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sla_definitions (
                id TEXT PRIMARY KEY,
                workspace_id TEXT NOT NULL,
                name TEXT NOT NULL,
                applies_to TEXT NOT NULL,
                conditions TEXT NOT NULL,
                response_time INTEGER,
                resolution_time INTEGER,
                warning_threshold REAL NOT NULL DEFAULT 80,
                business_hours_only INTEGER NOT NULL DEFAULT 0,
                business_hours TEXT NOT NULL,
                escalation_rules TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sla_definitions_matching
             ON sla_definitions(workspace_id, applies_to, is_active)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sla_instances (
                id TEXT PRIMARY KEY,
                sla_definition_id TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                target_type TEXT NOT NULL,
                target_id TEXT NOT NULL,
                response_due_at TEXT,
                resolution_due_at TEXT,
                response_status TEXT NOT NULL CHECK(response_status IN ('pending', 'met', 'breached')),
                resolution_status TEXT NOT NULL CHECK(resolution_status IN ('pending', 'met', 'breached')),
                first_response_at TEXT,
                resolved_at TEXT,
                is_paused INTEGER NOT NULL DEFAULT 0,
                paused_at TEXT,
                total_paused_minutes INTEGER NOT NULL DEFAULT 0,
                current_escalation_level REAL NOT NULL DEFAULT 0,
                last_escalation_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (sla_definition_id) REFERENCES sla_definitions(id) ON DELETE RESTRICT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sla_instances_target
             ON sla_instances(target_type, target_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sla_instances_pending
             ON sla_instances(response_status, resolution_status, is_paused)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sla_instances_workspace
             ON sla_instances(workspace_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sla_events (
                id TEXT PRIMARY KEY,
                sla_instance_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                event_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (sla_instance_id) REFERENCES sla_instances(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sla_events_instance
             ON sla_events(sla_instance_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
