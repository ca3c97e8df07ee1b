use super::*;

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    Ok(())
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS acts (
          act_id INTEGER PRIMARY KEY AUTOINCREMENT,
          act_type TEXT NOT NULL,
          act_number TEXT NOT NULL,
          year INTEGER,
          act_date TEXT,
          title TEXT NOT NULL,
          issuing_authority TEXT,
          gazette_number TEXT,
          gazette_date TEXT,
          source_url TEXT NOT NULL,
          content_hash TEXT NOT NULL,
          version INTEGER NOT NULL DEFAULT 1,
          strategy TEXT,
          confidence REAL NOT NULL,
          needs_review INTEGER NOT NULL DEFAULT 0,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          last_scraped_at TEXT NOT NULL,
          UNIQUE(act_type, act_number, year)
        );

        CREATE TABLE IF NOT EXISTS articles (
          article_id INTEGER PRIMARY KEY AUTOINCREMENT,
          act_id INTEGER NOT NULL,
          ordinal INTEGER NOT NULL,
          number TEXT NOT NULL,
          label TEXT NOT NULL,
          text TEXT NOT NULL,
          title_nr INTEGER,
          title_denumire TEXT,
          chapter_nr INTEGER,
          chapter_denumire TEXT,
          section_nr INTEGER,
          section_denumire TEXT,
          subsection_nr INTEGER,
          subsection_denumire TEXT,
          UNIQUE(act_id, ordinal),
          FOREIGN KEY(act_id) REFERENCES acts(act_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS act_anomalies (
          anomaly_id INTEGER PRIMARY KEY AUTOINCREMENT,
          act_id INTEGER NOT NULL,
          kind TEXT NOT NULL,
          severity TEXT NOT NULL,
          message TEXT NOT NULL,
          article_ordinal INTEGER,
          FOREIGN KEY(act_id) REFERENCES acts(act_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS scrape_failures (
          failure_id INTEGER PRIMARY KEY AUTOINCREMENT,
          source_url TEXT NOT NULL,
          reason TEXT NOT NULL,
          run_id TEXT,
          failed_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_acts_source_url ON acts(source_url);
        CREATE INDEX IF NOT EXISTS idx_acts_needs_review ON acts(needs_review);
        CREATE INDEX IF NOT EXISTS idx_articles_act_ordinal ON articles(act_id, ordinal);
        CREATE INDEX IF NOT EXISTS idx_anomalies_act ON act_anomalies(act_id);
        CREATE INDEX IF NOT EXISTS idx_failures_source_url ON scrape_failures(source_url);
        ",
        )
        .context("failed to initialize store schema")?;

    connection
        .execute(
            "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![DB_SCHEMA_VERSION],
        )
        .context("failed to record schema version")?;

    Ok(())
}
