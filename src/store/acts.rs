use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    Created,
    Updated,
    Unchanged,
}

impl UpsertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub act_id: i64,
    pub version: i64,
    pub status: UpsertStatus,
    pub articles_written: usize,
}

/// How an administrator names an act for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActSelector {
    Identity {
        act_type: String,
        act_number: String,
        year: Option<i32>,
    },
    SourceUrl(String),
}

#[derive(Debug)]
struct ExistingAct {
    act_id: i64,
    content_hash: String,
    version: i64,
}

impl ArticleStore {
    /// Imports a parsed act. Matches an existing row by (type, number, year)
    /// or by source URL. Same content hash leaves the act untouched; a new
    /// hash bumps the version and replaces articles and anomalies wholesale.
    pub fn upsert_act(&mut self, result: &ParseResult) -> Result<UpsertOutcome> {
        let now = now_utc_string();
        let tx = self
            .connection
            .transaction()
            .context("failed to begin upsert transaction")?;

        let existing = find_existing_act(&tx, &result.metadata, &result.source_url)?;

        let outcome = match existing {
            None => {
                let act_id = insert_act(&tx, result, &now)?;
                let articles_written = replace_children(&tx, act_id, result)?;
                UpsertOutcome {
                    act_id,
                    version: 1,
                    status: UpsertStatus::Created,
                    articles_written,
                }
            }
            Some(existing) if existing.content_hash == result.content_hash => {
                tx.execute(
                    "UPDATE acts SET last_scraped_at = ?1 WHERE act_id = ?2",
                    params![now, existing.act_id],
                )
                .context("failed to touch unchanged act")?;
                UpsertOutcome {
                    act_id: existing.act_id,
                    version: existing.version,
                    status: UpsertStatus::Unchanged,
                    articles_written: 0,
                }
            }
            Some(existing) => {
                let version = existing.version + 1;
                update_act(&tx, existing.act_id, version, result, &now)?;
                let articles_written = replace_children(&tx, existing.act_id, result)?;
                UpsertOutcome {
                    act_id: existing.act_id,
                    version,
                    status: UpsertStatus::Updated,
                    articles_written,
                }
            }
        };

        tx.commit().context("failed to commit act upsert")?;

        debug!(
            act = %result.metadata.display_key(),
            act_id = outcome.act_id,
            version = outcome.version,
            status = outcome.status.as_str(),
            "act upserted"
        );

        Ok(outcome)
    }

    /// Removes matching acts; articles and anomalies go with them through
    /// the foreign-key cascade. Returns the number of acts deleted.
    pub fn delete_act(&mut self, selector: &ActSelector) -> Result<usize> {
        let deleted = match selector {
            ActSelector::Identity {
                act_type,
                act_number,
                year,
            } => self.connection.execute(
                "DELETE FROM acts WHERE act_type = ?1 AND act_number = ?2 AND year IS ?3",
                params![act_type, act_number, year],
            ),
            ActSelector::SourceUrl(source_url) => self
                .connection
                .execute("DELETE FROM acts WHERE source_url = ?1", params![source_url]),
        }
        .context("failed to delete act")?;

        info!(deleted, "act deletion completed");
        Ok(deleted)
    }

    pub fn record_failure(&self, source_url: &str, reason: &str, run_id: Option<&str>) -> Result<()> {
        self.connection
            .execute(
                "INSERT INTO scrape_failures(source_url, reason, run_id, failed_at)
                 VALUES(?1, ?2, ?3, ?4)",
                params![source_url, reason, run_id, now_utc_string()],
            )
            .with_context(|| format!("failed to record scrape failure for {source_url}"))?;
        Ok(())
    }
}

fn find_existing_act(
    tx: &Transaction<'_>,
    metadata: &ActMetadata,
    source_url: &str,
) -> Result<Option<ExistingAct>> {
    tx.query_row(
        "SELECT act_id, content_hash, version FROM acts
         WHERE (act_type = ?1 AND act_number = ?2 AND year IS ?3) OR source_url = ?4
         ORDER BY (act_type = ?1 AND act_number = ?2 AND year IS ?3) DESC, act_id
         LIMIT 1",
        params![
            metadata.act_type,
            metadata.act_number,
            metadata.year,
            source_url
        ],
        |row| {
            Ok(ExistingAct {
                act_id: row.get(0)?,
                content_hash: row.get(1)?,
                version: row.get(2)?,
            })
        },
    )
    .optional()
    .context("failed to look up existing act")
}

fn insert_act(tx: &Transaction<'_>, result: &ParseResult, now: &str) -> Result<i64> {
    let metadata = &result.metadata;
    tx.execute(
        "INSERT INTO acts(
           act_type, act_number, year, act_date, title, issuing_authority,
           gazette_number, gazette_date, source_url, content_hash, version,
           strategy, confidence, needs_review, created_at, updated_at, last_scraped_at
         ) VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12, ?13, ?14, ?14, ?14)",
        params![
            metadata.act_type,
            metadata.act_number,
            metadata.year,
            metadata.act_date,
            metadata.title,
            metadata.issuing_authority,
            metadata.gazette_number,
            metadata.gazette_date,
            result.source_url,
            result.content_hash,
            result.quality.strategy.map(|strategy| strategy.as_str()),
            result.quality.confidence,
            result.quality.needs_review,
            now,
        ],
    )
    .with_context(|| format!("failed to insert act {}", metadata.display_key()))?;

    Ok(tx.last_insert_rowid())
}

fn update_act(
    tx: &Transaction<'_>,
    act_id: i64,
    version: i64,
    result: &ParseResult,
    now: &str,
) -> Result<()> {
    let metadata = &result.metadata;
    tx.execute(
        "UPDATE acts SET
           act_type = ?1, act_number = ?2, year = ?3, act_date = ?4, title = ?5,
           issuing_authority = ?6, gazette_number = ?7, gazette_date = ?8,
           source_url = ?9, content_hash = ?10, version = ?11, strategy = ?12,
           confidence = ?13, needs_review = ?14, updated_at = ?15, last_scraped_at = ?15
         WHERE act_id = ?16",
        params![
            metadata.act_type,
            metadata.act_number,
            metadata.year,
            metadata.act_date,
            metadata.title,
            metadata.issuing_authority,
            metadata.gazette_number,
            metadata.gazette_date,
            result.source_url,
            result.content_hash,
            version,
            result.quality.strategy.map(|strategy| strategy.as_str()),
            result.quality.confidence,
            result.quality.needs_review,
            now,
            act_id,
        ],
    )
    .with_context(|| format!("failed to update act {}", metadata.display_key()))?;

    Ok(())
}

fn replace_children(tx: &Transaction<'_>, act_id: i64, result: &ParseResult) -> Result<usize> {
    tx.execute("DELETE FROM articles WHERE act_id = ?1", params![act_id])
        .context("failed to clear previous articles")?;
    tx.execute("DELETE FROM act_anomalies WHERE act_id = ?1", params![act_id])
        .context("failed to clear previous anomalies")?;

    let mut article_statement = tx
        .prepare(
            "INSERT INTO articles(
               act_id, ordinal, number, label, text,
               title_nr, title_denumire, chapter_nr, chapter_denumire,
               section_nr, section_denumire, subsection_nr, subsection_denumire
             ) VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .context("failed to prepare article insert")?;

    for article in &result.articles {
        insert_article(&mut article_statement, act_id, article)?;
    }

    let mut anomaly_statement = tx
        .prepare(
            "INSERT INTO act_anomalies(act_id, kind, severity, message, article_ordinal)
             VALUES(?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare anomaly insert")?;

    for anomaly in &result.quality.anomalies {
        anomaly_statement
            .execute(params![
                act_id,
                anomaly.kind.as_str(),
                anomaly.severity.as_str(),
                anomaly.message,
                anomaly.article_ordinal,
            ])
            .context("failed to insert anomaly")?;
    }

    Ok(result.articles.len())
}

fn insert_article(statement: &mut Statement<'_>, act_id: i64, article: &Article) -> Result<()> {
    let hierarchy = &article.hierarchy;

    statement
        .execute(params![
            act_id,
            article.ordinal,
            article.number,
            article.label,
            article.text,
            level_nr(&hierarchy.title),
            level_name(&hierarchy.title),
            level_nr(&hierarchy.chapter),
            level_name(&hierarchy.chapter),
            level_nr(&hierarchy.section),
            level_name(&hierarchy.section),
            level_nr(&hierarchy.subsection),
            level_name(&hierarchy.subsection),
        ])
        .with_context(|| format!("failed to insert article ordinal {}", article.ordinal))?;

    Ok(())
}

fn level_nr(level: &Option<HierarchyLevel>) -> Option<u32> {
    level.as_ref().and_then(|node| node.nr)
}

fn level_name(level: &Option<HierarchyLevel>) -> Option<&str> {
    level.as_ref().map(|node| node.denumire.as_str())
}
