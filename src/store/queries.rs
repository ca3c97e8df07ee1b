use super::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry {
    pub act_id: i64,
    pub act_type: String,
    pub act_number: String,
    pub year: Option<i32>,
    pub title: String,
    pub source_url: String,
    pub version: i64,
    pub strategy: Option<String>,
    pub confidence: f64,
    pub articles: i64,
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub acts: i64,
    pub articles: i64,
    pub acts_needing_review: i64,
    pub scrape_failures: i64,
}

impl ArticleStore {
    /// Acts flagged for manual review, lowest confidence first.
    pub fn acts_needing_review(&self, limit: usize) -> Result<Vec<ReviewEntry>> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT a.act_id, a.act_type, a.act_number, a.year, a.title, a.source_url,
                        a.version, a.strategy, a.confidence,
                        (SELECT COUNT(*) FROM articles r WHERE r.act_id = a.act_id)
                 FROM acts a
                 WHERE a.needs_review = 1
                 ORDER BY a.confidence ASC, a.act_id ASC
                 LIMIT ?1",
            )
            .context("failed to prepare review query")?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut entries = statement
            .query_map(params![limit], |row| {
                Ok(ReviewEntry {
                    act_id: row.get(0)?,
                    act_type: row.get(1)?,
                    act_number: row.get(2)?,
                    year: row.get(3)?,
                    title: row.get(4)?,
                    source_url: row.get(5)?,
                    version: row.get(6)?,
                    strategy: row.get(7)?,
                    confidence: row.get(8)?,
                    articles: row.get(9)?,
                    anomalies: Vec::new(),
                })
            })
            .context("failed to query acts needing review")?
            .collect::<rusqlite::Result<Vec<ReviewEntry>>>()
            .context("failed to read review rows")?;

        for entry in &mut entries {
            entry.anomalies = self.anomaly_lines(entry.act_id)?;
        }

        Ok(entries)
    }

    fn anomaly_lines(&self, act_id: i64) -> Result<Vec<String>> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT severity, kind, message FROM act_anomalies
                 WHERE act_id = ?1
                 ORDER BY anomaly_id",
            )
            .context("failed to prepare anomaly query")?;

        let lines = statement
            .query_map(params![act_id], |row| {
                let severity: String = row.get(0)?;
                let kind: String = row.get(1)?;
                let message: String = row.get(2)?;
                Ok(format!("[{severity}] {kind}: {message}"))
            })
            .context("failed to query anomalies")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("failed to read anomaly rows")?;

        Ok(lines)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            acts: query_count(&self.connection, "SELECT COUNT(*) FROM acts")?,
            articles: query_count(&self.connection, "SELECT COUNT(*) FROM articles")?,
            acts_needing_review: query_count(
                &self.connection,
                "SELECT COUNT(*) FROM acts WHERE needs_review = 1",
            )?,
            scrape_failures: query_count(&self.connection, "SELECT COUNT(*) FROM scrape_failures")?,
        })
    }

    #[cfg(test)]
    pub(crate) fn article_texts(&self, act_id: i64) -> Result<Vec<(u32, String)>> {
        let mut statement = self
            .connection
            .prepare("SELECT ordinal, text FROM articles WHERE act_id = ?1 ORDER BY ordinal")?;
        let rows = statement
            .query_map(params![act_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(u32, String)>>>()?;
        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn row_count(&self, sql: &str) -> Result<i64> {
        query_count(&self.connection, sql)
    }
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection
        .query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("failed to run count query: {sql}"))?;
    Ok(count)
}
