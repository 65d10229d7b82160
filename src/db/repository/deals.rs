use chrono::NaiveDate;
use libsql::{params, Connection};

use crate::error::{MoguError, Result};
use crate::models::{DealEntry, DealSource};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DealRepository;

impl DealRepository {
    /// All cached deal entries, or an empty vec when nothing is cached.
    pub async fn get_cached(conn: &Connection) -> Result<Vec<DealEntry>> {
        let mut rows = conn
            .query(
                "SELECT chain_name, title, link, source, fetched_date
                 FROM deals_cache ORDER BY id ASC",
                (),
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Wipe-and-replace the whole cache in one transaction. Readers see
    /// either the previous generation or the new one, never a mix.
    pub async fn replace_all(conn: &Connection, entries: &[DealEntry]) -> Result<()> {
        let tx = conn.transaction().await?;

        tx.execute("DELETE FROM deals_cache", ()).await?;

        for entry in entries {
            tx.execute(
                r#"
                INSERT INTO deals_cache (chain_name, title, link, source, fetched_date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    entry.chain_name.clone(),
                    entry.title.clone(),
                    entry.link.clone(),
                    entry.source.to_string(),
                    entry.fetched_date.format(DATE_FORMAT).to_string(),
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    fn row_to_entry(row: &libsql::Row) -> Result<DealEntry> {
        let source_str: String = row.get(3)?;
        let source = source_str
            .parse::<DealSource>()
            .map_err(MoguError::Internal)?;

        let date_str: String = row.get(4)?;
        let fetched_date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| MoguError::Internal(format!("corrupt deal date '{date_str}': {e}")))?;

        Ok(DealEntry {
            chain_name: row.get(0)?,
            title: row.get(1)?,
            link: row.get(2)?,
            source,
            fetched_date,
        })
    }
}
