use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeDelta};

use crate::config::DealsConfig;
use crate::db::repository::DealRepository;
use crate::db::Database;
use crate::error::Result;
use crate::models::{DealEntry, DealSource};

use super::provider::TextSearch;

/// Decides between serving the cached deal listings and refreshing them
/// from the text-search provider. Provider failures degrade to synthesized
/// fallback entries; they are never surfaced to the caller.
pub struct DealService {
    db: Database,
    provider: Arc<dyn TextSearch>,
    chains: Vec<String>,
    cache_ttl_days: i64,
    results_per_chain: usize,
}

impl DealService {
    pub fn new(db: Database, provider: Arc<dyn TextSearch>, config: &DealsConfig) -> Self {
        Self {
            db,
            provider,
            chains: config.chains.clone(),
            cache_ttl_days: config.cache_ttl_days,
            results_per_chain: config.results_per_chain,
        }
    }

    /// Serve the cache while it is fresh, otherwise refresh it and replace
    /// the cache wholesale. Returns the entries together with their fetch
    /// date. Every configured chain is represented in the result regardless
    /// of provider availability.
    pub async fn fetch_latest_deals(
        &self,
        force_refresh: bool,
    ) -> Result<(Vec<DealEntry>, NaiveDate)> {
        let conn = self.db.connect()?;
        let today = Local::now().date_naive();

        if !force_refresh {
            let cached = DealRepository::get_cached(&conn).await?;
            if let Some(first) = cached.first() {
                let fetched = first.fetched_date;
                if today - fetched < TimeDelta::days(self.cache_ttl_days) {
                    tracing::debug!(%fetched, "serving deals from cache");
                    return Ok((cached, fetched));
                }
                tracing::info!(%fetched, "deals cache is stale, refreshing");
            }
        }

        let entries = self.fetch_from_provider(today).await;
        DealRepository::replace_all(&conn, &entries).await?;

        Ok((entries, today))
    }

    async fn fetch_from_provider(&self, today: NaiveDate) -> Vec<DealEntry> {
        let mut entries = Vec::new();

        if !self.provider.is_available() {
            tracing::warn!("search provider unavailable, synthesizing entries for every chain");
            for chain in &self.chains {
                entries.push(fallback_entry(chain, today, DealSource::FallbackCritical));
            }
            return entries;
        }

        let month = today.format("%B").to_string();

        for chain in &self.chains {
            let query = format!("{chain} deals {month}");
            match self.provider.search(&query, self.results_per_chain).await {
                Ok(hits) if !hits.is_empty() => {
                    for hit in hits {
                        entries.push(DealEntry {
                            chain_name: chain.clone(),
                            title: hit.title,
                            link: hit.link,
                            source: DealSource::SearchProvider,
                            fetched_date: today,
                        });
                    }
                }
                Ok(_) => {
                    tracing::warn!(%chain, "provider returned no results, adding fallback entry");
                    entries.push(fallback_entry(chain, today, DealSource::Fallback));
                }
                Err(e) => {
                    tracing::warn!(%chain, error = %e, "provider call failed, adding fallback entry");
                    entries.push(fallback_entry(chain, today, DealSource::FallbackError));
                }
            }
        }

        // Every configured chain must come back with at least one entry.
        for chain in &self.chains {
            if !entries.iter().any(|e| &e.chain_name == chain) {
                entries.push(fallback_entry(chain, today, DealSource::FallbackCritical));
            }
        }

        entries
    }
}

/// Synthesized stand-in for a missing provider result: a generic web-search
/// link built from the chain name.
fn fallback_entry(chain: &str, date: NaiveDate, source: DealSource) -> DealEntry {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &format!("{chain} deals"))
        .finish();

    DealEntry {
        chain_name: chain.to_string(),
        title: format!("{chain} latest deals (tap to search)"),
        link: format!("https://duckduckgo.com/?{query}"),
        source,
        fetched_date: date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::deals::provider::SearchHit;
    use crate::error::MoguError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum StubMode {
        Hits(Vec<SearchHit>),
        Empty,
        Fail,
        Unavailable,
    }

    struct StubSearch {
        mode: StubMode,
        calls: AtomicUsize,
    }

    impl StubSearch {
        fn new(mode: StubMode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextSearch for StubSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.mode {
                StubMode::Hits(hits) => Ok(hits.iter().take(max_results).cloned().collect()),
                StubMode::Empty => Ok(Vec::new()),
                StubMode::Fail => Err(MoguError::Provider("boom".to_string())),
                StubMode::Unavailable => Err(MoguError::Provider("unavailable".to_string())),
            }
        }

        fn is_available(&self) -> bool {
            !matches!(self.mode, StubMode::Unavailable)
        }
    }

    fn deals_config(chains: &[&str]) -> DealsConfig {
        DealsConfig {
            chains: chains.iter().map(|s| s.to_string()).collect(),
            cache_ttl_days: 7,
            results_per_chain: 2,
            search_base_url: None,
            search_timeout_secs: 5,
        }
    }

    async fn memory_db() -> Database {
        Database::new(&DatabaseConfig {
            url: ":memory:".to_string(),
        })
        .await
        .unwrap()
    }

    fn hit(title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_stores_provider_hits() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Hits(vec![hit("two for one"), hit("free drink")]));
        let service = DealService::new(db, stub.clone(), &deals_config(&["KFC", "Sukiya"]));

        let (entries, date) = service.fetch_latest_deals(true).await.unwrap();

        assert_eq!(date, Local::now().date_naive());
        assert_eq!(entries.len(), 4);
        assert!(entries
            .iter()
            .all(|e| e.source == DealSource::SearchProvider));
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_provider() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Hits(vec![hit("deal")]));
        let service = DealService::new(db, stub.clone(), &deals_config(&["KFC"]));

        let (first_entries, first_date) = service.fetch_latest_deals(true).await.unwrap();
        assert_eq!(stub.call_count(), 1);

        let (second_entries, second_date) = service.fetch_latest_deals(false).await.unwrap();
        assert_eq!(stub.call_count(), 1, "fresh cache must not hit the provider");
        assert_eq!(second_entries, first_entries);
        assert_eq!(second_date, first_date);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_fresh_cache() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Hits(vec![hit("deal")]));
        let service = DealService::new(db, stub.clone(), &deals_config(&["KFC"]));

        service.fetch_latest_deals(true).await.unwrap();
        service.fetch_latest_deals(true).await.unwrap();
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refresh() {
        let db = memory_db().await;
        let stale_date = Local::now().date_naive() - TimeDelta::days(8);
        let conn = db.connect().unwrap();
        DealRepository::replace_all(
            &conn,
            &[DealEntry {
                chain_name: "KFC".to_string(),
                title: "old deal".to_string(),
                link: "https://example.com/old".to_string(),
                source: DealSource::SearchProvider,
                fetched_date: stale_date,
            }],
        )
        .await
        .unwrap();

        let stub = StubSearch::new(StubMode::Hits(vec![hit("new deal")]));
        let service = DealService::new(db, stub.clone(), &deals_config(&["KFC"]));

        let (entries, date) = service.fetch_latest_deals(false).await.unwrap();
        assert_eq!(stub.call_count(), 1);
        assert_eq!(date, Local::now().date_naive());
        assert_eq!(entries[0].title, "new deal");
    }

    #[tokio::test]
    async fn test_empty_results_synthesize_fallback_per_chain() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Empty);
        let chains = ["McDonald's", "KFC", "Starbucks"];
        let service = DealService::new(db, stub, &deals_config(&chains));

        let (entries, _) = service.fetch_latest_deals(true).await.unwrap();

        assert_eq!(entries.len(), chains.len());
        for chain in chains {
            let entry = entries
                .iter()
                .find(|e| e.chain_name == chain)
                .expect("chain must be represented");
            assert_eq!(entry.source, DealSource::Fallback);
            assert!(entry.link.contains("duckduckgo.com"));
        }
    }

    #[tokio::test]
    async fn test_per_chain_errors_synthesize_fallback_error() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Fail);
        let chains = ["KFC", "Sukiya"];
        let service = DealService::new(db, stub, &deals_config(&chains));

        let (entries, _) = service.fetch_latest_deals(true).await.unwrap();

        assert_eq!(entries.len(), chains.len());
        assert!(entries.iter().all(|e| e.source == DealSource::FallbackError));
    }

    #[tokio::test]
    async fn test_unavailable_provider_synthesizes_critical_fallback() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Unavailable);
        let chains = ["McDonald's", "KFC", "Starbucks", "Pizza Hut"];
        let service = DealService::new(db.clone(), stub.clone(), &deals_config(&chains));

        let (entries, _) = service.fetch_latest_deals(true).await.unwrap();

        assert_eq!(stub.call_count(), 0);
        assert_eq!(entries.len(), chains.len());
        assert!(entries
            .iter()
            .all(|e| e.source == DealSource::FallbackCritical));

        // The fallback generation also lands in the cache.
        let conn = db.connect().unwrap();
        let cached = DealRepository::get_cached(&conn).await.unwrap();
        assert_eq!(cached.len(), chains.len());
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_generation() {
        let db = memory_db().await;
        let stub = StubSearch::new(StubMode::Hits(vec![hit("deal")]));
        let service = DealService::new(db.clone(), stub, &deals_config(&["KFC"]));

        service.fetch_latest_deals(true).await.unwrap();
        service.fetch_latest_deals(true).await.unwrap();

        let conn = db.connect().unwrap();
        let cached = DealRepository::get_cached(&conn).await.unwrap();
        assert_eq!(cached.len(), 1, "cache must hold one generation only");
    }

    #[test]
    fn test_fallback_entry_percent_encodes_chain() {
        let entry = fallback_entry(
            "McDonald's",
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            DealSource::Fallback,
        );
        assert!(entry.link.starts_with("https://duckduckgo.com/?q="));
        assert!(!entry.link.contains(' '));
    }
}
