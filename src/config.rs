use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse `DEALS_CHAINS` env var: comma-separated chain names,
/// e.g. `McDonald's,KFC,Starbucks`.
fn parse_chains() -> Vec<String> {
    match env::var("DEALS_CHAINS") {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => DEFAULT_CHAINS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Chains the deal finder tracks when `DEALS_CHAINS` is not set.
const DEFAULT_CHAINS: &[&str] = &[
    "McDonald's",
    "KFC",
    "Starbucks",
    "Pizza Hut",
    "Burger King",
    "Sukiya",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub deals: DealsConfig,
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Deal cache policy settings: which chains to track, how long the cache
/// stays fresh, and where the text-search provider lives.
#[derive(Debug, Clone, Deserialize)]
pub struct DealsConfig {
    pub chains: Vec<String>,
    pub cache_ttl_days: i64,
    pub results_per_chain: usize,
    pub search_base_url: Option<String>,
    pub search_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommenderConfig {
    pub min_records: usize,
    pub tree_count: usize,
    pub seed: u64,
    pub default_top_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            min_records: 5,
            tree_count: 100,
            seed: 42,
            default_top_k: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("MOGU_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("MOGU_PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:mogu.db".to_string()),
            },
            deals: DealsConfig {
                chains: parse_chains(),
                cache_ttl_days: parse_env_or("DEALS_CACHE_TTL_DAYS", 7),
                results_per_chain: parse_env_or("DEALS_RESULTS_PER_CHAIN", 2),
                search_base_url: env::var("DEALS_SEARCH_BASE_URL").ok(),
                search_timeout_secs: parse_env_or("DEALS_SEARCH_TIMEOUT", 10),
            },
            recommender: RecommenderConfig {
                min_records: parse_env_or("RECOMMENDER_MIN_RECORDS", 5),
                tree_count: parse_env_or("RECOMMENDER_TREES", 100),
                seed: parse_env_or("RECOMMENDER_SEED", 42),
                default_top_k: parse_env_or("RECOMMENDER_TOP_K", 3),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_recommender_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("RECOMMENDER_MIN_RECORDS");
        std::env::remove_var("RECOMMENDER_TREES");
        std::env::remove_var("RECOMMENDER_SEED");

        let config = Config::default();
        assert_eq!(config.recommender.min_records, 5);
        assert_eq!(config.recommender.tree_count, 100);
        assert_eq!(config.recommender.seed, 42);
        assert_eq!(config.recommender.default_top_k, 3);
    }

    #[test]
    fn test_deals_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("DEALS_CHAINS");
        std::env::remove_var("DEALS_CACHE_TTL_DAYS");

        let config = Config::default();
        assert_eq!(config.deals.chains.len(), 6);
        assert_eq!(config.deals.cache_ttl_days, 7);
        assert_eq!(config.deals.results_per_chain, 2);
        assert!(config.deals.search_base_url.is_none());
    }

    #[test]
    fn test_deals_chains_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("DEALS_CHAINS", "Mos Burger, Yoshinoya");
        let config = Config::default();
        assert_eq!(config.deals.chains, vec!["Mos Burger", "Yoshinoya"]);
        std::env::remove_var("DEALS_CHAINS");
    }

    #[test]
    fn test_cache_ttl_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("DEALS_CACHE_TTL_DAYS", "3");
        let config = Config::default();
        assert_eq!(config.deals.cache_ttl_days, 3);
        std::env::remove_var("DEALS_CACHE_TTL_DAYS");
    }

    #[test]
    fn test_parse_env_or_invalid_value_uses_default() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("__TEST_PARSE_TREES", "not-a-number");
        let result: usize = parse_env_or("__TEST_PARSE_TREES", 100);
        assert_eq!(result, 100);
        std::env::remove_var("__TEST_PARSE_TREES");
    }
}
