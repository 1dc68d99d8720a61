use crate::env::EnvManager;
use urlencoding::encode;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_STATS_BASE_URL: &str = "http://localhost:3002/v1";

/// Public roots used to build hypermedia links in read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub stats_base_url: String,
}

impl ApiSettings {
    pub fn from_env(env: &EnvManager) -> Self {
        ApiSettings {
            base_url: trim_slash(env.get_or("API_BASE_URL", DEFAULT_API_BASE_URL)),
            stats_base_url: trim_slash(env.get_or("STATS_BASE_URL", DEFAULT_STATS_BASE_URL)),
        }
    }

    pub fn activity_url(&self, code: &str) -> String {
        format!("{}/entreprises/activite/{}", self.base_url, encode(code))
    }

    pub fn search_url(&self, nom: &str) -> String {
        format!("{}/entreprises/search?nom={}", self.base_url, encode(nom))
    }

    pub fn activity_count_url(&self) -> String {
        format!("{}/stats/activites/count", self.stats_base_url)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
        }
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
