use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::pipeline::{RawRow, RawTable, Snapshot};

/// Read-only client for the hosted Supabase REST store. The pipeline
/// never reaches for an ambient connection; it gets handed one of these.
pub struct SupabaseClient {
    client: Client,
    base: Url,
    key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("gipfelbuch/1.0")
            .build()
            .map_err(AppError::Http)?;

        let base = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid supabase_url: {e}")))?;

        Ok(Self {
            client,
            base,
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| AppError::Config(format!("invalid table url for {table}: {e}")))?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    /// Fetches one table. A non-success status or an undecodable body
    /// degrades to an empty table; only a transport-level failure is an
    /// error, since then the store as a whole is unreachable.
    pub async fn fetch_table(&self, table: &str) -> Result<RawTable> {
        let url = self.table_url(table)?;
        let response = self
            .client
            .get(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(|e| AppError::Source(format!("cannot reach data store: {e}")))?;

        if !response.status().is_success() {
            tracing::warn!(table, status = %response.status(), "table fetch failed, treating as empty");
            return Ok(Vec::new());
        }

        match response.json::<Vec<RawRow>>().await {
            Ok(rows) => {
                tracing::debug!(table, rows = rows.len(), "table fetched");
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "table body undecodable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Fetches all three tables concurrently and canonicalizes them into
    /// one immutable snapshot for the session.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let (peaks, routes, ascents) = futures::try_join!(
            self.fetch_table("peaks"),
            self.fetch_table("routes"),
            self.fetch_table("ascents"),
        )?;
        Ok(Snapshot::from_raw(peaks, routes, ascents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_targets_the_rest_endpoint() {
        let client = SupabaseClient::new("https://example.supabase.co", "anon").unwrap();
        let url = client.table_url("peaks").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/peaks?select=*"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(SupabaseClient::new("not a url", "anon").is_err());
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_a_source_error() {
        // Nothing listens on the discard port
        let client = SupabaseClient::new("http://127.0.0.1:9", "anon").unwrap();
        let err = client.fetch_table("peaks").await.unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }
}
