//! HTTP client for the two TMDB endpoints seenlist needs.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use seenlist_shared::{Result, SearchResult, SeenlistError, TmdbConfig};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("seenlist/", env!("CARGO_PKG_VERSION"));

/// The movie metadata operations the resolver depends on.
///
/// [`TmdbClient`] talks to the real API; tests substitute in-memory fakes.
pub trait SearchApi: Send + Sync {
    /// First page of movie search results for `title`.
    fn search_by_title(&self, title: &str)
    -> impl Future<Output = Result<Vec<SearchResult>>> + Send;

    /// IMDb id for a TMDB catalog id. Empty when TMDB has none on record.
    fn fetch_imdb_id(&self, tmdb_id: u64) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(default)]
    imdb_id: Option<String>,
}

/// reqwest-backed TMDB v3 client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SeenlistError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// GET `{base_url}{path}` with the API key plus `params`, decoding JSON.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{path}", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| SeenlistError::Transport(format!("{operation}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeenlistError::upstream(operation, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SeenlistError::Transport(format!("{operation}: body read failed: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| SeenlistError::Decode(format!("{operation} response: {e}")))
    }
}

impl SearchApi for TmdbClient {
    async fn search_by_title(&self, title: &str) -> Result<Vec<SearchResult>> {
        debug!(title, "searching TMDB");
        let response: SearchResponse = self
            .get_json(
                "search",
                "/search/movie",
                &[
                    ("query", title),
                    ("language", self.config.language.as_str()),
                    ("page", "1"),
                    ("include_adult", "false"),
                ],
            )
            .await?;
        Ok(response.results)
    }

    async fn fetch_imdb_id(&self, tmdb_id: u64) -> Result<String> {
        let ids: ExternalIds = self
            .get_json("external_ids", &format!("/movie/{tmdb_id}/external_ids"), &[])
            .await?;
        Ok(ids.imdb_id.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TmdbClient {
        TmdbClient::new(TmdbConfig {
            api_key: "test-key".into(),
            base_url: server.uri(),
            poster_base_url: "https://img.example/p".into(),
            language: "en-US".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn search_sends_expected_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("query", "Space Jam"))
            .and(query_param("language", "en-US"))
            .and(query_param("page", "1"))
            .and(query_param("include_adult", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page":1,"results":[
                    {"id":2300,"title":"Space Jam","poster_path":"/sj.jpg",
                     "release_date":"1996-11-15","genre_ids":[16,35]},
                    {"id":379170,"title":"Space Jam: A New Legacy","poster_path":null,
                     "release_date":"2021-07-08","genre_ids":[]}
                ]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server).search_by_title("Space Jam").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 2300);
        assert_eq!(results[0].poster_path.as_deref(), Some("/sj.jpg"));
        assert_eq!(results[0].genre_ids, vec![16, 35]);
    }

    #[tokio::test]
    async fn search_error_status_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).search_by_title("Dune").await.unwrap_err();
        match err {
            SeenlistError::Upstream { operation, status } => {
                assert_eq!(operation, "search");
                assert_eq!(status, 401);
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).search_by_title("Dune").await.unwrap_err();
        assert!(matches!(err, SeenlistError::Decode(_)));
    }

    #[tokio::test]
    async fn external_ids_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/movie/2300/external_ids"))
            .and(query_param("api_key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":2300,"imdb_id":"tt0117705","wikidata_id":null}"#),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/movie/1/external_ids"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"imdb_id":null}"#))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch_imdb_id(2300).await.unwrap(), "tt0117705");
        assert_eq!(client.fetch_imdb_id(1).await.unwrap(), "");
    }
}
