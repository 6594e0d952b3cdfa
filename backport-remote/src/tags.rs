//! Paginated tag listing

use crate::error::{RemoteError, RemoteResult};
use crate::messages::TagEntry;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client as HttpClient, Url};
use std::time::Duration;
use tracing::{debug, trace};

/// Page size requested from the tag API
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Source of individual tag pages, numbered from 1.
#[async_trait]
pub trait TagPageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> RemoteResult<Vec<String>>;
}

/// Anything that can produce the complete tag list for a repository.
#[async_trait]
pub trait TagProvider: Send + Sync {
    async fn list_tags(&self, token: &str) -> RemoteResult<Vec<String>>;
}

/// Fetch pages 1, 2, ... until one comes back empty and return every tag in
/// response order.
pub async fn collect_all_tags<S>(source: &S) -> RemoteResult<Vec<String>>
where
    S: TagPageSource + ?Sized,
{
    let mut tags = Vec::new();
    let mut page = 1u32;

    loop {
        let batch = source.fetch_page(page).await?;
        trace!(page, count = batch.len(), "Fetched tag page");
        if batch.is_empty() {
            break;
        }
        tags.extend(batch);
        page += 1;
    }

    debug!(pages = page - 1, total = tags.len(), "Collected repository tags");
    Ok(tags)
}

/// Tag API client (GitHub `GET /repos/{owner}/{repo}/tags` compatible)
#[derive(Clone)]
pub struct TagClient {
    http_client: HttpClient,
    endpoint: Url,
    per_page: u32,
}

/// Builder for [`TagClient`]
pub struct TagClientBuilder {
    endpoint: String,
    per_page: u32,
    timeout: Duration,
}

impl TagClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> RemoteResult<TagClient> {
        let endpoint = Url::parse(&self.endpoint)?;
        let http_client = HttpClient::builder().timeout(self.timeout).build()?;

        Ok(TagClient {
            http_client,
            endpoint,
            per_page: self.per_page,
        })
    }
}

impl TagClient {
    pub fn new(endpoint: impl Into<String>) -> RemoteResult<Self> {
        TagClientBuilder::new(endpoint).build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of a single page, `?per_page=..&page=..` appended to any query the
    /// endpoint already carries.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    fn headers(token: &str) -> RemoteResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| RemoteError::Config(format!("invalid token: {err}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("backport/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(headers)
    }

    async fn fetch_page_with_token(&self, token: &str, page: u32) -> RemoteResult<Vec<String>> {
        let url = self.page_url(page);
        trace!(url = %url, "Requesting tag page");

        let response = self
            .http_client
            .get(url.clone())
            .headers(Self::headers(token)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let entries: Vec<TagEntry> = serde_json::from_str(&body).map_err(|e| {
            RemoteError::Serialization(format!("Failed to parse tag page {page}: {e}"))
        })?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }
}

/// A [`TagClient`] bound to one bearer token.
struct AuthorizedTagPages<'a> {
    client: &'a TagClient,
    token: &'a str,
}

#[async_trait]
impl TagPageSource for AuthorizedTagPages<'_> {
    async fn fetch_page(&self, page: u32) -> RemoteResult<Vec<String>> {
        self.client.fetch_page_with_token(self.token, page).await
    }
}

#[async_trait]
impl TagProvider for TagClient {
    async fn list_tags(&self, token: &str) -> RemoteResult<Vec<String>> {
        debug!(endpoint = %self.endpoint, "Listing repository tags");
        collect_all_tags(&AuthorizedTagPages {
            client: self,
            token,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedPages {
        pages: Vec<Vec<&'static str>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedPages {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TagPageSource for ScriptedPages {
        async fn fetch_page(&self, page: u32) -> RemoteResult<Vec<String>> {
            self.requested.lock().unwrap().push(page);
            let batch = self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default();
            Ok(batch.into_iter().map(str::to_string).collect())
        }
    }

    #[tokio::test]
    async fn stops_after_first_empty_page() {
        let source = ScriptedPages::new(vec![
            vec!["v3.2.0", "v3.1.0"],
            vec!["v3.0.0"],
            vec!["v2.9.1", "v2.9.0"],
            vec![],
            vec!["never-read"],
        ]);

        let tags = collect_all_tags(&source).await.unwrap();

        assert_eq!(
            tags,
            vec!["v3.2.0", "v3.1.0", "v3.0.0", "v2.9.1", "v2.9.0"]
        );
        assert_eq!(source.requested(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn empty_first_page_yields_no_tags() {
        let source = ScriptedPages::new(vec![]);
        let tags = collect_all_tags(&source).await.unwrap();
        assert!(tags.is_empty());
        assert_eq!(source.requested(), vec![1]);
    }

    struct FailingPages;

    #[async_trait]
    impl TagPageSource for FailingPages {
        async fn fetch_page(&self, page: u32) -> RemoteResult<Vec<String>> {
            if page == 1 {
                Ok(vec!["v1.0.0".to_string()])
            } else {
                Err(RemoteError::Http {
                    url: "https://api.github.com/repos/o/r/tags".to_string(),
                    status: 403,
                    body: "rate limited".to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn page_error_is_propagated() {
        let err = collect_all_tags(&FailingPages).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn page_url_appends_pagination() {
        let client = TagClientBuilder::new("https://api.github.com/repos/acme/widgets/tags")
            .build()
            .unwrap();
        assert_eq!(
            client.page_url(3).as_str(),
            "https://api.github.com/repos/acme/widgets/tags?per_page=100&page=3"
        );
    }

    #[test]
    fn page_url_respects_custom_page_size() {
        let client = TagClientBuilder::new("https://git.example/api/tags?sort=desc")
            .with_per_page(25)
            .build()
            .unwrap();
        assert_eq!(
            client.page_url(1).as_str(),
            "https://git.example/api/tags?sort=desc&per_page=25&page=1"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = TagClient::new("not a url").err().unwrap();
        assert!(matches!(err, RemoteError::InvalidEndpoint(_)));
    }

    mod over_http {
        use super::*;
        use crate::test_support::{StubResponse, serve};

        #[tokio::test]
        async fn pages_with_bearer_token_until_empty_page() {
            let (base, server) = serve(vec![
                StubResponse::new(200, r#"[{"name":"v2.0.0"},{"name":"v1.1.0"}]"#),
                StubResponse::new(200, r#"[{"name":"v1.0.0","commit":{"sha":"abc"}}]"#),
                StubResponse::new(200, "[]"),
            ])
            .await;
            let client = TagClientBuilder::new(format!("{base}/repos/acme/widgets/tags"))
                .with_per_page(2)
                .build()
                .unwrap();

            let tags = client.list_tags("ghp_secret").await.unwrap();
            assert_eq!(tags, vec!["v2.0.0", "v1.1.0", "v1.0.0"]);

            let requests = server.await.unwrap();
            let lines: Vec<&str> = requests
                .iter()
                .map(|request| request.request_line.as_str())
                .collect();
            assert_eq!(
                lines,
                vec![
                    "GET /repos/acme/widgets/tags?per_page=2&page=1 HTTP/1.1",
                    "GET /repos/acme/widgets/tags?per_page=2&page=2 HTTP/1.1",
                    "GET /repos/acme/widgets/tags?per_page=2&page=3 HTTP/1.1",
                ]
            );
            for request in &requests {
                assert_eq!(request.header("authorization"), Some("Bearer ghp_secret"));
                assert_eq!(
                    request.header("accept"),
                    Some("application/vnd.github+json")
                );
                assert!(
                    request
                        .header("user-agent")
                        .is_some_and(|agent| agent.starts_with("backport/"))
                );
            }
        }

        #[tokio::test]
        async fn rejected_token_surfaces_http_status() {
            let (base, server) =
                serve(vec![StubResponse::new(401, r#"{"message":"Bad credentials"}"#)]).await;
            let client = TagClient::new(format!("{base}/repos/acme/widgets/tags")).unwrap();

            let err = client.list_tags("expired").await.unwrap_err();
            assert_eq!(err.status(), Some(401));
            match err {
                RemoteError::Http { body, .. } => assert!(body.contains("Bad credentials")),
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(server.await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn malformed_page_is_a_serialization_error() {
            let (base, _server) = serve(vec![StubResponse::new(200, "{}")]).await;
            let client = TagClient::new(format!("{base}/tags")).unwrap();
            let err = client.list_tags("t").await.unwrap_err();
            assert!(matches!(err, RemoteError::Serialization(_)));
        }
    }
}
