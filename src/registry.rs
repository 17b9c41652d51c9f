use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

mod errors;
mod http;

pub use errors::LookupError;
use http::{ListTags, TagPage};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The number of tags to request per page
const PAGE_SIZE: u32 = 100;

/// Checks whether a tag has already been published
#[async_trait]
pub trait TagLookup {
    /// Whether `<repository>/<image>:<tag>` exists in the registry
    async fn tag_exists(&self, repository: &str, image: &str, tag: &str)
        -> Result<bool, LookupError>;
}

/// A client for the Docker Hub API
#[derive(Clone, Debug)]
pub struct DockerHub {
    client: Client,
    base: Url,
}

impl DockerHub {
    /// Create a client for the API at the base URL
    ///
    /// The base is treated as a directory, so `https://mirror/api` and `https://mirror/api/` are
    /// equivalent.
    pub fn new(mut base: Url) -> Result<DockerHub, LookupError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers({
                let mut map = HeaderMap::new();
                map.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
                map
            })
            .build()?;

        Ok(DockerHub { client, base })
    }

    /// Construct the tag listing URL for an image
    fn tags_url(&self, repository: &str, image: &str) -> Result<Url, LookupError> {
        let path = format!("v2/repositories/{repository}/{image}/tags/");
        self.base
            .join(&path)
            .map_err(|_| LookupError::InvalidUrl(path))
    }

    /// Fetch a single page of tags, returning `None` if the repository doesn't exist
    async fn page<T: serde::Serialize>(
        &self,
        url: Url,
        query: Option<T>,
    ) -> Result<Option<TagPage>, LookupError> {
        let mut request = self.client.get(url);
        if let Some(query) = query {
            request = request.query(&query);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(LookupError::Status { status, body })
            }
        }
    }
}

#[async_trait]
impl TagLookup for DockerHub {
    #[instrument(name = "tag_exists", skip(self))]
    async fn tag_exists(
        &self,
        repository: &str,
        image: &str,
        tag: &str,
    ) -> Result<bool, LookupError> {
        let url = self.tags_url(repository, image)?;
        let query = ListTags {
            page_size: PAGE_SIZE,
            name: tag,
        };

        let mut visited = HashSet::new();
        visited.insert(url.clone());
        let mut next = self.page(url, Some(query)).await?;

        while let Some(page) = next {
            debug!(page = visited.len(), count = page.count, results = page.results.len());
            if page.results.iter().any(|result| result.name == tag) {
                return Ok(true);
            }

            next = match page.next {
                Some(url) => {
                    if !visited.insert(url.clone()) {
                        return Err(LookupError::PaginationCycle(url));
                    }
                    self.page(url, None::<ListTags>).await?
                }
                None => None,
            };
        }

        Ok(false)
    }
}
