use serde::{Deserialize, Serialize};
use url::Url;

/// Query for listing an image's tags
#[derive(Debug, Serialize)]
pub struct ListTags<'a> {
    pub page_size: u32,
    /// Only returns tags containing this string
    pub name: &'a str,
}

/// A page of tags
#[derive(Debug, Deserialize)]
pub struct TagPage {
    #[serde(default)]
    pub count: u64,
    /// The URL of the following page, if any
    pub next: Option<Url>,
    #[serde(default)]
    pub results: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
pub struct Tag {
    pub name: String,
}
