use std::slice;

/// The tag applied when no others are requested
pub const LATEST: &str = "latest";

/// An ordered, duplicate-free list of tags applied to a single build
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagList(Vec<String>);

impl TagList {
    /// Construct the effective tag list from the requested tags and release
    ///
    /// Releases always produce `latest` and the release tag, ahead of any requested tags. Without
    /// a release or requested tags, the list is just `latest`.
    pub fn new(requested: &[String], release: Option<&Release>) -> TagList {
        let mut tags = Vec::with_capacity(requested.len() + 2);

        if let Some(release) = release {
            tags.push(LATEST.to_owned());
            tags.push(release.tag().to_owned());
        }

        for tag in requested {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        if tags.is_empty() {
            tags.push(LATEST.to_owned());
        }

        TagList(tags)
    }

    /// The tag the image is built under locally
    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'t> IntoIterator for &'t TagList {
    type Item = &'t String;
    type IntoIter = slice::Iter<'t, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A release, identified by its tag
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Release {
    tag: String,
}

impl Release {
    pub fn new(tag: impl Into<String>) -> Release {
        Release { tag: tag.into() }
    }

    /// The full release tag, i.e. `4.3.0-1`
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The version being released, the tag up to the first hyphen
    ///
    /// Anything after the hyphen is the release sequence, which is never written to the
    /// Dockerfile.
    pub fn version(&self) -> &str {
        self.tag
            .split_once('-')
            .map_or(self.tag.as_str(), |(version, _)| version)
    }
}
