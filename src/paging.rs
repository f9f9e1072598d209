//! Partner Center collection envelope and continuation-based paging.
//!
//! Collection responses carry a `links.next` entry whose headers (notably
//! `MS-ContinuationToken`) must be replayed on the follow-up request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::PartnerCenterClient;
use crate::error::PartnerResult;

/// Header key/value pair attached to a paging link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

/// A single navigation link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Relative URI of the linked request.
    pub uri: String,
    /// HTTP verb of the linked request.
    #[serde(default)]
    pub method: Option<String>,
    /// Headers to replay on the linked request.
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
}

/// Navigation links of a collection response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
    #[serde(default)]
    pub next: Option<Link>,
    #[serde(default)]
    pub previous: Option<Link>,
}

/// The Partner Center collection envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCollection<T> {
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub links: Option<ResourceLinks>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

impl<T> ResourceCollection<T> {
    /// Whether a continuation link is present.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

impl PartnerCenterClient {
    /// Follows the collection's `next` link, replaying its headers.
    ///
    /// Returns `Ok(None)` when the collection is exhausted.
    pub async fn next_page<T: DeserializeOwned>(
        &self,
        collection: &ResourceCollection<T>,
    ) -> PartnerResult<Option<ResourceCollection<T>>> {
        self.follow_link(collection.links.as_ref().and_then(|l| l.next.as_ref()))
            .await
    }

    /// Walks every page of a collection, handing each batch of items to the
    /// callback.
    ///
    /// The callback always receives a page before the next one is fetched,
    /// so items already downloaded are delivered even when a later
    /// continuation request fails.
    pub async fn for_each_page<T, F>(
        &self,
        first: ResourceCollection<T>,
        mut callback: F,
    ) -> PartnerResult<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> PartnerResult<()>,
    {
        let mut current = first;
        loop {
            let links = current.links.take();
            callback(current.items)?;
            match self
                .follow_link(links.as_ref().and_then(|l| l.next.as_ref()))
                .await?
            {
                Some(page) => current = page,
                None => return Ok(()),
            }
        }
    }

    async fn follow_link<T: DeserializeOwned>(
        &self,
        link: Option<&Link>,
    ) -> PartnerResult<Option<ResourceCollection<T>>> {
        let Some(next) = link else {
            return Ok(None);
        };

        let url = self.resolve_link(&next.uri);
        let headers: Vec<(String, String)> = next
            .headers
            .iter()
            .map(|h| (h.key.clone(), h.value.clone()))
            .collect();

        let page = self.get_with_headers(&url, &headers).await?;
        Ok(Some(page))
    }

    /// Link URIs are relative to the API base unless already absolute.
    fn resolve_link(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            format!("{}/{}", self.base_url(), uri.trim_start_matches('/'))
        }
    }
}
