//! Facebook Graph API access.
//!
//! Everything the tool layer needs from the advertising platform goes through
//! the [`AdsApi`] trait. The trait is entity-generic: a node id
//! plus an [`Edge`] addresses any collection the server works with, so the
//! same five verbs cover campaigns, ad sets, ads, creatives, audiences,
//! insights and business assets.
//!
//! ```text
//! ┌──────────────┐  AdsApi   ┌──────────────┐  HTTPS  ┌─────────────────┐
//! │  Dispatcher  │──────────▶│ GraphClient  │────────▶│ graph.facebook  │
//! └──────────────┘           └──────────────┘         └─────────────────┘
//!         │                  ┌──────────────┐
//!         └─────────────────▶│ MockAdsApi   │  (tests)
//!                            └──────────────┘
//! ```
//!
//! Pagination and rate-limit backoff are not handled here; list calls ask
//! for a single page with an explicit `limit`.

pub mod client;
pub mod error;
pub mod mock;

pub use client::GraphClient;
pub use error::{ApiErrorPayload, GraphError, GraphResult};
pub use mock::{MockAdsApi, RecordedCall};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

/// Parameters sent to the Graph API, keyed by Graph field name.
///
/// Insertion order is preserved so requests are deterministic.
pub type ExternalParams = IndexMap<String, Value>;

/// A collection hanging off a Graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// `/{act_id}/campaigns`
    Campaigns,
    /// `/{act_id}/adsets` or `/{campaign_id}/adsets`
    AdSets,
    /// `/{act_id}/ads` or `/{adset_id}/ads`
    Ads,
    /// `/{act_id}/adcreatives`
    AdCreatives,
    /// `/{act_id}/customaudiences`
    CustomAudiences,
    /// `/{act_id}/insights`
    Insights,
    /// `/{act_id}/adimages`
    AdImages,
    /// `/{audience_id}/users`
    Users,
    /// `/me/businesses`
    Businesses,
    /// `/{business_id}/owned_ad_accounts`
    OwnedAdAccounts,
    /// `/{business_id}/owned_pages`
    OwnedPages,
    /// `/{business_id}/owned_product_catalogs`
    OwnedProductCatalogs,
}

impl Edge {
    /// The path segment for this edge.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::AdSets => "adsets",
            Self::Ads => "ads",
            Self::AdCreatives => "adcreatives",
            Self::CustomAudiences => "customaudiences",
            Self::Insights => "insights",
            Self::AdImages => "adimages",
            Self::Users => "users",
            Self::Businesses => "businesses",
            Self::OwnedAdAccounts => "owned_ad_accounts",
            Self::OwnedPages => "owned_pages",
            Self::OwnedProductCatalogs => "owned_product_catalogs",
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operations the tool layer performs against the advertising platform.
///
/// Every method returns the raw JSON body on success. Implementations must
/// surface platform-reported failures as [`GraphError::Api`] so the error
/// classifier can report code, subcode and trace id.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Creates an object on `parent`'s `edge` (`POST /{parent}/{edge}`).
    async fn create(&self, parent: &str, edge: Edge, params: &ExternalParams) -> GraphResult<Value>;

    /// Reads one page of `parent`'s `edge` (`GET /{parent}/{edge}`).
    async fn list(
        &self,
        parent: &str,
        edge: Edge,
        fields: &[&str],
        params: &ExternalParams,
    ) -> GraphResult<Value>;

    /// Reads a single node (`GET /{id}`).
    async fn read(&self, id: &str, fields: &[&str]) -> GraphResult<Value>;

    /// Updates a node in place (`POST /{id}`).
    async fn update(&self, id: &str, params: &ExternalParams) -> GraphResult<Value>;

    /// Deletes a node (`DELETE /{id}`).
    async fn delete(&self, id: &str) -> GraphResult<Value>;
}
