//! Typed per-tool arguments.
//!
//! A `tools/call` carries a name and a loosely-typed argument object. Parsing
//! turns that pair into a [`ToolRequest`], one variant per tool, each with its
//! own argument struct. Callers use camelCase keys; the few snake_case keys
//! (`special_ad_categories`, `object_story_spec`, `customer_file_source`) are
//! kept as the tool schemas declare them.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{ToolError, ToolResult};
use super::money::Amount;
use super::registry::Tool;
use crate::graph::Edge;

// ============================================================================
// Argument structs
// ============================================================================

/// Arguments for `list_campaigns`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCampaignsArgs {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Arguments for `list_ad_sets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAdSetsArgs {
    pub campaign_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Arguments for `list_ads`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAdsArgs {
    pub ad_set_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Arguments for account-wide listings without a status filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageArgs {
    pub limit: Option<i64>,
}

/// A bare campaign identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignIdArgs {
    pub campaign_id: String,
}

/// A bare ad set identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSetIdArgs {
    pub ad_set_id: String,
}

/// A bare ad identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdIdArgs {
    pub ad_id: String,
}

/// A bare custom audience identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceIdArgs {
    pub audience_id: String,
}

/// A bare business identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdArgs {
    pub business_id: String,
}

/// Arguments for `create_campaign`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignArgs {
    pub name: String,
    pub objective: String,
    pub status: Option<String>,
    pub daily_budget: Option<Amount>,
    pub lifetime_budget: Option<Amount>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(rename = "special_ad_categories")]
    pub special_ad_categories: Option<Vec<String>>,
}

/// Arguments for `update_campaign`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignArgs {
    pub campaign_id: String,
    pub name: Option<String>,
    pub objective: Option<String>,
    pub status: Option<String>,
    pub daily_budget: Option<Amount>,
    pub lifetime_budget: Option<Amount>,
    pub end_time: Option<String>,
    #[serde(rename = "special_ad_categories")]
    pub special_ad_categories: Option<Vec<String>>,
}

impl UpdateCampaignArgs {
    /// Whether any mutable field is present.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.objective.is_some()
            || self.status.is_some()
            || self.daily_budget.is_some()
            || self.lifetime_budget.is_some()
            || self.end_time.is_some()
            || self.special_ad_categories.is_some()
    }
}

/// Arguments for `create_ad_set`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdSetArgs {
    pub campaign_id: String,
    pub name: String,
    pub status: Option<String>,
    pub billing_event: String,
    pub optimization_goal: String,
    pub targeting: Map<String, Value>,
    pub daily_budget: Option<Amount>,
    pub lifetime_budget: Option<Amount>,
    pub bid_amount: Option<Amount>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Arguments for `update_ad_set`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdSetArgs {
    pub ad_set_id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub billing_event: Option<String>,
    pub optimization_goal: Option<String>,
    pub targeting: Option<Map<String, Value>>,
    pub daily_budget: Option<Amount>,
    pub lifetime_budget: Option<Amount>,
    pub bid_amount: Option<Amount>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl UpdateAdSetArgs {
    /// Whether any mutable field is present.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.status.is_some()
            || self.billing_event.is_some()
            || self.optimization_goal.is_some()
            || self.targeting.is_some()
            || self.daily_budget.is_some()
            || self.lifetime_budget.is_some()
            || self.bid_amount.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
    }
}

/// Arguments for `create_ad`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdArgs {
    pub ad_set_id: String,
    pub name: String,
    pub status: Option<String>,
    pub creative_id: String,
}

/// Arguments for `update_ad`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdArgs {
    pub ad_id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub creative_id: Option<String>,
}

impl UpdateAdArgs {
    /// Whether any mutable field is present.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.name.is_some() || self.status.is_some() || self.creative_id.is_some()
    }
}

/// Arguments for `create_ad_creative`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdCreativeArgs {
    pub name: String,
    pub object_story_spec: Map<String, Value>,
}

/// Arguments for `upload_ad_media`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAdMediaArgs {
    pub file_path: PathBuf,
}

/// Arguments for `create_custom_audience`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomAudienceArgs {
    pub name: String,
    pub subtype: String,
    pub description: Option<String>,
    pub customer_file_source: Option<String>,
    pub rule: Option<Value>,
}

/// Arguments for `create_lookalike_audience`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLookalikeArgs {
    pub name: String,
    pub source_audience_id: String,
    pub country: String,
    pub ratio: Option<f64>,
    pub description: Option<String>,
}

/// Arguments for `add_users_to_custom_audience`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersArgs {
    pub audience_id: String,
    pub schema: KeySchema,
    pub users: Vec<Value>,
}

/// The key type(s) of uploaded audience records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySchema {
    /// One key per record, e.g. `EMAIL_SHA256`.
    Single(String),
    /// Multiple keys per record.
    Multi(Vec<String>),
}

impl KeySchema {
    /// The declared key names.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Single(key) => vec![key.as_str()],
            Self::Multi(keys) => keys.iter().map(String::as_str).collect(),
        }
    }

    /// The schema as the Graph API expects it in a `payload`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Single(key) => Value::String(key.clone()),
            Self::Multi(keys) => Value::from(keys.clone()),
        }
    }
}

/// Arguments shared by the three insights tools.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsArgs {
    pub ids: Option<Vec<String>>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub date_preset: Option<String>,
    pub metrics: Option<MetricList>,
}

/// Insight metric names, given either as an array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "MetricRepr")]
pub struct MetricList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricRepr {
    List(Vec<String>),
    Csv(String),
}

impl From<MetricRepr> for MetricList {
    fn from(repr: MetricRepr) -> Self {
        let items = match repr {
            MetricRepr::List(items) => items,
            MetricRepr::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        Self(
            items
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        )
    }
}

impl MetricList {
    /// The metric names.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether no metric names remain after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Discriminators
// ============================================================================

/// The aggregation level of an insights query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightsLevel {
    Campaign,
    AdSet,
    Ad,
}

impl InsightsLevel {
    /// The Graph `level` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::AdSet => "adset",
            Self::Ad => "ad",
        }
    }

    /// Metrics requested when the caller names none.
    #[must_use]
    pub const fn default_metrics(self) -> &'static [&'static str] {
        match self {
            Self::Campaign => &[
                "campaign_id",
                "campaign_name",
                "spend",
                "impressions",
                "clicks",
                "ctr",
                "cpc",
                "reach",
                "frequency",
            ],
            Self::AdSet => &[
                "adset_id",
                "adset_name",
                "campaign_id",
                "spend",
                "impressions",
                "clicks",
                "ctr",
                "cpc",
                "reach",
                "frequency",
            ],
            Self::Ad => &[
                "ad_id",
                "ad_name",
                "adset_id",
                "campaign_id",
                "spend",
                "impressions",
                "clicks",
                "ctr",
                "cpc",
                "reach",
                "frequency",
            ],
        }
    }

    const fn tool(self) -> Tool {
        match self {
            Self::Campaign => Tool::GetCampaignInsights,
            Self::AdSet => Tool::GetAdSetInsights,
            Self::Ad => Tool::GetAdInsights,
        }
    }
}

/// Objects owned by a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessAsset {
    AdAccounts,
    Pages,
    Catalogs,
}

impl BusinessAsset {
    /// The edge listing this asset under a business node.
    #[must_use]
    pub const fn edge(self) -> Edge {
        match self {
            Self::AdAccounts => Edge::OwnedAdAccounts,
            Self::Pages => Edge::OwnedPages,
            Self::Catalogs => Edge::OwnedProductCatalogs,
        }
    }

    const fn tool(self) -> Tool {
        match self {
            Self::AdAccounts => Tool::GetBusinessAdAccounts,
            Self::Pages => Tool::GetBusinessPages,
            Self::Catalogs => Tool::ListBusinessCatalogs,
        }
    }
}

// ============================================================================
// ToolRequest
// ============================================================================

/// A parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    ListCampaigns(ListCampaignsArgs),
    GetCampaignDetails(CampaignIdArgs),
    CreateCampaign(CreateCampaignArgs),
    UpdateCampaign(UpdateCampaignArgs),
    DeleteCampaign(CampaignIdArgs),
    ListAdSets(ListAdSetsArgs),
    CreateAdSet(CreateAdSetArgs),
    UpdateAdSet(UpdateAdSetArgs),
    DeleteAdSet(AdSetIdArgs),
    ListAds(ListAdsArgs),
    CreateAd(CreateAdArgs),
    UpdateAd(UpdateAdArgs),
    DeleteAd(AdIdArgs),
    ListAdCreatives(PageArgs),
    CreateAdCreative(CreateAdCreativeArgs),
    UploadAdMedia(UploadAdMediaArgs),
    ListCustomAudiences(PageArgs),
    CreateCustomAudience(CreateCustomAudienceArgs),
    CreateLookalikeAudience(CreateLookalikeArgs),
    AddUsersToCustomAudience(AddUsersArgs),
    DeleteCustomAudience(AudienceIdArgs),
    GetInsights(InsightsLevel, InsightsArgs),
    ListBusinesses,
    ListBusinessAssets(BusinessAsset, BusinessIdArgs),
    Overview,
}

impl ToolRequest {
    /// Builds a typed request from raw `tools/call` arguments.
    ///
    /// Missing arguments (`null`) are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] if the arguments are not an object or
    /// do not fit the tool's argument structure.
    pub fn parse(tool: Tool, arguments: Value) -> ToolResult<Self> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => arguments,
            _ => {
                return Err(ToolError::validation(format!(
                    "Invalid arguments for {}: expected an object",
                    tool.name()
                )))
            }
        };

        let request = match tool {
            Tool::ListCampaigns => Self::ListCampaigns(decode(tool, arguments)?),
            Tool::GetCampaignDetails => Self::GetCampaignDetails(decode(tool, arguments)?),
            Tool::CreateCampaign => Self::CreateCampaign(decode(tool, arguments)?),
            Tool::UpdateCampaign => Self::UpdateCampaign(decode(tool, arguments)?),
            Tool::DeleteCampaign => Self::DeleteCampaign(decode(tool, arguments)?),
            Tool::ListAdSets => Self::ListAdSets(decode(tool, arguments)?),
            Tool::CreateAdSet => Self::CreateAdSet(decode(tool, arguments)?),
            Tool::UpdateAdSet => Self::UpdateAdSet(decode(tool, arguments)?),
            Tool::DeleteAdSet => Self::DeleteAdSet(decode(tool, arguments)?),
            Tool::ListAds => Self::ListAds(decode(tool, arguments)?),
            Tool::CreateAd => Self::CreateAd(decode(tool, arguments)?),
            Tool::UpdateAd => Self::UpdateAd(decode(tool, arguments)?),
            Tool::DeleteAd => Self::DeleteAd(decode(tool, arguments)?),
            Tool::ListAdCreatives => Self::ListAdCreatives(decode(tool, arguments)?),
            Tool::CreateAdCreative => Self::CreateAdCreative(decode(tool, arguments)?),
            Tool::UploadAdMedia => Self::UploadAdMedia(decode(tool, arguments)?),
            Tool::ListCustomAudiences => Self::ListCustomAudiences(decode(tool, arguments)?),
            Tool::CreateCustomAudience => Self::CreateCustomAudience(decode(tool, arguments)?),
            Tool::CreateLookalikeAudience => {
                Self::CreateLookalikeAudience(decode(tool, arguments)?)
            }
            Tool::AddUsersToCustomAudience => {
                Self::AddUsersToCustomAudience(decode(tool, arguments)?)
            }
            Tool::DeleteCustomAudience => Self::DeleteCustomAudience(decode(tool, arguments)?),
            Tool::GetCampaignInsights => {
                Self::GetInsights(InsightsLevel::Campaign, decode(tool, arguments)?)
            }
            Tool::GetAdSetInsights => {
                Self::GetInsights(InsightsLevel::AdSet, decode(tool, arguments)?)
            }
            Tool::GetAdInsights => Self::GetInsights(InsightsLevel::Ad, decode(tool, arguments)?),
            Tool::ListBusinesses => Self::ListBusinesses,
            Tool::GetBusinessAdAccounts => {
                Self::ListBusinessAssets(BusinessAsset::AdAccounts, decode(tool, arguments)?)
            }
            Tool::GetBusinessPages => {
                Self::ListBusinessAssets(BusinessAsset::Pages, decode(tool, arguments)?)
            }
            Tool::ListBusinessCatalogs => {
                Self::ListBusinessAssets(BusinessAsset::Catalogs, decode(tool, arguments)?)
            }
            Tool::AdsManagementOverview => Self::Overview,
        };

        Ok(request)
    }

    /// The tool this request invokes.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        match self {
            Self::ListCampaigns(_) => Tool::ListCampaigns,
            Self::GetCampaignDetails(_) => Tool::GetCampaignDetails,
            Self::CreateCampaign(_) => Tool::CreateCampaign,
            Self::UpdateCampaign(_) => Tool::UpdateCampaign,
            Self::DeleteCampaign(_) => Tool::DeleteCampaign,
            Self::ListAdSets(_) => Tool::ListAdSets,
            Self::CreateAdSet(_) => Tool::CreateAdSet,
            Self::UpdateAdSet(_) => Tool::UpdateAdSet,
            Self::DeleteAdSet(_) => Tool::DeleteAdSet,
            Self::ListAds(_) => Tool::ListAds,
            Self::CreateAd(_) => Tool::CreateAd,
            Self::UpdateAd(_) => Tool::UpdateAd,
            Self::DeleteAd(_) => Tool::DeleteAd,
            Self::ListAdCreatives(_) => Tool::ListAdCreatives,
            Self::CreateAdCreative(_) => Tool::CreateAdCreative,
            Self::UploadAdMedia(_) => Tool::UploadAdMedia,
            Self::ListCustomAudiences(_) => Tool::ListCustomAudiences,
            Self::CreateCustomAudience(_) => Tool::CreateCustomAudience,
            Self::CreateLookalikeAudience(_) => Tool::CreateLookalikeAudience,
            Self::AddUsersToCustomAudience(_) => Tool::AddUsersToCustomAudience,
            Self::DeleteCustomAudience(_) => Tool::DeleteCustomAudience,
            Self::GetInsights(level, _) => level.tool(),
            Self::ListBusinesses => Tool::ListBusinesses,
            Self::ListBusinessAssets(asset, _) => asset.tool(),
            Self::Overview => Tool::AdsManagementOverview,
        }
    }
}

fn decode<T: DeserializeOwned>(tool: Tool, arguments: Value) -> ToolResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::validation(format!("Invalid arguments for {}: {e}", tool.name())))
}
