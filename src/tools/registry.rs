//! Static registry of the tools this server exposes.
//!
//! Each [`Tool`] declares its name, description, JSON Schema and required
//! arguments. The required list is the single source for both the schema's
//! `required` array and the validator's required-field check.

use serde::Serialize;
use serde_json::{json, Value};

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Every tool the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    // Campaigns
    ListCampaigns,
    GetCampaignDetails,
    CreateCampaign,
    UpdateCampaign,
    DeleteCampaign,
    // Ad sets
    ListAdSets,
    CreateAdSet,
    UpdateAdSet,
    DeleteAdSet,
    // Ads
    ListAds,
    CreateAd,
    UpdateAd,
    DeleteAd,
    // Creatives and media
    ListAdCreatives,
    CreateAdCreative,
    UploadAdMedia,
    // Audiences
    ListCustomAudiences,
    CreateCustomAudience,
    CreateLookalikeAudience,
    AddUsersToCustomAudience,
    DeleteCustomAudience,
    // Insights
    GetCampaignInsights,
    GetAdSetInsights,
    GetAdInsights,
    // Business
    ListBusinesses,
    GetBusinessAdAccounts,
    GetBusinessPages,
    ListBusinessCatalogs,
    // Help
    AdsManagementOverview,
}

impl Tool {
    /// All tools in registration order.
    pub const ALL: [Self; 29] = [
        Self::ListCampaigns,
        Self::GetCampaignDetails,
        Self::CreateCampaign,
        Self::UpdateCampaign,
        Self::DeleteCampaign,
        Self::ListAdSets,
        Self::CreateAdSet,
        Self::UpdateAdSet,
        Self::DeleteAdSet,
        Self::ListAds,
        Self::CreateAd,
        Self::UpdateAd,
        Self::DeleteAd,
        Self::ListAdCreatives,
        Self::CreateAdCreative,
        Self::UploadAdMedia,
        Self::ListCustomAudiences,
        Self::CreateCustomAudience,
        Self::CreateLookalikeAudience,
        Self::AddUsersToCustomAudience,
        Self::DeleteCustomAudience,
        Self::GetCampaignInsights,
        Self::GetAdSetInsights,
        Self::GetAdInsights,
        Self::ListBusinesses,
        Self::GetBusinessAdAccounts,
        Self::GetBusinessPages,
        Self::ListBusinessCatalogs,
        Self::AdsManagementOverview,
    ];

    /// The wire name of the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListCampaigns => "list_campaigns",
            Self::GetCampaignDetails => "get_campaign_details",
            Self::CreateCampaign => "create_campaign",
            Self::UpdateCampaign => "update_campaign",
            Self::DeleteCampaign => "delete_campaign",
            Self::ListAdSets => "list_ad_sets",
            Self::CreateAdSet => "create_ad_set",
            Self::UpdateAdSet => "update_ad_set",
            Self::DeleteAdSet => "delete_ad_set",
            Self::ListAds => "list_ads",
            Self::CreateAd => "create_ad",
            Self::UpdateAd => "update_ad",
            Self::DeleteAd => "delete_ad",
            Self::ListAdCreatives => "list_ad_creatives",
            Self::CreateAdCreative => "create_ad_creative",
            Self::UploadAdMedia => "upload_ad_media",
            Self::ListCustomAudiences => "list_custom_audiences",
            Self::CreateCustomAudience => "create_custom_audience",
            Self::CreateLookalikeAudience => "create_lookalike_audience",
            Self::AddUsersToCustomAudience => "add_users_to_custom_audience",
            Self::DeleteCustomAudience => "delete_custom_audience",
            Self::GetCampaignInsights => "get_campaign_insights",
            Self::GetAdSetInsights => "get_adset_insights",
            Self::GetAdInsights => "get_ad_insights",
            Self::ListBusinesses => "list_businesses",
            Self::GetBusinessAdAccounts => "get_business_ad_accounts",
            Self::GetBusinessPages => "get_business_pages",
            Self::ListBusinessCatalogs => "list_business_catalogs",
            Self::AdsManagementOverview => "ads_management_overview",
        }
    }

    /// Looks a tool up by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Arguments that must be present and non-empty.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::GetCampaignDetails | Self::UpdateCampaign | Self::DeleteCampaign => {
                &["campaignId"]
            }
            Self::CreateCampaign => &["name", "objective"],
            Self::CreateAdSet => &[
                "campaignId",
                "name",
                "billingEvent",
                "optimizationGoal",
                "targeting",
            ],
            Self::UpdateAdSet | Self::DeleteAdSet => &["adSetId"],
            Self::CreateAd => &["adSetId", "name", "creativeId"],
            Self::UpdateAd | Self::DeleteAd => &["adId"],
            Self::CreateAdCreative => &["name", "object_story_spec"],
            Self::UploadAdMedia => &["filePath"],
            Self::CreateCustomAudience => &["name", "subtype"],
            Self::CreateLookalikeAudience => &["name", "sourceAudienceId", "country"],
            Self::AddUsersToCustomAudience => &["audienceId", "schema", "users"],
            Self::DeleteCustomAudience => &["audienceId"],
            Self::GetBusinessAdAccounts | Self::GetBusinessPages | Self::ListBusinessCatalogs => {
                &["businessId"]
            }
            Self::ListCampaigns
            | Self::ListAdSets
            | Self::ListAds
            | Self::ListAdCreatives
            | Self::ListCustomAudiences
            | Self::GetCampaignInsights
            | Self::GetAdSetInsights
            | Self::GetAdInsights
            | Self::ListBusinesses
            | Self::AdsManagementOverview => &[],
        }
    }

    /// Human-readable description shown to the client.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ListCampaigns => {
                "List campaigns in the configured ad account, optionally filtered by \
                 effective status (defaults to ACTIVE). Budgets are in account currency units."
            }
            Self::GetCampaignDetails => {
                "Get full details of one campaign: objective, status, buying type, budgets, \
                 spend cap, remaining budget, schedule and special ad categories."
            }
            Self::CreateCampaign => {
                "Create a campaign in the configured ad account. Budgets are given in account \
                 currency units (e.g. 10.50) and converted to cents. Status defaults to PAUSED."
            }
            Self::UpdateCampaign => {
                "Update an existing campaign. At least one field besides campaignId is required."
            }
            Self::DeleteCampaign => "Delete a campaign.",
            Self::ListAdSets => {
                "List ad sets for a campaign, or for the whole ad account when campaignId is \
                 omitted. Filters by effective status (defaults to ACTIVE)."
            }
            Self::CreateAdSet => {
                "Create an ad set within a campaign. Exactly one of dailyBudget or \
                 lifetimeBudget must be set (account currency units). Status defaults to PAUSED."
            }
            Self::UpdateAdSet => {
                "Update an existing ad set. At least one field besides adSetId is required."
            }
            Self::DeleteAdSet => "Delete an ad set.",
            Self::ListAds => {
                "List ads within an ad set, or for the whole ad account when adSetId is omitted. \
                 Filters by effective status (defaults to ACTIVE)."
            }
            Self::CreateAd => "Create an ad in an ad set using an existing ad creative.",
            Self::UpdateAd => {
                "Update an existing ad. At least one of name, status or creativeId is required."
            }
            Self::DeleteAd => "Delete an ad.",
            Self::ListAdCreatives => "List ad creatives in the configured ad account.",
            Self::CreateAdCreative => {
                "Create an ad creative from an object story spec (page id plus link, photo or \
                 video data). Use upload_ad_media first to obtain an image hash."
            }
            Self::UploadAdMedia => {
                "Upload a local image (jpg, jpeg, png, gif) to the ad account's image library \
                 and return its hash for use in creatives."
            }
            Self::ListCustomAudiences => "List custom audiences in the configured ad account.",
            Self::CreateCustomAudience => {
                "Create a custom audience. CUSTOM requires description and customer_file_source; \
                 WEBSITE and ENGAGEMENT require a rule object. Use create_lookalike_audience for \
                 lookalikes."
            }
            Self::CreateLookalikeAudience => {
                "Create a lookalike audience from an existing custom audience for one country."
            }
            Self::AddUsersToCustomAudience => {
                "Add up to 10,000 hashed user records to a customer-list custom audience."
            }
            Self::DeleteCustomAudience => "Delete a custom audience.",
            Self::GetCampaignInsights => {
                "Get performance insights at campaign level. Use either since/until \
                 (YYYY-MM-DD) or datePreset (defaults to last_7d). Returns per-record metrics \
                 plus calculated CPC, CTR and CPM for the first record."
            }
            Self::GetAdSetInsights => {
                "Get performance insights at ad set level. Use either since/until \
                 (YYYY-MM-DD) or datePreset (defaults to last_7d)."
            }
            Self::GetAdInsights => {
                "Get performance insights at ad level. Use either since/until \
                 (YYYY-MM-DD) or datePreset (defaults to last_7d)."
            }
            Self::ListBusinesses => "List Business Manager accounts the access token can see.",
            Self::GetBusinessAdAccounts => "List ad accounts owned by a business.",
            Self::GetBusinessPages => "List Facebook Pages owned by a business.",
            Self::ListBusinessCatalogs => "List product catalogs owned by a business.",
            Self::AdsManagementOverview => {
                "Describe the tools available for managing Facebook ads with this server."
            }
        }
    }

    /// JSON Schema describing the tool's arguments.
    #[must_use]
    pub fn input_schema(self) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": self.properties(),
        });
        let required = self.required_fields();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// The `tools/list` entry for this tool.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn properties(self) -> Value {
        match self {
            Self::ListCampaigns => json!({
                "status": {
                    "type": "string",
                    "enum": ["ACTIVE", "PAUSED", "ARCHIVED", "DELETED", "IN_PROCESS", "WITH_ISSUES"],
                    "description": "Effective status to filter by (default: ACTIVE)"
                },
                "limit": limit_property(),
            }),
            Self::GetCampaignDetails | Self::DeleteCampaign => json!({
                "campaignId": { "type": "string", "description": "Campaign ID" },
            }),
            Self::CreateCampaign => json!({
                "name": { "type": "string", "description": "Campaign name" },
                "objective": {
                    "type": "string",
                    "enum": [
                        "OUTCOME_LEADS", "OUTCOME_SALES", "OUTCOME_ENGAGEMENT",
                        "OUTCOME_AWARENESS", "OUTCOME_TRAFFIC", "OUTCOME_APP_PROMOTION"
                    ],
                    "description": "Campaign objective"
                },
                "status": status_property("Initial status (default: PAUSED)"),
                "dailyBudget": money_property("Daily budget in account currency units, e.g. 10.50"),
                "lifetimeBudget": money_property("Lifetime budget in account currency units"),
                "startTime": time_property("Start time"),
                "endTime": time_property("End time"),
                "special_ad_categories": special_categories_property(),
            }),
            Self::UpdateCampaign => json!({
                "campaignId": { "type": "string", "description": "Campaign ID to update" },
                "name": { "type": "string", "description": "New campaign name" },
                "objective": { "type": "string", "description": "New objective" },
                "status": status_property("New status"),
                "dailyBudget": money_property("New daily budget in account currency units"),
                "lifetimeBudget": money_property("New lifetime budget in account currency units"),
                "endTime": time_property("New end time"),
                "special_ad_categories": special_categories_property(),
            }),
            Self::ListAdSets => json!({
                "campaignId": { "type": "string", "description": "Optional: campaign to list ad sets for" },
                "status": { "type": "string", "description": "Effective status to filter by (default: ACTIVE)" },
                "limit": limit_property(),
            }),
            Self::CreateAdSet => json!({
                "campaignId": { "type": "string", "description": "Campaign the ad set belongs to" },
                "name": { "type": "string", "description": "Ad set name" },
                "status": status_property("Initial status (default: PAUSED)"),
                "billingEvent": {
                    "type": "string",
                    "description": "Billing event, e.g. IMPRESSIONS or LINK_CLICKS"
                },
                "optimizationGoal": {
                    "type": "string",
                    "description": "Optimization goal, e.g. REACH or LINK_CLICKS"
                },
                "targeting": {
                    "type": "object",
                    "description": "Targeting spec, e.g. {\"geo_locations\":{\"countries\":[\"US\"]}}"
                },
                "dailyBudget": money_property("Daily budget in account currency units (set this or lifetimeBudget)"),
                "lifetimeBudget": money_property("Lifetime budget in account currency units (set this or dailyBudget)"),
                "bidAmount": money_property("Optional bid cap in account currency units"),
                "startTime": time_property("Start time"),
                "endTime": time_property("End time (required by the API with lifetimeBudget)"),
            }),
            Self::UpdateAdSet => json!({
                "adSetId": { "type": "string", "description": "Ad set ID to update" },
                "name": { "type": "string", "description": "New name" },
                "status": status_property("New status"),
                "billingEvent": { "type": "string", "description": "New billing event" },
                "optimizationGoal": { "type": "string", "description": "New optimization goal" },
                "targeting": { "type": "object", "description": "Replacement targeting spec" },
                "dailyBudget": money_property("New daily budget in account currency units"),
                "lifetimeBudget": money_property("New lifetime budget in account currency units"),
                "bidAmount": money_property("New bid cap in account currency units"),
                "startTime": time_property("New start time"),
                "endTime": time_property("New end time"),
            }),
            Self::DeleteAdSet => json!({
                "adSetId": { "type": "string", "description": "Ad set ID" },
            }),
            Self::ListAds => json!({
                "adSetId": { "type": "string", "description": "Optional: ad set to list ads for" },
                "status": { "type": "string", "description": "Effective status to filter by (default: ACTIVE)" },
                "limit": limit_property(),
            }),
            Self::CreateAd => json!({
                "adSetId": { "type": "string", "description": "Ad set ID" },
                "name": { "type": "string", "description": "Ad name" },
                "status": status_property("Initial status (default: PAUSED)"),
                "creativeId": { "type": "string", "description": "Ad creative ID" },
            }),
            Self::UpdateAd => json!({
                "adId": { "type": "string", "description": "Ad ID to update" },
                "name": { "type": "string", "description": "New name" },
                "status": status_property("New status"),
                "creativeId": { "type": "string", "description": "New ad creative ID" },
            }),
            Self::DeleteAd => json!({
                "adId": { "type": "string", "description": "Ad ID" },
            }),
            Self::ListAdCreatives | Self::ListCustomAudiences => json!({
                "limit": limit_property(),
            }),
            Self::CreateAdCreative => json!({
                "name": { "type": "string", "description": "Creative name" },
                "object_story_spec": {
                    "type": "object",
                    "description": "Object story spec",
                    "properties": {
                        "page_id": { "type": "string", "description": "Facebook Page ID" },
                        "link_data": {
                            "type": "object",
                            "properties": {
                                "link": { "type": "string", "description": "Destination URL" },
                                "message": { "type": "string", "description": "Primary text" },
                                "image_hash": { "type": "string", "description": "Hash from upload_ad_media" }
                            }
                        }
                    },
                    "required": ["page_id"]
                },
            }),
            Self::UploadAdMedia => json!({
                "filePath": { "type": "string", "description": "Path to a local jpg, jpeg, png or gif file" },
            }),
            Self::CreateCustomAudience => json!({
                "name": { "type": "string", "description": "Audience name" },
                "subtype": {
                    "type": "string",
                    "enum": ["CUSTOM", "WEBSITE", "ENGAGEMENT"],
                    "description": "Audience subtype"
                },
                "description": { "type": "string", "description": "Description (required for CUSTOM)" },
                "customer_file_source": {
                    "type": "string",
                    "enum": ["USER_PROVIDED_ONLY", "PARTNER_PROVIDED_ONLY", "BOTH_USER_AND_PARTNER_PROVIDED"],
                    "description": "Customer data origin (required for CUSTOM)"
                },
                "rule": { "type": "object", "description": "Audience rule (required for WEBSITE and ENGAGEMENT)" },
            }),
            Self::CreateLookalikeAudience => json!({
                "name": { "type": "string", "description": "Lookalike audience name" },
                "sourceAudienceId": { "type": "string", "description": "Existing custom audience to model" },
                "country": { "type": "string", "description": "ISO 3166-1 alpha-2 country code, e.g. US" },
                "ratio": {
                    "type": "number",
                    "minimum": 0.01,
                    "maximum": 0.2,
                    "description": "Audience size as a fraction of the country population (default: 0.01)"
                },
                "description": { "type": "string", "description": "Optional description" },
            }),
            Self::AddUsersToCustomAudience => json!({
                "audienceId": { "type": "string", "description": "Custom audience ID" },
                "schema": {
                    "description": "Key type(s), e.g. EMAIL_SHA256 or [\"EMAIL_SHA256\", \"PHONE_SHA256\"]",
                    "oneOf": [
                        { "type": "string" },
                        { "type": "array", "items": { "type": "string" } }
                    ]
                },
                "users": {
                    "type": "array",
                    "maxItems": 10000,
                    "description": "Hashed user records matching the schema"
                },
            }),
            Self::DeleteCustomAudience => json!({
                "audienceId": { "type": "string", "description": "Custom audience ID" },
            }),
            Self::GetCampaignInsights => insights_properties("Campaign IDs to include"),
            Self::GetAdSetInsights => insights_properties("Ad set IDs to include"),
            Self::GetAdInsights => insights_properties("Ad IDs to include"),
            Self::GetBusinessAdAccounts | Self::GetBusinessPages | Self::ListBusinessCatalogs => {
                json!({
                    "businessId": { "type": "string", "description": "Business Manager ID" },
                })
            }
            Self::ListBusinesses | Self::AdsManagementOverview => json!({}),
        }
    }
}

/// Returns the `tools/list` entries for every registered tool.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    Tool::ALL.into_iter().map(Tool::definition).collect()
}

fn limit_property() -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": "Maximum number of results (default: 100)"
    })
}

fn status_property(description: &str) -> Value {
    json!({
        "type": "string",
        "enum": ["ACTIVE", "PAUSED", "ARCHIVED"],
        "description": description
    })
}

fn money_property(description: &str) -> Value {
    json!({
        "type": ["number", "string"],
        "description": description
    })
}

fn time_property(description: &str) -> Value {
    json!({
        "type": "string",
        "format": "date-time",
        "description": format!("{description} (ISO 8601 with offset, e.g. 2026-01-01T00:00:00+0000)")
    })
}

fn special_categories_property() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "string",
            "enum": ["NONE", "EMPLOYMENT", "HOUSING", "CREDIT", "ISSUES_ELECTIONS_POLITICS", "ONLINE_GAMBLING_AND_GAMING"]
        },
        "minItems": 1,
        "description": "Special ad categories (default: none)"
    })
}

fn insights_properties(ids_description: &str) -> Value {
    json!({
        "ids": {
            "type": "array",
            "items": { "type": "string" },
            "description": format!("Optional: {ids_description}")
        },
        "since": { "type": "string", "description": "Start date (YYYY-MM-DD); requires until" },
        "until": { "type": "string", "description": "End date (YYYY-MM-DD); requires since" },
        "datePreset": {
            "type": "string",
            "description": "Preset range such as today, yesterday, last_7d, last_30d, this_month (default: last_7d)"
        },
        "metrics": {
            "description": "Metrics to fetch, as an array or a comma-separated string",
            "oneOf": [
                { "type": "array", "items": { "type": "string" } },
                { "type": "string" }
            ]
        },
    })
}
