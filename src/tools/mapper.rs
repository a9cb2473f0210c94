//! Parameter mapping.
//!
//! Turns a validated [`ToolRequest`] into the Graph [`Operation`] that serves
//! it: which node and edge to address, and the snake_case parameters to send.
//! Money goes out in minor units; optional arguments the caller left out are
//! omitted rather than sent as `null`.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use super::money::Amount;
use super::normalize::EntityKind;
use super::request::{
    AddUsersArgs, BusinessAsset, CreateAdSetArgs, CreateCampaignArgs, CreateLookalikeArgs,
    InsightsArgs, InsightsLevel, ToolRequest, UpdateAdSetArgs, UpdateCampaignArgs,
};
use crate::graph::{Edge, ExternalParams};

/// Status given to newly created campaigns, ad sets and ads.
pub const DEFAULT_CREATE_STATUS: &str = "PAUSED";

/// Effective status listed when the caller names none.
pub const DEFAULT_LIST_STATUS: &str = "ACTIVE";

/// Page size for entity listings.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Page size for insights queries.
pub const INSIGHTS_LIMIT: i64 = 500;

/// Date preset used when neither a preset nor a range is given.
pub const DEFAULT_DATE_PRESET: &str = "last_7d";

/// Default lookalike audience size as a fraction of the country population.
pub const DEFAULT_LOOKALIKE_RATIO: f64 = 0.01;

/// A Graph API call plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// POST `/{parent}/{edge}`.
    Create {
        parent: String,
        edge: Edge,
        params: ExternalParams,
        entity: EntityKind,
    },
    /// GET `/{parent}/{edge}`.
    List {
        parent: String,
        edge: Edge,
        params: ExternalParams,
        entity: EntityKind,
    },
    /// GET `/{parent}/insights`.
    Insights {
        parent: String,
        level: InsightsLevel,
        fields: Vec<String>,
        params: ExternalParams,
    },
    /// GET `/{id}`.
    Read { id: String, entity: EntityKind },
    /// POST `/{id}`, then re-read.
    Update {
        id: String,
        params: ExternalParams,
        entity: EntityKind,
    },
    /// DELETE `/{id}`.
    Delete { id: String },
    /// POST `/{audience_id}/users`.
    AddUsers {
        audience_id: String,
        params: ExternalParams,
    },
    /// Read a local image, then POST `/{parent}/adimages`.
    UploadImage { parent: String, path: PathBuf },
    /// Static help text, no API call.
    Overview,
}

/// Small builder over [`ExternalParams`] that skips absent values.
#[derive(Default)]
struct Params(ExternalParams);

impl Params {
    fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    fn money(&mut self, key: &str, amount: Option<Amount>) -> &mut Self {
        self.opt(key, amount.map(Amount::minor))
    }

    fn finish(&mut self) -> ExternalParams {
        std::mem::take(&mut self.0)
    }
}

/// Maps a validated request onto its Graph operation.
///
/// `account_id` is the `act_`-prefixed ad account that account-scoped
/// operations run against.
#[must_use]
pub fn map(request: &ToolRequest, account_id: &str) -> Operation {
    let account = account_id.to_string();

    match request {
        ToolRequest::ListCampaigns(args) => Operation::List {
            parent: account,
            edge: Edge::Campaigns,
            params: list_params(args.status.as_deref(), args.limit),
            entity: EntityKind::Campaign,
        },
        ToolRequest::GetCampaignDetails(args) => Operation::Read {
            id: args.campaign_id.clone(),
            entity: EntityKind::Campaign,
        },
        ToolRequest::CreateCampaign(args) => Operation::Create {
            parent: account,
            edge: Edge::Campaigns,
            params: create_campaign_params(args),
            entity: EntityKind::Campaign,
        },
        ToolRequest::UpdateCampaign(args) => Operation::Update {
            id: args.campaign_id.clone(),
            params: update_campaign_params(args),
            entity: EntityKind::Campaign,
        },
        ToolRequest::DeleteCampaign(args) => Operation::Delete {
            id: args.campaign_id.clone(),
        },

        ToolRequest::ListAdSets(args) => Operation::List {
            parent: parent_or(args.campaign_id.as_deref(), account),
            edge: Edge::AdSets,
            params: list_params(args.status.as_deref(), args.limit),
            entity: EntityKind::AdSet,
        },
        ToolRequest::CreateAdSet(args) => Operation::Create {
            parent: account,
            edge: Edge::AdSets,
            params: create_ad_set_params(args),
            entity: EntityKind::AdSet,
        },
        ToolRequest::UpdateAdSet(args) => Operation::Update {
            id: args.ad_set_id.clone(),
            params: update_ad_set_params(args),
            entity: EntityKind::AdSet,
        },
        ToolRequest::DeleteAdSet(args) => Operation::Delete {
            id: args.ad_set_id.clone(),
        },

        ToolRequest::ListAds(args) => Operation::List {
            parent: parent_or(args.ad_set_id.as_deref(), account),
            edge: Edge::Ads,
            params: list_params(args.status.as_deref(), args.limit),
            entity: EntityKind::Ad,
        },
        ToolRequest::CreateAd(args) => Operation::Create {
            parent: account,
            edge: Edge::Ads,
            params: Params::default()
                .set("name", args.name.as_str())
                .set("adset_id", args.ad_set_id.as_str())
                .set("creative", json!({ "creative_id": args.creative_id }))
                .set("status", status_or_default(args.status.as_deref()))
                .finish(),
            entity: EntityKind::Ad,
        },
        ToolRequest::UpdateAd(args) => Operation::Update {
            id: args.ad_id.clone(),
            params: Params::default()
                .opt("name", args.name.as_deref())
                .opt("status", args.status.as_deref())
                .opt(
                    "creative",
                    args.creative_id
                        .as_ref()
                        .map(|id| json!({ "creative_id": id })),
                )
                .finish(),
            entity: EntityKind::Ad,
        },
        ToolRequest::DeleteAd(args) => Operation::Delete {
            id: args.ad_id.clone(),
        },

        ToolRequest::ListAdCreatives(args) => Operation::List {
            parent: account,
            edge: Edge::AdCreatives,
            params: limit_params(args.limit),
            entity: EntityKind::Creative,
        },
        ToolRequest::CreateAdCreative(args) => Operation::Create {
            parent: account,
            edge: Edge::AdCreatives,
            params: Params::default()
                .set("name", args.name.as_str())
                .set("object_story_spec", Value::Object(args.object_story_spec.clone()))
                .finish(),
            entity: EntityKind::Creative,
        },
        ToolRequest::UploadAdMedia(args) => Operation::UploadImage {
            parent: account,
            path: args.file_path.clone(),
        },

        ToolRequest::ListCustomAudiences(args) => Operation::List {
            parent: account,
            edge: Edge::CustomAudiences,
            params: limit_params(args.limit),
            entity: EntityKind::Audience,
        },
        ToolRequest::CreateCustomAudience(args) => Operation::Create {
            parent: account,
            edge: Edge::CustomAudiences,
            params: Params::default()
                .set("name", args.name.as_str())
                .set("subtype", args.subtype.as_str())
                .opt("description", args.description.as_deref())
                .opt("customer_file_source", args.customer_file_source.as_deref())
                .opt("rule", args.rule.clone())
                .finish(),
            entity: EntityKind::Audience,
        },
        ToolRequest::CreateLookalikeAudience(args) => Operation::Create {
            parent: account,
            edge: Edge::CustomAudiences,
            params: lookalike_params(args),
            entity: EntityKind::Audience,
        },
        ToolRequest::AddUsersToCustomAudience(args) => Operation::AddUsers {
            audience_id: args.audience_id.clone(),
            params: add_users_params(args),
        },
        ToolRequest::DeleteCustomAudience(args) => Operation::Delete {
            id: args.audience_id.clone(),
        },

        ToolRequest::GetInsights(level, args) => insights(account, *level, args),

        ToolRequest::ListBusinesses => Operation::List {
            parent: "me".to_string(),
            edge: Edge::Businesses,
            params: limit_params(None),
            entity: EntityKind::Business,
        },
        ToolRequest::ListBusinessAssets(asset, args) => Operation::List {
            parent: args.business_id.clone(),
            edge: asset.edge(),
            params: limit_params(None),
            entity: match asset {
                BusinessAsset::AdAccounts => EntityKind::AdAccount,
                BusinessAsset::Pages => EntityKind::Page,
                BusinessAsset::Catalogs => EntityKind::Catalog,
            },
        },

        ToolRequest::Overview => Operation::Overview,
    }
}

/// An optional parent filter; blank ids fall back to the ad account.
fn parent_or(id: Option<&str>, account: String) -> String {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or(account, ToString::to_string)
}

fn status_or_default(status: Option<&str>) -> &str {
    status.unwrap_or(DEFAULT_CREATE_STATUS)
}

fn limit_params(limit: Option<i64>) -> ExternalParams {
    Params::default()
        .set("limit", limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .finish()
}

fn list_params(status: Option<&str>, limit: Option<i64>) -> ExternalParams {
    let status = status.unwrap_or(DEFAULT_LIST_STATUS);
    Params::default()
        .set("effective_status", json!([status]))
        .set("limit", limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .finish()
}

fn create_campaign_params(args: &CreateCampaignArgs) -> ExternalParams {
    let categories = args.special_ad_categories.clone().unwrap_or_default();
    Params::default()
        .set("name", args.name.as_str())
        .set("objective", args.objective.as_str())
        .set("status", status_or_default(args.status.as_deref()))
        .set("special_ad_categories", categories)
        .money("daily_budget", args.daily_budget)
        .money("lifetime_budget", args.lifetime_budget)
        .opt("start_time", args.start_time.as_deref())
        .opt("end_time", args.end_time.as_deref())
        .finish()
}

fn update_campaign_params(args: &UpdateCampaignArgs) -> ExternalParams {
    Params::default()
        .opt("name", args.name.as_deref())
        .opt("objective", args.objective.as_deref())
        .opt("status", args.status.as_deref())
        .money("daily_budget", args.daily_budget)
        .money("lifetime_budget", args.lifetime_budget)
        .opt("end_time", args.end_time.as_deref())
        .opt("special_ad_categories", args.special_ad_categories.clone())
        .finish()
}

fn create_ad_set_params(args: &CreateAdSetArgs) -> ExternalParams {
    Params::default()
        .set("campaign_id", args.campaign_id.as_str())
        .set("name", args.name.as_str())
        .set("status", status_or_default(args.status.as_deref()))
        .set("billing_event", args.billing_event.as_str())
        .set("optimization_goal", args.optimization_goal.as_str())
        .set("targeting", Value::Object(args.targeting.clone()))
        .money("daily_budget", args.daily_budget)
        .money("lifetime_budget", args.lifetime_budget)
        .money("bid_amount", args.bid_amount)
        .opt("start_time", args.start_time.as_deref())
        .opt("end_time", args.end_time.as_deref())
        .finish()
}

fn update_ad_set_params(args: &UpdateAdSetArgs) -> ExternalParams {
    Params::default()
        .opt("name", args.name.as_deref())
        .opt("status", args.status.as_deref())
        .opt("billing_event", args.billing_event.as_deref())
        .opt("optimization_goal", args.optimization_goal.as_deref())
        .opt("targeting", args.targeting.clone().map(Value::Object))
        .money("daily_budget", args.daily_budget)
        .money("lifetime_budget", args.lifetime_budget)
        .money("bid_amount", args.bid_amount)
        .opt("start_time", args.start_time.as_deref())
        .opt("end_time", args.end_time.as_deref())
        .finish()
}

fn lookalike_params(args: &CreateLookalikeArgs) -> ExternalParams {
    let spec = json!({
        "country": args.country.trim().to_ascii_uppercase(),
        "ratio": args.ratio.unwrap_or(DEFAULT_LOOKALIKE_RATIO),
    });
    Params::default()
        .set("name", args.name.as_str())
        .set("subtype", "LOOKALIKE")
        .set("origin_audience_id", args.source_audience_id.as_str())
        .set("lookalike_spec", spec)
        .opt("description", args.description.as_deref())
        .finish()
}

fn add_users_params(args: &AddUsersArgs) -> ExternalParams {
    Params::default()
        .set(
            "payload",
            json!({ "schema": args.schema.to_value(), "data": args.users }),
        )
        .finish()
}

fn insights(parent: String, level: InsightsLevel, args: &InsightsArgs) -> Operation {
    let fields = args.metrics.as_ref().map_or_else(
        || {
            level
                .default_metrics()
                .iter()
                .map(|m| (*m).to_string())
                .collect()
        },
        |metrics| metrics.as_slice().to_vec(),
    );

    let mut params = Params::default();
    params.set("level", level.as_str());
    match (&args.since, &args.until) {
        (Some(since), Some(until)) => {
            params.set("time_range", json!({ "since": since, "until": until }));
        }
        _ => {
            params.set(
                "date_preset",
                args.date_preset.as_deref().unwrap_or(DEFAULT_DATE_PRESET),
            );
        }
    }
    if let Some(ids) = args.ids.as_ref().filter(|ids| !ids.is_empty()) {
        params.set(
            "filtering",
            json!([{ "field": format!("{}.id", level.as_str()), "operator": "IN", "value": ids }]),
        );
    }
    params.set("limit", INSIGHTS_LIMIT);

    Operation::Insights {
        parent,
        level,
        fields,
        params: params.finish(),
    }
}

/// Builds the `adimages` upload parameters for an image's bytes.
#[must_use]
pub fn image_upload_params(name: &str, bytes: &[u8]) -> ExternalParams {
    Params::default()
        .set("bytes", BASE64.encode(bytes))
        .set("name", name)
        .finish()
}

/// The file name an upload is registered under.
#[must_use]
pub fn upload_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::Tool;

    fn map_tool(tool: Tool, arguments: Value) -> Operation {
        let request = ToolRequest::parse(tool, arguments).unwrap();
        map(&request, "act_42")
    }

    #[test]
    fn create_campaign_converts_money_and_defaults() {
        let op = map_tool(
            Tool::CreateCampaign,
            json!({"name": "X", "objective": "OUTCOME_TRAFFIC", "dailyBudget": 19.99,
                   "startTime": "2026-01-01T00:00:00Z"}),
        );
        let Operation::Create { parent, edge, params, .. } = op else {
            panic!("expected create");
        };
        assert_eq!(parent, "act_42");
        assert_eq!(edge, Edge::Campaigns);
        assert_eq!(params["daily_budget"], json!(1999));
        assert_eq!(params["status"], "PAUSED");
        assert_eq!(params["special_ad_categories"], json!([]));
        assert_eq!(params["start_time"], "2026-01-01T00:00:00Z");
        assert!(!params.contains_key("lifetime_budget"));
        assert!(!params.contains_key("end_time"));
    }

    #[test]
    fn blank_list_parents_fall_back_to_the_account() {
        for (tool, key) in [(Tool::ListAdSets, "campaignId"), (Tool::ListAds, "adSetId")] {
            let Operation::List { parent, .. } = map_tool(tool, json!({ key: "  " })) else {
                panic!("expected list");
            };
            assert_eq!(parent, "act_42");
            let Operation::List { parent, .. } = map_tool(tool, json!({ key: "777" })) else {
                panic!("expected list");
            };
            assert_eq!(parent, "777");
        }
    }

    #[test]
    fn update_omits_absent_fields() {
        let op = map_tool(
            Tool::UpdateAdSet,
            json!({"adSetId": "5", "lifetimeBudget": "250"}),
        );
        let Operation::Update { id, params, .. } = op else {
            panic!("expected update");
        };
        assert_eq!(id, "5");
        assert_eq!(params.len(), 1);
        assert_eq!(params["lifetime_budget"], json!(25_000));
    }

    #[test]
    fn list_defaults_status_and_limit() {
        let op = map_tool(Tool::ListAdSets, json!({"campaignId": "9"}));
        let Operation::List { parent, params, .. } = op else {
            panic!("expected list");
        };
        assert_eq!(parent, "9");
        assert_eq!(params["effective_status"], json!(["ACTIVE"]));
        assert_eq!(params["limit"], json!(DEFAULT_LIST_LIMIT));

        let op = map_tool(Tool::ListAds, json!({"status": "PAUSED", "limit": 5}));
        let Operation::List { parent, params, .. } = op else {
            panic!("expected list");
        };
        assert_eq!(parent, "act_42");
        assert_eq!(params["effective_status"], json!(["PAUSED"]));
        assert_eq!(params["limit"], json!(5));
    }

    #[test]
    fn insights_filtering_and_ranges() {
        let op = map_tool(
            Tool::GetAdSetInsights,
            json!({"ids": ["1", "2"], "since": "2026-01-01", "until": "2026-01-31",
                   "metrics": "spend,clicks"}),
        );
        let Operation::Insights { level, fields, params, .. } = op else {
            panic!("expected insights");
        };
        assert_eq!(level, InsightsLevel::AdSet);
        assert_eq!(fields, ["spend", "clicks"]);
        assert_eq!(params["level"], "adset");
        assert_eq!(params["time_range"], json!({"since": "2026-01-01", "until": "2026-01-31"}));
        assert!(!params.contains_key("date_preset"));
        assert_eq!(
            params["filtering"],
            json!([{"field": "adset.id", "operator": "IN", "value": ["1", "2"]}])
        );
        assert_eq!(params["limit"], json!(INSIGHTS_LIMIT));
    }

    #[test]
    fn insights_default_preset_and_metrics() {
        let op = map_tool(Tool::GetCampaignInsights, json!({}));
        let Operation::Insights { fields, params, .. } = op else {
            panic!("expected insights");
        };
        assert_eq!(params["date_preset"], "last_7d");
        assert!(fields.contains(&"spend".to_string()));
        assert!(!params.contains_key("filtering"));
    }

    #[test]
    fn create_ad_wraps_creative() {
        let op = map_tool(
            Tool::CreateAd,
            json!({"adSetId": "3", "name": "Ad", "creativeId": "77", "status": "ACTIVE"}),
        );
        let Operation::Create { params, .. } = op else {
            panic!("expected create");
        };
        assert_eq!(params["creative"], json!({"creative_id": "77"}));
        assert_eq!(params["adset_id"], "3");
        assert_eq!(params["status"], "ACTIVE");
    }

    #[test]
    fn lookalike_spec_and_subtype() {
        let op = map_tool(
            Tool::CreateLookalikeAudience,
            json!({"name": "L", "sourceAudienceId": "11", "country": "cz"}),
        );
        let Operation::Create { params, .. } = op else {
            panic!("expected create");
        };
        assert_eq!(params["subtype"], "LOOKALIKE");
        assert_eq!(params["origin_audience_id"], "11");
        assert_eq!(params["lookalike_spec"], json!({"country": "CZ", "ratio": 0.01}));
    }

    #[test]
    fn add_users_payload() {
        let op = map_tool(
            Tool::AddUsersToCustomAudience,
            json!({"audienceId": "8", "schema": "EMAIL_SHA256", "users": [["h1"], ["h2"]]}),
        );
        let Operation::AddUsers { audience_id, params } = op else {
            panic!("expected add users");
        };
        assert_eq!(audience_id, "8");
        assert_eq!(
            params["payload"],
            json!({"schema": "EMAIL_SHA256", "data": [["h1"], ["h2"]]})
        );
    }

    #[test]
    fn business_listings_address_the_business() {
        let op = map_tool(Tool::ListBusinessCatalogs, json!({"businessId": "b1"}));
        assert!(matches!(
            op,
            Operation::List { ref parent, edge: Edge::OwnedProductCatalogs, entity: EntityKind::Catalog, .. }
                if parent == "b1"
        ));
        let op = map_tool(Tool::ListBusinesses, json!({}));
        assert!(matches!(op, Operation::List { ref parent, edge: Edge::Businesses, .. } if parent == "me"));
    }

    #[test]
    fn image_params_are_base64() {
        let params = image_upload_params("a.png", b"hello");
        assert_eq!(params["bytes"], "aGVsbG8=");
        assert_eq!(params["name"], "a.png");
        assert_eq!(upload_name(Path::new("/tmp/x/a.png")), "a.png");
    }
}
