//! Response normalization.
//!
//! Graph responses differ by entity and endpoint. The normalizer projects each
//! entity onto a fixed field table, converts money back to major units and
//! writes `null` for anything the API left out, so every tool returns the same
//! keys whatever the API chose to send.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::error::{ToolError, ToolResult};
use super::money::{from_minor_units, round2};
use super::request::InsightsLevel;
use crate::graph::ExternalParams;

/// How a field's value is carried across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// Passed through verbatim.
    Plain,
    /// Minor units from the API, major units to the caller.
    Money,
}

/// One row of an entity field table.
#[derive(Debug, Clone, Copy)]
struct Field {
    graph: &'static str,
    caller: &'static str,
    kind: FieldKind,
}

const fn plain(graph: &'static str, caller: &'static str) -> Field {
    Field {
        graph,
        caller,
        kind: FieldKind::Plain,
    }
}

const fn money(graph: &'static str, caller: &'static str) -> Field {
    Field {
        graph,
        caller,
        kind: FieldKind::Money,
    }
}

const CAMPAIGN_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("objective", "objective"),
    plain("status", "status"),
    plain("effective_status", "effectiveStatus"),
    plain("buying_type", "buyingType"),
    money("daily_budget", "dailyBudget"),
    money("lifetime_budget", "lifetimeBudget"),
    money("spend_cap", "spendCap"),
    money("budget_remaining", "budgetRemaining"),
    plain("start_time", "startTime"),
    plain("stop_time", "stopTime"),
    plain("created_time", "createdTime"),
    plain("special_ad_categories", "specialAdCategories"),
];

const AD_SET_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("status", "status"),
    plain("effective_status", "effectiveStatus"),
    plain("campaign_id", "campaignId"),
    money("daily_budget", "dailyBudget"),
    money("lifetime_budget", "lifetimeBudget"),
    money("budget_remaining", "budgetRemaining"),
    money("bid_amount", "bidAmount"),
    plain("billing_event", "billingEvent"),
    plain("optimization_goal", "optimizationGoal"),
    plain("targeting", "targeting"),
    plain("start_time", "startTime"),
    plain("end_time", "endTime"),
];

const AD_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("status", "status"),
    plain("effective_status", "effectiveStatus"),
    plain("adset_id", "adSetId"),
    plain("campaign_id", "campaignId"),
    plain("creative", "creative"),
    plain("created_time", "createdTime"),
];

const CREATIVE_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("status", "status"),
    plain("object_story_spec", "objectStorySpec"),
    plain("thumbnail_url", "thumbnailUrl"),
];

const AUDIENCE_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("subtype", "subtype"),
    plain("description", "description"),
    plain("approximate_count_lower_bound", "approximateCountLowerBound"),
    plain("approximate_count_upper_bound", "approximateCountUpperBound"),
    plain("delivery_status", "deliveryStatus"),
    plain("operation_status", "operationStatus"),
];

const AD_ACCOUNT_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("account_status", "accountStatus"),
    plain("currency", "currency"),
];

const PAGE_FIELDS: &[Field] = &[
    plain("id", "id"),
    plain("name", "name"),
    plain("category", "category"),
];

const NAMED_FIELDS: &[Field] = &[plain("id", "id"), plain("name", "name")];

/// The kinds of Graph object the tools return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Campaign,
    AdSet,
    Ad,
    Creative,
    Audience,
    AdAccount,
    Page,
    Business,
    Catalog,
}

impl EntityKind {
    const fn table(self) -> &'static [Field] {
        match self {
            Self::Campaign => CAMPAIGN_FIELDS,
            Self::AdSet => AD_SET_FIELDS,
            Self::Ad => AD_FIELDS,
            Self::Creative => CREATIVE_FIELDS,
            Self::Audience => AUDIENCE_FIELDS,
            Self::AdAccount => AD_ACCOUNT_FIELDS,
            Self::Page => PAGE_FIELDS,
            Self::Business | Self::Catalog => NAMED_FIELDS,
        }
    }

    /// Graph field names to request when reading or listing this entity.
    #[must_use]
    pub fn graph_fields(self) -> Vec<&'static str> {
        self.table().iter().map(|f| f.graph).collect()
    }

    /// Singular noun used in messages.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::AdSet => "ad set",
            Self::Ad => "ad",
            Self::Creative => "ad creative",
            Self::Audience => "custom audience",
            Self::AdAccount => "ad account",
            Self::Page => "page",
            Self::Business => "business",
            Self::Catalog => "product catalog",
        }
    }

    /// Plural noun used in messages.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Campaign => "campaigns",
            Self::AdSet => "ad sets",
            Self::Ad => "ads",
            Self::Creative => "ad creatives",
            Self::Audience => "custom audiences",
            Self::AdAccount => "ad accounts",
            Self::Page => "pages",
            Self::Business => "businesses",
            Self::Catalog => "product catalogs",
        }
    }
}

/// The uniform result of a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    /// Always `true` for an envelope produced by the dispatcher.
    pub success: bool,
    /// Normalized payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// A successful envelope with data and a message.
    #[must_use]
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// A successful envelope carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Pretty-printed JSON text for a content block.
    #[must_use]
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Projects one Graph object onto `kind`'s field table.
#[must_use]
pub fn entity(kind: EntityKind, raw: &Value) -> Value {
    let mut out = Map::new();
    for field in kind.table() {
        let value = raw.get(field.graph).map_or(Value::Null, |v| match field.kind {
            FieldKind::Plain => v.clone(),
            FieldKind::Money => from_minor_units(v).map_or(Value::Null, |major| json!(major)),
        });
        out.insert(field.caller.to_string(), value);
    }
    Value::Object(out)
}

/// Extracts the record array of a list response.
///
/// Accepts `{"data": [...]}` or a bare array.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] for any other shape.
pub fn records<'a>(tool: &str, what: &str, raw: &'a Value) -> ToolResult<&'a Vec<Value>> {
    raw.get("data")
        .unwrap_or(raw)
        .as_array()
        .ok_or_else(|| {
            ToolError::internal(
                tool,
                format!("Invalid response received from Facebook API (expected an array for {what})"),
            )
        })
}

/// Normalizes a list response, preserving order.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] if the response carries no array.
pub fn list(tool: &str, kind: EntityKind, raw: &Value) -> ToolResult<Value> {
    let items = records(tool, kind.plural(), raw)?;
    Ok(Value::Array(
        items.iter().map(|item| entity(kind, item)).collect(),
    ))
}

/// Normalizes a create: the submitted parameters overlaid with what the API
/// returned (usually just the new `id`).
#[must_use]
pub fn created(kind: EntityKind, submitted: &ExternalParams, returned: &Value) -> Value {
    let mut merged: Map<String, Value> = submitted
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if let Some(returned) = returned.as_object() {
        merged.extend(returned.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    entity(kind, &Value::Object(merged))
}

/// Result of a delete.
#[must_use]
pub fn deleted(id: &str) -> Value {
    json!({ "id": id, "deleted": true })
}

/// Result of an image upload.
///
/// The `adimages` edge answers `{"images": {"<name>": {"hash", "url", ...}}}`.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] if no image hash is present.
pub fn image_upload(tool: &str, name: &str, raw: &Value) -> ToolResult<Value> {
    let image = raw
        .get("images")
        .and_then(Value::as_object)
        .and_then(|images| images.get(name).or_else(|| images.values().next()))
        .filter(|image| image.get("hash").is_some())
        .ok_or_else(|| {
            ToolError::internal(
                tool,
                "Invalid response received from Facebook API (no image hash in upload result)",
            )
        })?;

    Ok(json!({
        "name": name,
        "imageHash": image.get("hash").cloned().unwrap_or(Value::Null),
        "url": image.get("url").cloned().unwrap_or(Value::Null),
    }))
}

/// Result of adding users to an audience.
#[must_use]
pub fn audience_users(audience_id: &str, raw: &Value) -> Value {
    json!({
        "audienceId": audience_id,
        "sessionId": raw.get("session_id").cloned().unwrap_or(Value::Null),
        "numReceived": raw.get("num_received").cloned().unwrap_or(Value::Null),
        "numInvalidEntries": raw.get("num_invalid_entries").cloned().unwrap_or(Value::Null),
    })
}

/// Normalizes an insights response.
///
/// Records are kept verbatim and in order. Derived metrics come from the
/// first record and are only present when their denominators are non-zero.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] if the response carries no array.
pub fn insights(tool: &str, level: InsightsLevel, raw: &Value) -> ToolResult<Value> {
    let what = format!("{} insights", level.as_str());
    let items = records(tool, &what, raw)?;

    let mut out = Map::new();
    out.insert("level".to_string(), json!(level.as_str()));
    out.insert("records".to_string(), Value::Array(items.clone()));
    if let Some(first) = items.first() {
        out.extend(derived_metrics(first));
    }
    Ok(Value::Object(out))
}

/// Computes `calculated_cpc`, `calculated_ctr` and `calculated_cpm`.
#[must_use]
pub fn derived_metrics(record: &Value) -> Map<String, Value> {
    let metric = |name: &str| -> Option<f64> {
        match record.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    };
    let spend = metric("spend");
    let clicks = metric("clicks");
    let impressions = metric("impressions");

    let mut out = Map::new();
    if let (Some(spend), Some(clicks)) = (spend, clicks) {
        if clicks != 0.0 {
            out.insert("calculated_cpc".to_string(), json!(round2(spend / clicks)));
        }
    }
    if let Some(impressions) = impressions.filter(|i| *i != 0.0) {
        if let Some(clicks) = clicks {
            out.insert(
                "calculated_ctr".to_string(),
                json!(round2(clicks / impressions * 100.0)),
            );
        }
        if let Some(spend) = spend {
            out.insert(
                "calculated_cpm".to_string(),
                json!(round2(spend / impressions * 1000.0)),
            );
        }
    }
    out
}
