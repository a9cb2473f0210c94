//! Argument validation.
//!
//! Two passes run before anything reaches the Graph API. [`check_required`]
//! inspects the raw argument object against the registry's required list, so
//! every missing field is reported at once. [`check_request`] then applies the
//! cross-field rules to the typed request.

use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::error::{ToolError, ToolResult};
use super::money::Amount;
use super::registry::Tool;
use super::request::{
    AddUsersArgs, CreateCustomAudienceArgs, CreateLookalikeArgs, InsightsArgs, ToolRequest,
};

/// Maximum number of user records accepted per `add_users_to_custom_audience` call.
pub const MAX_AUDIENCE_USERS: usize = 10_000;

/// Image extensions accepted by `upload_ad_media`.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Smallest and largest lookalike ratio.
const LOOKALIKE_RATIO: (f64, f64) = (0.01, 0.20);

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// Creates a passing result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records `message` unless `condition` holds.
    pub fn ensure(&mut self, condition: bool, message: impl FnOnce() -> String) {
        if !condition {
            self.errors.push(message());
        }
    }

    /// Whether no check failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failure messages in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Converts into a `Result`, joining all messages.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] if any check failed.
    pub fn into_result(self) -> ToolResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ToolError::Validation(self.errors.join("; ")))
        }
    }
}

/// Checks that every required argument is present and non-empty.
///
/// A field counts as missing when it is absent, `null`, or an empty string.
#[must_use]
pub fn check_required(tool: Tool, arguments: &Value) -> ValidationResult {
    let missing: Vec<&str> = tool
        .required_fields()
        .iter()
        .copied()
        .filter(|field| is_blank(arguments.get(*field)))
        .collect();

    let mut result = ValidationResult::new();
    if !missing.is_empty() {
        result.push(format!(
            "Missing required field(s) for {}: {}",
            tool.name(),
            missing.join(", ")
        ));
    }
    result
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Applies the cross-field rules to a typed request.
#[must_use]
pub fn check_request(request: &ToolRequest) -> ValidationResult {
    let mut result = ValidationResult::new();
    let tool = request.tool().name();

    match request {
        ToolRequest::ListCampaigns(args) => check_limit(&mut result, args.limit),
        ToolRequest::ListAdSets(args) => check_limit(&mut result, args.limit),
        ToolRequest::ListAds(args) => check_limit(&mut result, args.limit),
        ToolRequest::ListAdCreatives(args) | ToolRequest::ListCustomAudiences(args) => {
            check_limit(&mut result, args.limit);
        }

        ToolRequest::CreateCampaign(args) => {
            result.ensure(
                !(args.daily_budget.is_some() && args.lifetime_budget.is_some()),
                || "Cannot set both dailyBudget and lifetimeBudget".to_string(),
            );
            check_amount(&mut result, "dailyBudget", args.daily_budget);
            check_amount(&mut result, "lifetimeBudget", args.lifetime_budget);
            check_time(&mut result, "startTime", args.start_time.as_deref());
            check_time(&mut result, "endTime", args.end_time.as_deref());
            check_categories(&mut result, args.special_ad_categories.as_deref());
        }
        ToolRequest::UpdateCampaign(args) => {
            result.ensure(args.has_changes(), || no_changes(tool));
            result.ensure(
                !(args.daily_budget.is_some() && args.lifetime_budget.is_some()),
                || "Cannot set both dailyBudget and lifetimeBudget".to_string(),
            );
            check_amount(&mut result, "dailyBudget", args.daily_budget);
            check_amount(&mut result, "lifetimeBudget", args.lifetime_budget);
            check_time(&mut result, "endTime", args.end_time.as_deref());
            check_categories(&mut result, args.special_ad_categories.as_deref());
        }

        ToolRequest::CreateAdSet(args) => {
            match (args.daily_budget, args.lifetime_budget) {
                (Some(_), Some(_)) => {
                    result.push("Cannot set both dailyBudget and lifetimeBudget");
                }
                (None, None) => result.push("Either dailyBudget or lifetimeBudget must be set"),
                _ => {}
            }
            check_amount(&mut result, "dailyBudget", args.daily_budget);
            check_amount(&mut result, "lifetimeBudget", args.lifetime_budget);
            check_amount(&mut result, "bidAmount", args.bid_amount);
            check_time(&mut result, "startTime", args.start_time.as_deref());
            check_time(&mut result, "endTime", args.end_time.as_deref());
        }
        ToolRequest::UpdateAdSet(args) => {
            result.ensure(args.has_changes(), || no_changes(tool));
            result.ensure(
                !(args.daily_budget.is_some() && args.lifetime_budget.is_some()),
                || "Cannot set both dailyBudget and lifetimeBudget".to_string(),
            );
            check_amount(&mut result, "dailyBudget", args.daily_budget);
            check_amount(&mut result, "lifetimeBudget", args.lifetime_budget);
            check_amount(&mut result, "bidAmount", args.bid_amount);
            check_time(&mut result, "startTime", args.start_time.as_deref());
            check_time(&mut result, "endTime", args.end_time.as_deref());
        }

        ToolRequest::UpdateAd(args) => result.ensure(args.has_changes(), || no_changes(tool)),

        ToolRequest::CreateAdCreative(args) => {
            result.ensure(
                args.object_story_spec
                    .get("page_id")
                    .is_some_and(|id| !is_blank(Some(id))),
                || "object_story_spec.page_id is required".to_string(),
            );
        }
        ToolRequest::UploadAdMedia(args) => check_image_path(&mut result, &args.file_path),

        ToolRequest::CreateCustomAudience(args) => check_audience(&mut result, args),
        ToolRequest::CreateLookalikeAudience(args) => check_lookalike(&mut result, args),
        ToolRequest::AddUsersToCustomAudience(args) => check_users(&mut result, args),

        ToolRequest::GetInsights(_, args) => check_insights(&mut result, args),

        ToolRequest::GetCampaignDetails(_)
        | ToolRequest::DeleteCampaign(_)
        | ToolRequest::DeleteAdSet(_)
        | ToolRequest::CreateAd(_)
        | ToolRequest::DeleteAd(_)
        | ToolRequest::DeleteCustomAudience(_)
        | ToolRequest::ListBusinesses
        | ToolRequest::ListBusinessAssets(..)
        | ToolRequest::Overview => {}
    }

    result
}

fn no_changes(tool: &str) -> String {
    format!("No update parameters provided for {tool}")
}

fn check_limit(result: &mut ValidationResult, limit: Option<i64>) {
    if let Some(limit) = limit {
        result.ensure(limit >= 1, || format!("limit must be at least 1 (got {limit})"));
    }
}

fn check_amount(result: &mut ValidationResult, field: &str, amount: Option<Amount>) {
    if let Some(amount) = amount {
        result.ensure(amount.is_positive(), || {
            format!("{field} must be a positive amount (got {})", amount.major())
        });
        result.ensure(!amount.is_positive() || amount.is_representable(), || {
            format!("{field} is too large (got {})", amount.major())
        });
    }
}

/// Accepts RFC 3339 as well as the Graph API's own `+0000` offset style.
fn check_time(result: &mut ValidationResult, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        let parsed = DateTime::parse_from_rfc3339(value)
            .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"));
        result.ensure(parsed.is_ok(), || {
            format!("{field} must be an ISO 8601 timestamp with offset (got '{value}')")
        });
    }
}

fn check_categories(result: &mut ValidationResult, categories: Option<&[String]>) {
    if let Some(categories) = categories {
        result.ensure(!categories.is_empty(), || {
            "special_ad_categories must not be empty when given".to_string()
        });
    }
}

fn check_image_path(result: &mut ValidationResult, path: &Path) {
    if !path.is_file() {
        result.push(format!("File not found at path: {}", path.display()));
        return;
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    result.ensure(IMAGE_EXTENSIONS.contains(&extension.as_str()), || {
        format!(
            "Unsupported file type: '{extension}'. Supported image types: {}",
            IMAGE_EXTENSIONS.join(", ")
        )
    });
}

fn check_audience(result: &mut ValidationResult, args: &CreateCustomAudienceArgs) {
    match args.subtype.as_str() {
        "CUSTOM" => {
            let mut missing = Vec::new();
            if args.description.as_deref().is_none_or(|d| d.trim().is_empty()) {
                missing.push("description");
            }
            if args
                .customer_file_source
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
            {
                missing.push("customer_file_source");
            }
            result.ensure(missing.is_empty(), || {
                format!("CUSTOM audiences require: {}", missing.join(", "))
            });
        }
        "WEBSITE" | "ENGAGEMENT" => {
            result.ensure(args.rule.as_ref().is_some_and(Value::is_object), || {
                format!("{} audiences require a rule object", args.subtype)
            });
        }
        "LOOKALIKE" => {
            result.push("Use create_lookalike_audience to create LOOKALIKE audiences");
        }
        _ => {}
    }
}

fn check_lookalike(result: &mut ValidationResult, args: &CreateLookalikeArgs) {
    let country = args.country.trim();
    result.ensure(
        country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()),
        || format!("country must be a 2-letter country code (got '{country}')"),
    );
    if let Some(ratio) = args.ratio {
        let (min, max) = LOOKALIKE_RATIO;
        result.ensure((min..=max).contains(&ratio), || {
            format!("ratio must be between {min} and {max} (got {ratio})")
        });
    }
}

fn check_users(result: &mut ValidationResult, args: &AddUsersArgs) {
    result.ensure(!args.users.is_empty(), || "users must not be empty".to_string());
    result.ensure(args.users.len() <= MAX_AUDIENCE_USERS, || {
        format!(
            "Cannot add more than {MAX_AUDIENCE_USERS} users per call (got {})",
            args.users.len()
        )
    });
    let keys = args.schema.keys();
    result.ensure(
        !keys.is_empty() && keys.iter().all(|k| !k.trim().is_empty()),
        || "schema must name at least one key type".to_string(),
    );
}

fn check_insights(result: &mut ValidationResult, args: &InsightsArgs) {
    match (args.since.as_deref(), args.until.as_deref()) {
        (Some(since), Some(until)) => {
            let since_date = parse_date(result, "since", since);
            let until_date = parse_date(result, "until", until);
            if let (Some(s), Some(u)) = (since_date, until_date) {
                result.ensure(s <= u, || {
                    format!("since ({since}) must not be after until ({until})")
                });
            }
            result.ensure(args.date_preset.is_none(), || {
                "Use either since/until or datePreset, not both".to_string()
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            result.push("since and until must be given together");
        }
        (None, None) => {}
    }
    if let Some(metrics) = &args.metrics {
        result.ensure(!metrics.is_empty(), || "metrics must not be empty".to_string());
    }
}

fn parse_date(result: &mut ValidationResult, field: &str, value: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    result.ensure(parsed.is_some(), || {
        format!("{field} must be a date in YYYY-MM-DD format (got '{value}')")
    });
    parsed
}
