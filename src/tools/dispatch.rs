//! The tool dispatcher.
//!
//! A call moves through three stages: validating, invoking and normalizing.
//! Each stage returns a [`ToolResult`] and the stages compose with `?`; the
//! dispatcher is the only place a [`ToolError`] is turned into an
//! [`ErrorClassification`]. Every call therefore ends in exactly one
//! [`ResponseEnvelope`] or one classification.

use std::fmt::Write as _;

use serde_json::{json, Value};

use super::error::{ErrorClassification, ToolError, ToolResult};
use super::mapper::{self, Operation};
use super::normalize::{self, EntityKind, ResponseEnvelope};
use super::registry::{self, Tool, ToolDefinition};
use super::request::ToolRequest;
use super::validate::{check_request, check_required};
use crate::config::normalize_account_id;
use crate::graph::{AdsApi, Edge, GraphError};

/// Routes tool calls to an [`AdsApi`].
///
/// A dispatcher can only be built from an API client that already exists,
/// so there is no uninitialised state to guard against at call time.
pub struct Dispatcher<A> {
    api: A,
    account_id: String,
}

impl<A: AdsApi> Dispatcher<A> {
    /// Creates a dispatcher for `account_id` (with or without the `act_` prefix).
    #[must_use]
    pub fn new(api: A, account_id: &str) -> Self {
        Self {
            api,
            account_id: normalize_account_id(account_id),
        }
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The `act_`-prefixed ad account the dispatcher works on.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The `tools/list` catalogue.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        registry::definitions()
    }

    /// Runs one tool call to completion.
    ///
    /// # Errors
    ///
    /// Returns the classified failure if the tool is unknown, the arguments
    /// are invalid, the API call fails, or the response is malformed.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ResponseEnvelope, ErrorClassification> {
        let Some(tool) = Tool::from_name(name) else {
            tracing::warn!(tool = name, "Unknown tool requested");
            return Err(ToolError::NotFound(format!("Unknown tool: {name}")).classify());
        };

        tracing::info!(tool = name, "Tool call");
        match self.run(tool, arguments).await {
            Ok(envelope) => {
                tracing::debug!(tool = name, "Tool call succeeded");
                Ok(envelope)
            }
            Err(error) => {
                let classification = error.classify();
                match &error {
                    ToolError::Validation(_) | ToolError::NotFound(_) => {
                        tracing::warn!(tool = name, kind = ?classification.kind, "{error}");
                    }
                    ToolError::VendorApi { .. } | ToolError::Internal { .. } => {
                        tracing::error!(tool = name, kind = ?classification.kind, "{error}");
                    }
                }
                Err(classification)
            }
        }
    }

    async fn run(&self, tool: Tool, arguments: Value) -> ToolResult<ResponseEnvelope> {
        check_required(tool, &arguments).into_result()?;
        let request = ToolRequest::parse(tool, arguments)?;
        check_request(&request).into_result()?;

        let operation = mapper::map(&request, &self.account_id);
        tracing::debug!(tool = tool.name(), ?operation, "Mapped request");
        self.execute(tool, operation).await
    }

    async fn execute(&self, tool: Tool, operation: Operation) -> ToolResult<ResponseEnvelope> {
        let name = tool.name();
        let graph = |error: GraphError| ToolError::from_graph(name, error);

        match operation {
            Operation::Create {
                parent,
                edge,
                params,
                entity,
            } => {
                let returned = self.api.create(&parent, edge, &params).await.map_err(graph)?;
                let data = normalize::created(entity, &params, &returned);
                let id = data.get("id").and_then(Value::as_str).unwrap_or("?");
                let message = format!("Created {} {id}", entity.singular());
                Ok(ResponseEnvelope::ok(data, message))
            }

            Operation::List {
                parent,
                edge,
                params,
                entity,
            } => {
                let fields = entity.graph_fields();
                let raw = self
                    .api
                    .list(&parent, edge, &fields, &params)
                    .await
                    .map_err(graph)?;
                let data = normalize::list(name, entity, &raw)?;
                let count = data.as_array().map_or(0, Vec::len);
                Ok(ResponseEnvelope::ok(
                    data,
                    format!("Found {count} {}", entity.plural()),
                ))
            }

            Operation::Insights {
                parent,
                level,
                fields,
                params,
            } => {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                let raw = self
                    .api
                    .list(&parent, Edge::Insights, &fields, &params)
                    .await
                    .map_err(graph)?;
                let data = normalize::insights(name, level, &raw)?;
                let count = data["records"].as_array().map_or(0, Vec::len);
                Ok(ResponseEnvelope::ok(
                    data,
                    format!("Retrieved {count} {} insight record(s)", level.as_str()),
                ))
            }

            Operation::Read { id, entity } => {
                let data = self.read(name, &id, entity).await?;
                Ok(ResponseEnvelope::ok(
                    data,
                    format!("Retrieved {} {id}", entity.singular()),
                ))
            }

            Operation::Update { id, params, entity } => {
                let returned = self.api.update(&id, &params).await.map_err(graph)?;
                ensure_success(name, &returned, "update")?;
                let data = self.read(name, &id, entity).await?;
                Ok(ResponseEnvelope::ok(
                    data,
                    format!("Updated {} {id}", entity.singular()),
                ))
            }

            Operation::Delete { id } => {
                let returned = self.api.delete(&id).await.map_err(graph)?;
                ensure_success(name, &returned, "delete")?;
                Ok(ResponseEnvelope::ok(
                    normalize::deleted(&id),
                    format!("Deleted {id}"),
                ))
            }

            Operation::AddUsers {
                audience_id,
                params,
            } => {
                let returned = self
                    .api
                    .create(&audience_id, Edge::Users, &params)
                    .await
                    .map_err(graph)?;
                let data = normalize::audience_users(&audience_id, &returned);
                Ok(ResponseEnvelope::ok(
                    data,
                    format!("Submitted users to audience {audience_id}"),
                ))
            }

            Operation::UploadImage { parent, path } => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    ToolError::internal(name, format!("Failed to read {}: {e}", path.display()))
                })?;
                let file_name = mapper::upload_name(&path);
                tracing::debug!(tool = name, file = %file_name, size = bytes.len(), "Uploading image");
                let params = mapper::image_upload_params(&file_name, &bytes);
                let returned = self
                    .api
                    .create(&parent, Edge::AdImages, &params)
                    .await
                    .map_err(graph)?;
                let data = normalize::image_upload(name, &file_name, &returned)?;
                Ok(ResponseEnvelope::ok(data, format!("Uploaded image {file_name}")))
            }

            Operation::Overview => Ok(overview()),
        }
    }

    async fn read(&self, tool: &str, id: &str, entity: EntityKind) -> ToolResult<Value> {
        let fields = entity.graph_fields();
        let raw = self
            .api
            .read(id, &fields)
            .await
            .map_err(|e| ToolError::from_graph(tool, e))?;
        if !raw.is_object() {
            return Err(ToolError::internal(
                tool,
                format!(
                    "Invalid response received from Facebook API (expected an object for {} {id})",
                    entity.singular()
                ),
            ));
        }
        Ok(normalize::entity(entity, &raw))
    }
}

/// Rejects an explicit `{"success": false}` acknowledgement.
fn ensure_success(tool: &str, returned: &Value, verb: &str) -> ToolResult<()> {
    if returned.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ToolError::internal(
            tool,
            format!("Facebook API did not confirm the {verb}"),
        ));
    }
    Ok(())
}

/// Tool groups shown by `ads_management_overview`.
const OVERVIEW_GROUPS: &[(&str, &[Tool])] = &[
    (
        "Campaign management",
        &[
            Tool::ListCampaigns,
            Tool::GetCampaignDetails,
            Tool::CreateCampaign,
            Tool::UpdateCampaign,
            Tool::DeleteCampaign,
        ],
    ),
    (
        "Ad set management",
        &[
            Tool::ListAdSets,
            Tool::CreateAdSet,
            Tool::UpdateAdSet,
            Tool::DeleteAdSet,
        ],
    ),
    (
        "Ad management",
        &[Tool::ListAds, Tool::CreateAd, Tool::UpdateAd, Tool::DeleteAd],
    ),
    (
        "Creatives and media",
        &[
            Tool::ListAdCreatives,
            Tool::CreateAdCreative,
            Tool::UploadAdMedia,
        ],
    ),
    (
        "Audiences",
        &[
            Tool::ListCustomAudiences,
            Tool::CreateCustomAudience,
            Tool::CreateLookalikeAudience,
            Tool::AddUsersToCustomAudience,
            Tool::DeleteCustomAudience,
        ],
    ),
    (
        "Insights",
        &[
            Tool::GetCampaignInsights,
            Tool::GetAdSetInsights,
            Tool::GetAdInsights,
        ],
    ),
    (
        "Business assets",
        &[
            Tool::ListBusinesses,
            Tool::GetBusinessAdAccounts,
            Tool::GetBusinessPages,
            Tool::ListBusinessCatalogs,
        ],
    ),
];

fn overview() -> ResponseEnvelope {
    let mut text = String::from(
        "The 'ads_management' permission allows full control over your Facebook ads. \
         This server provides these tools:\n",
    );
    let mut groups = serde_json::Map::new();
    for (group, tools) in OVERVIEW_GROUPS {
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        let _ = writeln!(text, "- {group}: {}", names.join(", "));
        groups.insert((*group).to_string(), json!(names));
    }
    text.push_str(
        "Budgets and bids are given in account currency units. \
         Make sure your access token has the 'ads_management' permission.",
    );
    ResponseEnvelope::ok(Value::Object(groups), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ApiErrorPayload, MockAdsApi, RecordedCall};
    use crate::tools::error::ErrorKind;

    fn dispatcher(mock: &MockAdsApi) -> Dispatcher<MockAdsApi> {
        Dispatcher::new(mock.clone(), "42")
    }

    #[test]
    fn account_id_is_prefixed() {
        let mock = MockAdsApi::new();
        assert_eq!(dispatcher(&mock).account_id(), "act_42");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let mock = MockAdsApi::new();
        let err = dispatcher(&mock)
            .dispatch("frobnicate", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFoundError);
        assert_eq!(err.human_message, "Unknown tool: frobnicate");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn update_rereads_the_entity() {
        let mock = MockAdsApi::with_responses(vec![
            Ok(json!({"success": true})),
            Ok(json!({"id": "7", "name": "Renamed", "daily_budget": "500"})),
        ]);
        let envelope = dispatcher(&mock)
            .dispatch("update_campaign", json!({"campaignId": "7", "name": "Renamed"}))
            .await
            .unwrap();

        assert_eq!(envelope.data.as_ref().unwrap()["dailyBudget"], json!(5.0));
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], RecordedCall::Update { id, .. } if id == "7"));
        assert!(matches!(&calls[1], RecordedCall::Read { id, .. } if id == "7"));
    }

    #[tokio::test]
    async fn delete_reports_id() {
        let mock = MockAdsApi::new();
        let envelope = dispatcher(&mock)
            .dispatch("delete_ad", json!({"adId": "55"}))
            .await
            .unwrap();
        assert_eq!(envelope.data, Some(json!({"id": "55", "deleted": true})));
    }

    #[tokio::test]
    async fn unconfirmed_delete_is_internal() {
        let mock = MockAdsApi::with_responses(vec![Ok(json!({"success": false}))]);
        let err = dispatcher(&mock)
            .dispatch("delete_ad_set", json!({"adSetId": "5"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InternalError);
    }

    #[tokio::test]
    async fn vendor_errors_are_classified() {
        let mock = MockAdsApi::with_responses(vec![Err(GraphError::api(
            400,
            ApiErrorPayload {
                message: "Invalid parameter".to_string(),
                code: Some(100),
                error_subcode: Some(33),
                fbtrace_id: Some("abc".to_string()),
                ..ApiErrorPayload::default()
            },
        ))]);
        let err = dispatcher(&mock)
            .dispatch("get_campaign_details", json!({"campaignId": "1"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::VendorApiError);
        for part in ["Invalid parameter", "100", "33", "abc"] {
            assert!(err.human_message.contains(part), "{part} missing");
        }
    }

    #[tokio::test]
    async fn overview_makes_no_calls() {
        let mock = MockAdsApi::new();
        let envelope = dispatcher(&mock)
            .dispatch("ads_management_overview", Value::Null)
            .await
            .unwrap();
        assert!(envelope.message.unwrap().contains("create_campaign"));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn overview_lists_every_other_tool() {
        let listed: usize = OVERVIEW_GROUPS.iter().map(|(_, tools)| tools.len()).sum();
        assert_eq!(listed, Tool::ALL.len() - 1);
    }
}
