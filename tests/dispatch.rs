//! End-to-end tool dispatch against a recording Graph API double.

use facebook_ads_mcp::graph::{ApiErrorPayload, Edge, GraphError, MockAdsApi, RecordedCall};
use facebook_ads_mcp::tools::{Dispatcher, ErrorKind, Tool};
use serde_json::{json, Value};

fn dispatcher(mock: &MockAdsApi) -> Dispatcher<MockAdsApi> {
    Dispatcher::new(mock.clone(), "987")
}

// =============================================================================
// Validation happens before any external call
// =============================================================================

#[tokio::test]
async fn invalid_calls_never_reach_the_api() {
    let mock = MockAdsApi::new();
    let d = dispatcher(&mock);

    let cases = [
        ("create_campaign", json!({"name": "  ", "objective": "OUTCOME_TRAFFIC"})),
        (
            "create_campaign",
            json!({"name": "A", "objective": "OUTCOME_TRAFFIC", "dailyBudget": 10, "lifetimeBudget": 100}),
        ),
        (
            "create_ad_set",
            json!({"campaignId": "1", "name": "S", "billingEvent": "IMPRESSIONS",
                   "optimizationGoal": "REACH", "targeting": {}}),
        ),
        ("update_ad", json!({"adId": "5"})),
        (
            "create_lookalike_audience",
            json!({"name": "L", "sourceAudienceId": "9", "country": "US", "ratio": 0.5}),
        ),
        (
            "add_users_to_custom_audience",
            json!({"audienceId": "9", "schema": "EMAIL_SHA256", "users": []}),
        ),
        ("get_campaign_insights", json!({"since": "2024-02-01"})),
        ("upload_ad_media", json!({"filePath": "/definitely/not/here.png"})),
    ];

    for (tool, arguments) in cases {
        let err = d.dispatch(tool, arguments).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError, "{tool}: {}", err.human_message);
        assert!(err.is_error);
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn missing_fields_are_all_named() {
    let mock = MockAdsApi::new();
    let err = dispatcher(&mock)
        .dispatch("create_ad", json!({"name": "Ad"}))
        .await
        .unwrap_err();
    assert_eq!(
        err.human_message,
        "Missing required field(s) for create_ad: adSetId, creativeId"
    );
}

#[tokio::test]
async fn unknown_tool() {
    let mock = MockAdsApi::new();
    let err = dispatcher(&mock)
        .dispatch("launch_rocket", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFoundError);
    assert_eq!(err.human_message, "Unknown tool: launch_rocket");
    assert_eq!(mock.call_count(), 0);
}

// =============================================================================
// Parameter mapping and normalization
// =============================================================================

#[tokio::test]
async fn create_campaign_converts_money_both_ways() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"id": "123"}))]);
    let envelope = dispatcher(&mock)
        .dispatch(
            "create_campaign",
            json!({"name": "Spring", "objective": "OUTCOME_SALES", "dailyBudget": 25.5}),
        )
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::Create { parent, edge, params } = &calls[0] else {
        panic!("expected a create, got {calls:?}");
    };
    assert_eq!(parent, "act_987");
    assert_eq!(*edge, Edge::Campaigns);
    assert_eq!(params["daily_budget"], json!(2550));
    assert_eq!(params["status"], "PAUSED");
    assert_eq!(params["special_ad_categories"], json!([]));
    assert!(!params.contains_key("lifetime_budget"));

    assert!(envelope.success);
    let data = envelope.data.unwrap();
    assert_eq!(data["id"], "123");
    assert_eq!(data["dailyBudget"], json!(25.5));
    assert_eq!(data["lifetimeBudget"], Value::Null);
    assert_eq!(envelope.message.as_deref(), Some("Created campaign 123"));
}

#[tokio::test]
async fn create_campaign_passes_categories_and_status_through() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"id": "123"}))]);
    let envelope = dispatcher(&mock)
        .dispatch(
            "create_campaign",
            json!({
                "name": "X",
                "objective": "OUTCOME_TRAFFIC",
                "status": "PAUSED",
                "special_ad_categories": ["HOUSING"]
            }),
        )
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::Create { params, .. } = &calls[0] else {
        panic!("expected a create, got {calls:?}");
    };
    assert_eq!(params["special_ad_categories"], json!(["HOUSING"]));
    assert_eq!(params["status"], "PAUSED");

    assert!(envelope.success);
    let data = envelope.data.unwrap();
    assert_eq!(data["id"], "123");
    assert_eq!(data["specialAdCategories"], json!(["HOUSING"]));
}

#[tokio::test]
async fn oversized_budgets_never_reach_the_api() {
    let mock = MockAdsApi::new();
    let err = dispatcher(&mock)
        .dispatch(
            "create_campaign",
            json!({"name": "X", "objective": "OUTCOME_TRAFFIC", "dailyBudget": 1e20}),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationError);
    assert!(err.human_message.contains("dailyBudget is too large"));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn blank_parent_filters_list_the_account() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"data": []})), Ok(json!({"data": []}))]);
    let d = dispatcher(&mock);
    d.dispatch("list_ad_sets", json!({"campaignId": ""})).await.unwrap();
    d.dispatch("list_ads", json!({"adSetId": "   "})).await.unwrap();

    for call in mock.calls() {
        let RecordedCall::List { parent, .. } = call else {
            panic!("expected a list, got {call:?}");
        };
        assert_eq!(parent, "act_987");
    }
}

#[tokio::test]
async fn list_defaults_and_budget_normalization() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"data": [
        {"id": "1", "name": "A", "daily_budget": "1000"},
        {"id": "2", "name": "B", "lifetime_budget": "50001"}
    ]}))]);
    let envelope = dispatcher(&mock)
        .dispatch("list_campaigns", Value::Null)
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::List { params, fields, .. } = &calls[0] else {
        panic!("expected a list");
    };
    assert_eq!(params["effective_status"], json!(["ACTIVE"]));
    assert_eq!(params["limit"], json!(100));
    assert!(fields.iter().any(|f| f == "daily_budget"));

    let data = envelope.data.unwrap();
    assert_eq!(data[0]["dailyBudget"], json!(10.0));
    assert_eq!(data[1]["lifetimeBudget"], json!(500.01));
    assert_eq!(data[1]["dailyBudget"], Value::Null);
}

#[tokio::test]
async fn insights_filter_ids_and_derive_metrics() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"data": [
        {"campaign_id": "1", "spend": "50", "clicks": "25", "impressions": "1000"},
        {"campaign_id": "2", "spend": "0", "clicks": "0", "impressions": "0"}
    ]}))]);
    let envelope = dispatcher(&mock)
        .dispatch(
            "get_campaign_insights",
            json!({"ids": ["1", "2"], "since": "2024-01-01", "until": "2024-01-31",
                   "metrics": "spend, clicks ,impressions"}),
        )
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::List { edge, fields, params, .. } = &calls[0] else {
        panic!("expected an insights list");
    };
    assert_eq!(*edge, Edge::Insights);
    assert_eq!(fields, &["spend", "clicks", "impressions"]);
    assert_eq!(params["time_range"], json!({"since": "2024-01-01", "until": "2024-01-31"}));
    assert!(!params.contains_key("date_preset"));
    assert_eq!(params["filtering"][0]["field"], "campaign.id");
    assert_eq!(params["filtering"][0]["value"], json!(["1", "2"]));

    let data = envelope.data.unwrap();
    assert_eq!(data["records"].as_array().unwrap().len(), 2);
    assert_eq!(data["calculated_cpc"], json!(2.0));
    assert_eq!(data["calculated_ctr"], json!(2.5));
    assert_eq!(data["calculated_cpm"], json!(50.0));
}

#[tokio::test]
async fn insights_without_clicks_omit_cpc() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"data": [
        {"spend": "10", "clicks": "0", "impressions": "0"}
    ]}))]);
    let data = dispatcher(&mock)
        .dispatch("get_ad_insights", json!({}))
        .await
        .unwrap()
        .data
        .unwrap();
    assert!(data.get("calculated_cpc").is_none());
    assert!(data.get("calculated_cpm").is_none());

    let calls = mock.calls();
    let RecordedCall::List { params, .. } = &calls[0] else {
        panic!("expected an insights list");
    };
    assert_eq!(params["date_preset"], "last_7d");
    assert_eq!(params["level"], "ad");
}

#[tokio::test]
async fn lookalike_spec_is_built() {
    let mock = MockAdsApi::new();
    dispatcher(&mock)
        .dispatch(
            "create_lookalike_audience",
            json!({"name": "LAL", "sourceAudienceId": "55", "country": "cz"}),
        )
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::Create { edge, params, .. } = &calls[0] else {
        panic!("expected a create");
    };
    assert_eq!(*edge, Edge::CustomAudiences);
    assert_eq!(params["subtype"], "LOOKALIKE");
    assert_eq!(params["origin_audience_id"], "55");
    assert_eq!(params["lookalike_spec"]["country"], "CZ");
    assert_eq!(params["lookalike_spec"]["ratio"], json!(0.01));
}

#[tokio::test]
async fn image_upload_sends_base64_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("banner.png");
    std::fs::write(&path, b"fake-png").unwrap();

    let mock = MockAdsApi::with_responses(vec![Ok(json!({
        "images": {"banner.png": {"hash": "h4sh", "url": "https://cdn/banner.png"}}
    }))]);
    let envelope = dispatcher(&mock)
        .dispatch("upload_ad_media", json!({"filePath": path}))
        .await
        .unwrap();

    let calls = mock.calls();
    let RecordedCall::Create { edge, params, .. } = &calls[0] else {
        panic!("expected a create");
    };
    assert_eq!(*edge, Edge::AdImages);
    assert_eq!(params["bytes"], "ZmFrZS1wbmc=");
    assert_eq!(params["name"], "banner.png");
    assert_eq!(envelope.data.unwrap()["imageHash"], "h4sh");
}

// =============================================================================
// Failure classification
// =============================================================================

#[tokio::test]
async fn vendor_errors_carry_code_subcode_and_trace() {
    let mock = MockAdsApi::with_responses(vec![Err(GraphError::api(
        400,
        ApiErrorPayload {
            message: "Invalid parameter".to_string(),
            code: Some(100),
            error_subcode: Some(1_487_124),
            fbtrace_id: Some("AxYz".to_string()),
            ..ApiErrorPayload::default()
        },
    ))]);
    let err = dispatcher(&mock)
        .dispatch("get_campaign_details", json!({"campaignId": "1"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::VendorApiError);
    assert_eq!(
        err.human_message,
        "Facebook API Error (get_campaign_details): Invalid parameter \
         (Code: 100, Subcode: 1487124, Trace ID: AxYz)"
    );
}

#[tokio::test]
async fn non_array_list_is_internal() {
    let mock = MockAdsApi::with_responses(vec![Ok(json!({"unexpected": true}))]);
    let err = dispatcher(&mock)
        .dispatch("list_ads", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InternalError);
    assert!(err.human_message.contains("Invalid response received from Facebook API"));
}

#[tokio::test]
async fn every_tool_is_dispatchable_by_name() {
    for tool in Tool::ALL {
        assert_eq!(Tool::from_name(tool.name()), Some(tool));
    }
}
