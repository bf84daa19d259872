//! Page performance and goal conversion tools.

use crate::error::MetrikaResult;
use crate::metrika::{validate_date, MetrikaClient};
use crate::tools::format_response;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Input for the get_goals_conversion tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GoalsConversionInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Goal IDs to track conversion rates for
    pub goal_ids: Vec<u64>,
}

/// Input for the get_conversion_rate_by_source_and_landing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConversionBySourceInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Goal ID to track conversion for
    pub goal_id: u64,
    /// Start date YYYY-MM-DD
    #[serde(default)]
    pub date_from: Option<String>,
    /// End date YYYY-MM-DD
    #[serde(default)]
    pub date_to: Option<String>,
}

/// Handler for performance and conversion operations.
#[derive(Clone)]
pub struct PerformanceTools {
    client: Arc<MetrikaClient>,
}

impl PerformanceTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// Page views, bounce rate, and visit duration by URL path.
    pub async fn get_page_performance(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some("ym:s:URLPath".to_string())),
                    (
                        "metrics",
                        Some(
                            "ym:s:pageviews,ym:s:bounceRate,ym:s:avgVisitDurationSeconds"
                                .to_string(),
                        ),
                    ),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Conversion rates for the given goals. Each goal id becomes a dynamic
    /// metric name `ym:s:goal{id}conversionRate`, in caller order.
    pub async fn get_goals_conversion(
        &self,
        counter_id: &str,
        goal_ids: &[u64],
    ) -> MetrikaResult<String> {
        let goal_metrics = goal_ids
            .iter()
            .map(|gid| format!("ym:s:goal{gid}conversionRate"))
            .collect::<Vec<_>>()
            .join(",");
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("metrics", Some(format!("ym:s:users,{goal_metrics}"))),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Organic search performance by engine and query.
    pub async fn get_organic_search_performance(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    (
                        "dimensions",
                        Some("ym:s:searchEngine,ym:s:searchPhrase".to_string()),
                    ),
                    (
                        "metrics",
                        Some("ym:s:visits,ym:s:users,ym:s:pageviews".to_string()),
                    ),
                    ("filters", Some("ym:s:trafficSource=='organic'".to_string())),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Conversion rate broken down by traffic source and landing page.
    pub async fn get_conversion_rate_by_source_and_landing(
        &self,
        counter_id: &str,
        goal_id: u64,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    (
                        "dimensions",
                        Some("ym:s:trafficSource,ym:s:landingPage".to_string()),
                    ),
                    (
                        "metrics",
                        Some(format!("ym:s:visits,ym:s:goal{goal_id}conversionRate")),
                    ),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
