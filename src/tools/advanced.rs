//! Advanced and specialized analytics tools: e-commerce, time-series,
//! Yandex Direct experiments, browser reports, and drill-down.

use crate::error::{MetrikaError, MetrikaResult};
use crate::metrika::{validate_date, MetrikaClient};
use crate::tools::format_response;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

const MAX_METRICS: usize = 20;
const MAX_DIMENSIONS: usize = 10;
const VALID_GROUPS: [&str; 5] = ["day", "week", "month", "quarter", "year"];

fn default_currency() -> String {
    "RUB".to_string()
}

/// Input for the get_ecommerce_performance tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EcommerceInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Currency code for converted revenue, e.g. RUB, USD. Default: RUB
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Start date YYYY-MM-DD
    #[serde(default)]
    pub date_from: Option<String>,
    /// End date YYYY-MM-DD
    #[serde(default)]
    pub date_to: Option<String>,
}

fn default_group() -> String {
    "day".to_string()
}

fn default_top_keys() -> u32 {
    7
}

/// Input for the get_data_by_time tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DataByTimeInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Metric names (max 20), e.g. ["ym:s:visits"]
    pub metrics: Vec<String>,
    /// Start date YYYY-MM-DD
    #[serde(default)]
    pub date_from: Option<String>,
    /// End date YYYY-MM-DD
    #[serde(default)]
    pub date_to: Option<String>,
    /// Dimension names (max 10)
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
    /// Time grouping: day, week, month, quarter, or year. Default: day
    #[serde(default = "default_group")]
    pub group: String,
    /// Number of top results to keep (1-30). Default: 7
    #[serde(default = "default_top_keys")]
    pub top_keys: u32,
    /// Timezone offset, e.g. +03:00
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Input for the get_yandex_direct_experiment tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DirectExperimentInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Yandex Direct A/B experiment ID
    pub experiment_id: u64,
}

/// Input for the get_drilldown tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DrilldownInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Comma-separated dimension path for drill-down, e.g. "ym:s:regionCountry,ym:s:regionCity"
    pub dimensions: String,
    /// Metric names, e.g. ["ym:s:visits", "ym:s:users"]
    pub metrics: Vec<String>,
    /// Parent node ID to drill into (omit for root level)
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Start date YYYY-MM-DD
    #[serde(default)]
    pub date_from: Option<String>,
    /// End date YYYY-MM-DD
    #[serde(default)]
    pub date_to: Option<String>,
    /// Maximum rows to return
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Handler for advanced analytics operations.
#[derive(Clone)]
pub struct AdvancedTools {
    client: Arc<MetrikaClient>,
}

impl AdvancedTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// E-commerce purchases and converted revenue by category and region.
    /// The revenue metric name embeds the currency code.
    pub async fn get_ecommerce_performance(
        &self,
        counter_id: &str,
        currency: &str,
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
                        Some(
                            "ym:s:productCategory,ym:s:regionCountry,ym:s:regionCity".to_string(),
                        ),
                    ),
                    (
                        "metrics",
                        Some(format!(
                            "ym:s:ecommercePurchases,ym:s:ecommerce{currency}ConvertedRevenue"
                        )),
                    ),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Time-series report over /stat/v1/data/bytime. All bounds are checked
    /// before any network call.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_data_by_time(
        &self,
        counter_id: &str,
        metrics: &[String],
        date_from: Option<&str>,
        date_to: Option<&str>,
        dimensions: Option<&[String]>,
        group: &str,
        top_keys: u32,
        timezone: Option<&str>,
    ) -> MetrikaResult<String> {
        if metrics.len() > MAX_METRICS {
            return Err(MetrikaError::validation(
                "metrics",
                format!("maximum {MAX_METRICS} metrics allowed, got {}", metrics.len()),
            ));
        }
        if let Some(dims) = dimensions {
            if dims.len() > MAX_DIMENSIONS {
                return Err(MetrikaError::validation(
                    "dimensions",
                    format!("maximum {MAX_DIMENSIONS} dimensions allowed, got {}", dims.len()),
                ));
            }
        }
        if !VALID_GROUPS.contains(&group) {
            return Err(MetrikaError::validation(
                "group",
                format!("must be one of {}, got {group:?}", VALID_GROUPS.join(", ")),
            ));
        }
        if !(1..=30).contains(&top_keys) {
            return Err(MetrikaError::validation(
                "top_keys",
                format!("must be between 1 and 30, got {top_keys}"),
            ));
        }
        let data = self
            .client
            .get(
                "/stat/v1/data/bytime",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("metrics", Some(metrics.join(","))),
                    ("dimensions", dimensions.map(|d| d.join(","))),
                    ("group", Some(group.to_string())),
                    ("top_keys", Some(top_keys.to_string())),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                    ("timezone", timezone.map(str::to_string)),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Bounce rate for one Yandex Direct A/B experiment.
    pub async fn get_yandex_direct_experiment(
        &self,
        counter_id: &str,
        experiment_id: u64,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    (
                        "dimensions",
                        Some(format!("ym:s:experimentAB{experiment_id}")),
                    ),
                    ("metrics", Some("ym:s:bounceRate".to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Browser report without browser-version breakdown.
    pub async fn get_browsers_report(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("preset", Some("tech_platforms".to_string())),
                    ("dimensions", Some("ym:s:browser".to_string())),
                    ("id", Some(counter_id.to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// One branch of a hierarchical tree-view report.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_drilldown(
        &self,
        counter_id: &str,
        dimensions: &str,
        metrics: &[String],
        parent_id: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
        limit: Option<u32>,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data/drilldown",
                vec![
                    ("id", Some(counter_id.to_string())),
                    ("dimensions", Some(dimensions.to_string())),
                    ("metrics", Some(metrics.join(","))),
                    ("parent_id", parent_id.map(str::to_string)),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                    ("limit", limit.map(|l| l.to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
