//! Traffic sources and basic visit analytics tools.

use crate::error::MetrikaResult;
use crate::metrika::{default_date_range, validate_date, MetrikaClient};
use crate::tools::format_response;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Input for the get_search_engines_data tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchEnginesInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Exclude robot traffic
    #[serde(default)]
    pub exclude_robots: bool,
    /// Filter to new users only
    #[serde(default)]
    pub new_users_only: bool,
}

fn default_per_page() -> u32 {
    100
}

/// Input for the list_counters tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListCountersInput {
    /// Substring to search counter names and sites for
    #[serde(default)]
    pub search: Option<String>,
    /// Counters per page. Default: 100
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Handler for traffic-source and visit analytics operations.
#[derive(Clone)]
pub struct TrafficTools {
    client: Arc<MetrikaClient>,
}

impl TrafficTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// Basic counter information from the management API.
    pub async fn get_account_info(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(&format!("/management/v1/counter/{counter_id}"), vec![])
            .await?;
        Ok(format_response(&data))
    }

    /// Visit counts, defaulting to the trailing 7-day window.
    pub async fn get_visits(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let mut date_from = validate_date(date_from)?;
        let mut date_to = validate_date(date_to)?;
        if date_from.is_none() && date_to.is_none() {
            let (from, to) = default_date_range(7);
            date_from = Some(from);
            date_to = Some(to);
        }
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("metrics", Some("ym:s:visits".to_string())),
                    ("date1", date_from),
                    ("date2", date_to),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    pub async fn sources_summary(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("preset", Some("sources_summary".to_string())),
                    ("id", Some(counter_id.to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    pub async fn sources_search_phrases(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("preset", Some("sources_search_phrases".to_string())),
                    ("id", Some(counter_id.to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    pub async fn get_traffic_sources_types(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some("ym:s:lastTrafficSource".to_string())),
                    ("metrics", Some("ym:s:visits,ym:s:users".to_string())),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Search-engine sessions with optional robot and new-user filters.
    /// Filter clauses are combined with a literal ` AND `.
    pub async fn get_search_engines_data(
        &self,
        counter_id: &str,
        exclude_robots: bool,
        new_users_only: bool,
    ) -> MetrikaResult<String> {
        let mut filters = vec!["ym:s:trafficSource=='organic'"];
        if exclude_robots {
            filters.push("ym:s:isRobot=='No'");
        }
        if new_users_only {
            filters.push("ym:s:isNewUser=='Yes'");
        }
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some("ym:s:searchEngine".to_string())),
                    ("metrics", Some("ym:s:visits,ym:s:users".to_string())),
                    ("filters", Some(filters.join(" AND "))),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// New users per traffic source, defaulting to the trailing 30-day window.
    pub async fn get_new_users_by_source(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let mut date_from = validate_date(date_from)?;
        let mut date_to = validate_date(date_to)?;
        if date_from.is_none() && date_to.is_none() {
            let (from, to) = default_date_range(30);
            date_from = Some(from);
            date_to = Some(to);
        }
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some("ym:s:lastTrafficSource".to_string())),
                    ("metrics", Some("ym:s:newUsers".to_string())),
                    ("date1", date_from),
                    ("date2", date_to),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Goals configured for a counter.
    pub async fn list_goals(&self, counter_id: &str) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                &format!("/management/v1/counter/{counter_id}/goals"),
                vec![],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Counters available to the authenticated account.
    pub async fn list_counters(
        &self,
        search: Option<&str>,
        per_page: u32,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/management/v1/counters",
                vec![
                    ("per_page", Some(per_page.to_string())),
                    ("search", search.map(str::to_string)),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
