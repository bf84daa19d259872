//! Audience demographics and device analytics tools.

use crate::error::MetrikaResult;
use crate::metrika::{validate_date, MetrikaClient};
use crate::tools::format_response;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

fn default_min_pages() -> u32 {
    5
}

/// Input for the get_page_depth_analysis tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageDepthInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Minimum page views threshold. Default: 5
    #[serde(default = "default_min_pages")]
    pub min_pages: u32,
}

/// Handler for demographics and device-analysis operations.
#[derive(Clone)]
pub struct DemographicsTools {
    client: Arc<MetrikaClient>,
}

impl DemographicsTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// One dimension/metric report over /stat/v1/data with optional dates.
    async fn report(
        &self,
        counter_id: &str,
        dimensions: &str,
        metrics: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some(dimensions.to_string())),
                    ("metrics", Some(metrics.to_string())),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    pub async fn get_user_demographics(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.report(
            counter_id,
            "ym:s:ageInterval,ym:s:gender,ym:s:deviceCategory",
            "ym:s:visits,ym:s:users,ym:s:pageviews,ym:s:bounceRate,ym:s:avgVisitDurationSeconds",
            date_from,
            date_to,
        )
        .await
    }

    pub async fn get_device_analysis(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.report(
            counter_id,
            "ym:s:browser,ym:s:operatingSystem",
            "ym:s:visits,ym:s:pageviews,ym:s:bounceRate,ym:s:avgVisitDurationSeconds",
            date_from,
            date_to,
        )
        .await
    }

    pub async fn get_mobile_vs_desktop(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.report(
            counter_id,
            "ym:s:deviceCategory",
            "ym:s:visits,ym:s:users,ym:s:pageviews,ym:s:bounceRate,ym:s:avgVisitDurationSeconds",
            date_from,
            date_to,
        )
        .await
    }

    /// Sessions deeper than `min_pages` page views.
    pub async fn get_page_depth_analysis(
        &self,
        counter_id: &str,
        min_pages: u32,
    ) -> MetrikaResult<String> {
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("metrics", Some("ym:s:visits,ym:s:users".to_string())),
                    ("filters", Some(format!("ym:s:pageViews>{min_pages}"))),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
