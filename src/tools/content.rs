//! Content analytics (publishers) tools.
//!
//! These reports require content analytics markup on the tracked site; the
//! upstream presets are the `publishers_*` family.

use crate::error::MetrikaResult;
use crate::metrika::{validate_date, MetrikaClient, Params};
use crate::tools::format_response;
use std::sync::Arc;

/// Handler for content analytics operations.
#[derive(Clone)]
pub struct ContentTools {
    client: Arc<MetrikaClient>,
}

impl ContentTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// One preset-based publishers report. Dates pass through as given; there
    /// is no default window for content reports.
    async fn preset_report(
        &self,
        preset: &str,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        let params: Params = vec![
            ("preset", Some(preset.to_string())),
            ("id", Some(counter_id.to_string())),
            ("date1", validate_date(date_from)?),
            ("date2", validate_date(date_to)?),
        ];
        let data = self.client.get("/stat/v1/data", params).await?;
        Ok(format_response(&data))
    }

    pub async fn get_content_analytics_sources(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.preset_report("publishers_sources", counter_id, date_from, date_to)
            .await
    }

    pub async fn get_content_analytics_categories(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.preset_report("publishers_rubrics", counter_id, date_from, date_to)
            .await
    }

    pub async fn get_content_analytics_authors(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.preset_report("publishers_authors", counter_id, date_from, date_to)
            .await
    }

    pub async fn get_content_analytics_topics(
        &self,
        counter_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> MetrikaResult<String> {
        self.preset_report("publishers_thematics", counter_id, date_from, date_to)
            .await
    }

    /// Per-article views, sorted by views descending.
    pub async fn get_content_analytics_articles(
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
                    ("dimensions", Some("ym:s:publisherArticle".to_string())),
                    ("metrics", Some("ym:s:publisherviews".to_string())),
                    ("filters", Some("ym:s:publisherArticle!n".to_string())),
                    ("sort", Some("-ym:s:publisherviews".to_string())),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
