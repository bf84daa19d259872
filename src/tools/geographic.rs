//! Geographic traffic analytics tools.

use crate::error::MetrikaResult;
use crate::metrika::{validate_date, MetrikaClient};
use crate::tools::format_response;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Input for the get_regional_data tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegionalDataInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// City names to filter by. Defaults to Moscow and Saint Petersburg.
    #[serde(default)]
    pub cities: Option<Vec<String>>,
}

/// Handler for regional and geographical operations.
#[derive(Clone)]
pub struct GeographicTools {
    client: Arc<MetrikaClient>,
}

impl GeographicTools {
    pub fn new(client: Arc<MetrikaClient>) -> Self {
        Self { client }
    }

    /// Sessions and users for the given cities.
    ///
    /// City names are interpolated into the filter expression verbatim,
    /// single-quoted and comma-joined inside a parenthesized list. Names
    /// containing quotes or parentheses will break the expression; callers
    /// are trusted, matching the upstream API's own filter language.
    pub async fn get_regional_data(
        &self,
        counter_id: &str,
        cities: Option<&[String]>,
    ) -> MetrikaResult<String> {
        let default_cities = ["Москва".to_string(), "Санкт-Петербург".to_string()];
        let cities = cities.unwrap_or(&default_cities);
        let city_filter = cities
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(",");
        let data = self
            .client
            .get(
                "/stat/v1/data",
                vec![
                    ("ids", Some(counter_id.to_string())),
                    ("dimensions", Some("ym:s:regionCityName".to_string())),
                    ("metrics", Some("ym:s:visits,ym:s:users".to_string())),
                    (
                        "filters",
                        Some(format!("ym:s:regionCityName=.({city_filter})")),
                    ),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }

    /// Country/city distribution of organic traffic.
    pub async fn get_geographical_organic_traffic(
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
                        Some("ym:s:regionCountry,ym:s:regionCity".to_string()),
                    ),
                    ("metrics", Some("ym:s:visits,ym:s:users".to_string())),
                    ("filters", Some("ym:s:trafficSource=='organic'".to_string())),
                    ("date1", validate_date(date_from)?),
                    ("date2", validate_date(date_to)?),
                ],
            )
            .await?;
        Ok(format_response(&data))
    }
}
