//! MCP tool implementations.
//!
//! This module contains the analytics tool handlers, one module per domain:
//! - `traffic`: visits, traffic sources, counters and goals management
//! - `content`: content analytics (publishers) reports
//! - `demographics`: audience demographics and device analysis
//! - `geographic`: regional and geographical traffic reports
//! - `performance`: page performance and goal conversion
//! - `advanced`: e-commerce, time-series, experiments, drill-down
//!
//! Shared pieces: `filter` (allow-list / read-only tool filtering) and
//! `format` (canonical response formatting).

pub mod advanced;
pub mod content;
pub mod demographics;
pub mod filter;
pub mod format;
pub mod geographic;
pub mod performance;
pub mod traffic;

pub use advanced::AdvancedTools;
pub use content::ContentTools;
pub use demographics::DemographicsTools;
pub use filter::{filter_tools, tool_tags, AccessTag};
pub use format::format_response;
pub use geographic::GeographicTools;
pub use performance::PerformanceTools;
pub use traffic::TrafficTools;

use schemars::JsonSchema;
use serde::Deserialize;

/// Input for tools that only need a counter.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CounterInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
}

/// Input for tools that take a counter and an optional date range.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CounterDateRangeInput {
    /// Yandex Metrika counter ID
    pub counter_id: String,
    /// Start date YYYY-MM-DD
    #[serde(default)]
    pub date_from: Option<String>,
    /// End date YYYY-MM-DD
    #[serde(default)]
    pub date_to: Option<String>,
}
