//! Tool filtering for the allow-list and read-only mode.
//!
//! The full catalog is registered first; the disallowed subset is removed
//! from the tool router at service construction. Every current tool is
//! tagged `Read`, so the write filter only matters for future catalog
//! additions.

use std::collections::HashMap;

/// Access tag attached to each catalog entry. The tag never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTag {
    Read,
    Write,
}

/// Access tags for the full operation catalog.
pub fn tool_tags() -> HashMap<&'static str, AccessTag> {
    const READ_TOOLS: &[&str] = &[
        "get_account_info",
        "get_visits",
        "sources_summary",
        "sources_search_phrases",
        "get_traffic_sources_types",
        "get_search_engines_data",
        "get_new_users_by_source",
        "list_goals",
        "list_counters",
        "get_content_analytics_sources",
        "get_content_analytics_categories",
        "get_content_analytics_authors",
        "get_content_analytics_topics",
        "get_content_analytics_articles",
        "get_user_demographics",
        "get_device_analysis",
        "get_mobile_vs_desktop",
        "get_page_depth_analysis",
        "get_regional_data",
        "get_geographical_organic_traffic",
        "get_page_performance",
        "get_goals_conversion",
        "get_organic_search_performance",
        "get_conversion_rate_by_source_and_landing",
        "get_ecommerce_performance",
        "get_data_by_time",
        "get_yandex_direct_experiment",
        "get_browsers_report",
        "get_drilldown",
    ];
    READ_TOOLS.iter().map(|t| (*t, AccessTag::Read)).collect()
}

/// Filter the tool catalog down to what the configuration allows.
///
/// Keeps catalog order. When an allow-list is configured only its members
/// survive; when read-only mode is set, tools tagged `Write` are dropped.
/// Untagged tools are treated as readable.
pub fn filter_tools(
    catalog: &[String],
    enabled: Option<&[String]>,
    read_only: bool,
    tags: &HashMap<&str, AccessTag>,
) -> Vec<String> {
    catalog
        .iter()
        .filter(|name| {
            enabled.is_none_or(|list| list.iter().any(|e| e == *name))
        })
        .filter(|name| {
            !read_only || tags.get(name.as_str()) != Some(&AccessTag::Write)
        })
        .cloned()
        .collect()
}
