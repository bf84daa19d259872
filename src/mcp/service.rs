//! MCP service implementation using rmcp.
//!
//! This module defines the MetrikaService struct with the full analytics
//! operation catalog exposed via the MCP protocol using the rmcp framework's
//! macros. The catalog is filtered once at construction according to the
//! configured allow-list and read-only mode; every error leaving a tool is a
//! typed MetrikaError, tagged with the operation name.

use crate::config::Config;
use crate::error::MetrikaResult;
use crate::metrika::MetrikaClient;
use crate::tools::advanced::{
    DataByTimeInput, DirectExperimentInput, DrilldownInput, EcommerceInput,
};
use crate::tools::demographics::PageDepthInput;
use crate::tools::geographic::RegionalDataInput;
use crate::tools::performance::{ConversionBySourceInput, GoalsConversionInput};
use crate::tools::traffic::{ListCountersInput, SearchEnginesInput};
use crate::tools::{
    filter_tools, tool_tags, AdvancedTools, ContentTools, CounterDateRangeInput, CounterInput,
    DemographicsTools, GeographicTools, PerformanceTools, TrafficTools,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct MetrikaService {
    traffic: TrafficTools,
    content: ContentTools,
    demographics: DemographicsTools,
    geographic: GeographicTools,
    performance: PerformanceTools,
    advanced: AdvancedTools,
    /// Tool router for MCP tool dispatch, pre-filtered by config
    tool_router: ToolRouter<Self>,
}

impl MetrikaService {
    /// Create a new MetrikaService instance.
    ///
    /// The full catalog is registered and then reduced to the subset allowed
    /// by the configuration (allow-list intersection, write tools dropped in
    /// read-only mode).
    pub fn new(client: Arc<MetrikaClient>, config: &Config) -> Self {
        let mut tool_router = Self::tool_router();
        let catalog: Vec<String> = tool_router
            .list_all()
            .iter()
            .map(|t| t.name.to_string())
            .collect();
        let allowed: HashSet<String> = filter_tools(
            &catalog,
            config.enabled_tools(),
            config.read_only,
            &tool_tags(),
        )
        .into_iter()
        .collect();
        for name in &catalog {
            if !allowed.contains(name) {
                tool_router.remove_route(name.as_str());
            }
        }

        Self {
            traffic: TrafficTools::new(client.clone()),
            content: ContentTools::new(client.clone()),
            demographics: DemographicsTools::new(client.clone()),
            geographic: GeographicTools::new(client.clone()),
            performance: PerformanceTools::new(client.clone()),
            advanced: AdvancedTools::new(client),
            tool_router,
        }
    }

    /// Names of the tools this service exposes after filtering.
    pub fn exposed_tools(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .iter()
            .map(|t| t.name.to_string())
            .collect()
    }

    /// Run one operation, tagging and logging any failure.
    ///
    /// Classified errors (validation/auth/transport/upstream) pass through
    /// unchanged; anything else is wrapped so callers always see a typed
    /// error naming the operation.
    async fn run<F>(&self, operation: &'static str, fut: F) -> Result<CallToolResult, McpError>
    where
        F: Future<Output = MetrikaResult<String>>,
    {
        match fut.await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) => {
                let err = err.into_operation(operation);
                error!(operation, error = %err, "Tool operation failed");
                Err(err.into())
            }
        }
    }
}

#[tool_router]
impl MetrikaService {
    // ── Account & basic analytics ────────────────────────────────────────

    #[tool(description = "Get basic account and counter information from Yandex Metrika.")]
    async fn get_account_info(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_account_info",
            self.traffic.get_account_info(&input.counter_id),
        )
        .await
    }

    #[tool(
        description = "Retrieve visit statistics with optional date range (defaults to last 7 days)."
    )]
    async fn get_visits(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_visits",
            self.traffic.get_visits(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "List Yandex Metrika counters available to the authenticated account.")]
    async fn list_counters(
        &self,
        Parameters(input): Parameters<ListCountersInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "list_counters",
            self.traffic
                .list_counters(input.search.as_deref(), input.per_page),
        )
        .await
    }

    #[tool(description = "List conversion goals configured for a counter.")]
    async fn list_goals(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run("list_goals", self.traffic.list_goals(&input.counter_id))
            .await
    }

    // ── Traffic sources ──────────────────────────────────────────────────

    #[tool(description = "Get comprehensive traffic sources overview and summary report.")]
    async fn sources_summary(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "sources_summary",
            self.traffic.sources_summary(&input.counter_id),
        )
        .await
    }

    #[tool(description = "Retrieve search phrases and browser information from traffic sources.")]
    async fn sources_search_phrases(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "sources_search_phrases",
            self.traffic.sources_search_phrases(&input.counter_id),
        )
        .await
    }

    #[tool(
        description = "Analyze different types of traffic sources (organic, direct, referral)."
    )]
    async fn get_traffic_sources_types(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_traffic_sources_types",
            self.traffic.get_traffic_sources_types(&input.counter_id),
        )
        .await
    }

    #[tool(
        description = "Get sessions and users data from search engines with optional robot and new-user filters."
    )]
    async fn get_search_engines_data(
        &self,
        Parameters(input): Parameters<SearchEnginesInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_search_engines_data",
            self.traffic.get_search_engines_data(
                &input.counter_id,
                input.exclude_robots,
                input.new_users_only,
            ),
        )
        .await
    }

    #[tool(
        description = "Identify which traffic sources are most effective in acquiring new users (defaults to last 30 days)."
    )]
    async fn get_new_users_by_source(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_new_users_by_source",
            self.traffic.get_new_users_by_source(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    // ── Content analytics ────────────────────────────────────────────────

    #[tool(description = "Get sources that drive users to website articles.")]
    async fn get_content_analytics_sources(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_content_analytics_sources",
            self.content.get_content_analytics_sources(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Retrieve overall statistics by content category.")]
    async fn get_content_analytics_categories(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_content_analytics_categories",
            self.content.get_content_analytics_categories(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Get statistics on article authors performance.")]
    async fn get_content_analytics_authors(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_content_analytics_authors",
            self.content.get_content_analytics_authors(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Analyze performance by article topics.")]
    async fn get_content_analytics_topics(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_content_analytics_topics",
            self.content.get_content_analytics_topics(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Get detailed report on article views grouped by article.")]
    async fn get_content_analytics_articles(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_content_analytics_articles",
            self.content.get_content_analytics_articles(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    // ── User behavior & demographics ─────────────────────────────────────

    #[tool(description = "Access user demographics and engagement by device category.")]
    async fn get_user_demographics(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_user_demographics",
            self.demographics.get_user_demographics(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Analyze user behavior by browser and operating system.")]
    async fn get_device_analysis(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_device_analysis",
            self.demographics.get_device_analysis(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(
        description = "Compare traffic and engagement metrics between mobile and desktop users."
    )]
    async fn get_mobile_vs_desktop(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_mobile_vs_desktop",
            self.demographics.get_mobile_vs_desktop(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(
        description = "Get sessions where users viewed more than the specified number of pages."
    )]
    async fn get_page_depth_analysis(
        &self,
        Parameters(input): Parameters<PageDepthInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_page_depth_analysis",
            self.demographics
                .get_page_depth_analysis(&input.counter_id, input.min_pages),
        )
        .await
    }

    // ── Geographic ───────────────────────────────────────────────────────

    #[tool(description = "Get sessions and users data for specific regions/cities.")]
    async fn get_regional_data(
        &self,
        Parameters(input): Parameters<RegionalDataInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_regional_data",
            self.geographic
                .get_regional_data(&input.counter_id, input.cities.as_deref()),
        )
        .await
    }

    #[tool(description = "Analyze geographical distribution of organic traffic.")]
    async fn get_geographical_organic_traffic(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_geographical_organic_traffic",
            self.geographic.get_geographical_organic_traffic(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    // ── Performance & conversion ─────────────────────────────────────────

    #[tool(description = "Get page performance and bounce rate by URL path.")]
    async fn get_page_performance(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_page_performance",
            self.performance.get_page_performance(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Track conversion rates for specified goals.")]
    async fn get_goals_conversion(
        &self,
        Parameters(input): Parameters<GoalsConversionInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_goals_conversion",
            self.performance
                .get_goals_conversion(&input.counter_id, &input.goal_ids),
        )
        .await
    }

    #[tool(description = "Analyze organic search performance by search engine and query.")]
    async fn get_organic_search_performance(
        &self,
        Parameters(input): Parameters<CounterDateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_organic_search_performance",
            self.performance.get_organic_search_performance(
                &input.counter_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Get conversion rate analysis by traffic source and landing page.")]
    async fn get_conversion_rate_by_source_and_landing(
        &self,
        Parameters(input): Parameters<ConversionBySourceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_conversion_rate_by_source_and_landing",
            self.performance.get_conversion_rate_by_source_and_landing(
                &input.counter_id,
                input.goal_id,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    // ── Advanced analytics ───────────────────────────────────────────────

    #[tool(description = "Get e-commerce performance by product category and region.")]
    async fn get_ecommerce_performance(
        &self,
        Parameters(input): Parameters<EcommerceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_ecommerce_performance",
            self.advanced.get_ecommerce_performance(
                &input.counter_id,
                &input.currency,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
            ),
        )
        .await
    }

    #[tool(
        description = "Get data for specific time periods grouped by day/week/month/quarter/year."
    )]
    async fn get_data_by_time(
        &self,
        Parameters(input): Parameters<DataByTimeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_data_by_time",
            self.advanced.get_data_by_time(
                &input.counter_id,
                &input.metrics,
                input.date_from.as_deref(),
                input.date_to.as_deref(),
                input.dimensions.as_deref(),
                &input.group,
                input.top_keys,
                input.timezone.as_deref(),
            ),
        )
        .await
    }

    #[tool(description = "Get bounce rate for specific Yandex Direct A/B experiments.")]
    async fn get_yandex_direct_experiment(
        &self,
        Parameters(input): Parameters<DirectExperimentInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_yandex_direct_experiment",
            self.advanced
                .get_yandex_direct_experiment(&input.counter_id, input.experiment_id),
        )
        .await
    }

    #[tool(description = "Get browsers report without accounting for browser version.")]
    async fn get_browsers_report(
        &self,
        Parameters(input): Parameters<CounterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_browsers_report",
            self.advanced.get_browsers_report(&input.counter_id),
        )
        .await
    }

    #[tool(
        description = "Generate a single branch of a hierarchical tree-view report (drill-down)."
    )]
    async fn get_drilldown(
        &self,
        Parameters(input): Parameters<DrilldownInput>,
    ) -> Result<CallToolResult, McpError> {
        self.run(
            "get_drilldown",
            self.advanced.get_drilldown(
                &input.counter_id,
                &input.dimensions,
                &input.metrics,
                input.parent_id.as_deref(),
                input.date_from.as_deref(),
                input.date_to.as_deref(),
                input.limit,
            ),
        )
        .await
    }
}

#[tool_handler]
impl ServerHandler for MetrikaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "metrika-mcp-server".to_owned(),
                title: Some("Metrika MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Yandex Metrika analytics tools: traffic, content, demographics, \
                geography, performance, and e-commerce reports.\n\
                \n\
                ## Workflow\n\
                1. Call `list_counters` to discover counter IDs available to this account\n\
                2. Use the `counter_id` in all other tool calls\n\
                3. Dates are `YYYY-MM-DD`; most tools accept an optional date range\n\
                \n\
                ## Notes\n\
                - `get_visits` defaults to the last 7 days, `get_new_users_by_source` to the last 30 days\n\
                - `get_goals_conversion` needs goal IDs; get them from `list_goals`\n\
                - All tools are read-only; nothing is written to Yandex Metrika"
                    .to_string(),
            ),
        }
    }
}
