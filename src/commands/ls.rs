use serde_json::json;

use super::CommandOutput;
use crate::board::Board;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::config::Config;
use crate::display::ticket_table;
use crate::error::Result;
use crate::query::{
    ActiveFilters, Admission, FilterClause, SortKey, SortOrder, SortSpec, ViewQuery,
};

/// Options for `ls`
#[derive(Debug, Clone, Default)]
pub struct LsOptions {
    pub filters: Vec<FilterClause>,
    pub sort: Option<SortKey>,
    pub desc: bool,
    pub limit: Option<usize>,
}

/// List tickets through the filter/sort view
pub async fn cmd_ls<B: TicketBackend>(
    backend: B,
    config: &Config,
    options: LsOptions,
    output: OutputOptions,
) -> Result<()> {
    let query = build_query(&options, config.default_sort_spec()?);

    let mut board = Board::new(backend);
    board.refresh().await?;
    let tickets = query.apply(board.tickets());

    let text = if tickets.is_empty() {
        "No tickets found".to_string()
    } else {
        ticket_table(&tickets)
    };

    CommandOutput::new(json!(tickets)).with_text(text).print(output)
}

/// Build the view for `ls`, admitting command-line clauses through the same
/// policy as interactive ones.
fn build_query(options: &LsOptions, default_sort: SortSpec) -> ViewQuery {
    let mut active = ActiveFilters::new();
    for clause in &options.filters {
        match active.push(clause.clone()) {
            Admission::Admitted => {}
            Admission::Blank => {
                tracing::warn!("ignoring filter with empty value: {}=", clause.criterion)
            }
            Admission::Duplicate => tracing::warn!(
                "ignoring duplicate filter: {}={}",
                clause.criterion,
                clause.value
            ),
        }
    }

    let sort = match options.sort {
        Some(key) if options.desc => SortSpec::new(key, SortOrder::Desc),
        Some(key) => SortSpec::new(key, SortOrder::Asc),
        None if options.desc => SortSpec::new(default_sort.key, SortOrder::Desc),
        None => default_sort,
    };

    let mut query = ViewQuery::new()
        .with_filters(active.clauses())
        .with_sort(sort);
    if let Some(limit) = options.limit {
        query = query.with_limit(limit);
    }
    query
}
