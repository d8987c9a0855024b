use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::listmonk::{ListListsParams, ListmonkApi};

use super::table::Table;

#[derive(clap::Args, Debug, Default)]
pub struct ListsArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Filter by name or description
    #[arg(long)]
    pub query: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,
}

/// List mailing lists
#[tracing::instrument(skip(api, out))]
pub async fn lists<A: ListmonkApi, W: Write>(api: &A, args: ListsArgs, out: &mut W) -> Result<()> {
    let params = ListListsParams {
        page: args.page,
        per_page: args.per_page,
        query: args.query,
        tag: args.tag,
    };

    let page = api.list_lists(&params).await?;
    debug!("Fetched {} list(s) of {}", page.results.len(), page.total);

    if page.results.is_empty() {
        writeln!(out, "No lists found.")?;
        return Ok(());
    }

    let mut table = Table::new(&["id", "name", "type", "optin", "subscribers", "tags"]);
    for list in &page.results {
        table.push(vec![
            list.id.to_string(),
            list.name.clone(),
            list.list_type.clone().unwrap_or_default(),
            list.optin.clone().unwrap_or_default(),
            list.subscriber_count.unwrap_or(0).to_string(),
            list.tags.join(", "),
        ]);
    }
    write!(out, "{}", table.render())?;

    writeln!(
        out,
        "Page {} / {} • Total: {}",
        page.page,
        page.total_pages(),
        page.total
    )?;

    Ok(())
}
