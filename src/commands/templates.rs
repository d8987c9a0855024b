use anyhow::Result;
use std::io::Write;

use crate::listmonk::{ListmonkApi, Template, TemplateType};

use super::table::Table;

#[derive(clap::Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List templates
    List(ListTemplatesArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ListTemplatesArgs {
    /// Filter by template type (campaign, campaign_visual, tx)
    #[arg(long = "type", value_name = "TYPE")]
    pub template_type: Option<TemplateType>,

    /// Filter by template name (substring match)
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by name or subject (substring match)
    #[arg(long)]
    pub query: Option<String>,
}

#[tracing::instrument(skip(api, out))]
pub async fn run<A: ListmonkApi, W: Write>(
    api: &A,
    command: TemplatesCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        TemplatesCommand::List(args) => list(api, args, out).await,
    }
}

async fn list<A: ListmonkApi, W: Write>(api: &A, args: ListTemplatesArgs, out: &mut W) -> Result<()> {
    let templates = api.list_templates().await?;
    let results = filter_templates(&templates, &args);

    if results.is_empty() {
        writeln!(out, "No templates found.")?;
        return Ok(());
    }

    let mut table = Table::new(&["id", "name", "type", "subject", "is_default"]);
    for template in &results {
        table.push(vec![
            template.id.map(|id| id.to_string()).unwrap_or_default(),
            template.name.clone(),
            template.template_type.clone().unwrap_or_default(),
            template.subject.clone().unwrap_or_default(),
            template.is_default.unwrap_or(false).to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;
    writeln!(out, "Total: {}", results.len())?;
    Ok(())
}

fn filter_templates<'a>(templates: &'a [Template], args: &ListTemplatesArgs) -> Vec<&'a Template> {
    let name = args.name.as_deref().map(str::to_lowercase);
    let query = args.query.as_deref().map(str::to_lowercase);

    templates
        .iter()
        .filter(|t| match args.template_type {
            Some(kind) => t.template_type.as_deref() == Some(kind.as_str()),
            None => true,
        })
        .filter(|t| match &name {
            Some(needle) => t.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|t| match &query {
            Some(needle) => {
                let subject = t.subject.as_deref().unwrap_or("").to_lowercase();
                t.name.to_lowercase().contains(needle.as_str()) || subject.contains(needle.as_str())
            }
            None => true,
        })
        .collect()
}
