use anyhow::{Result, bail};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

use crate::{
    listmonk::{
        ArchiveInput, Campaign, CampaignInput, CampaignStatus, CampaignType, ContentType,
        ListCampaignsParams, ListmonkApi,
    },
    runtime::Runtime,
};

use super::input::{parse_integer_list, parse_json_object, parse_string_list, read_inline_or_file};
use super::table::Table;

#[derive(clap::Subcommand, Debug)]
pub enum CampaignsCommand {
    /// Create a new campaign
    Create(CreateArgs),

    /// List campaigns
    List(ListArgs),

    /// Fetch a campaign and print its content
    Get(GetArgs),

    /// Update an existing campaign
    Update(UpdateArgs),

    /// Schedule or change the status of a campaign
    Schedule(ScheduleArgs),

    /// Manage public archive settings for a campaign
    Archive(ArchiveArgs),

    /// Delete a campaign
    Delete(DeleteArgs),
}

/// Content and delivery settings shared by `create` and `update`.
#[derive(clap::Args, Debug, Default)]
pub struct CampaignFields {
    /// Campaign body content
    #[arg(long)]
    pub body: Option<String>,

    /// Read body content from file
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,

    /// Sender email address
    #[arg(long, value_name = "EMAIL")]
    pub from_email: Option<String>,

    /// Content type (richtext, html, markdown, plain)
    #[arg(long, value_name = "TYPE")]
    pub content_type: Option<ContentType>,

    /// Messenger (default: email)
    #[arg(long)]
    pub messenger: Option<String>,

    /// Campaign type (regular, optin)
    #[arg(long = "type", value_name = "TYPE")]
    pub campaign_type: Option<CampaignType>,

    /// Tags to assign to the campaign
    #[arg(long, num_args = 1..)]
    pub tags: Option<Vec<String>>,

    /// Template ID
    #[arg(long, value_name = "ID")]
    pub template_id: Option<u64>,

    /// Schedule timestamp in ISO-8601 format
    #[arg(long, value_name = "ISO")]
    pub send_at: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct CreateArgs {
    /// Campaign name
    #[arg(long)]
    pub name: String,

    /// Email subject
    #[arg(long)]
    pub subject: String,

    /// List IDs to target (space or comma separated, e.g. --lists 1 2)
    #[arg(long, value_name = "IDS", num_args = 1.., required = true)]
    pub lists: Vec<String>,

    #[command(flatten)]
    pub fields: CampaignFields,
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<CampaignStatus>,

    /// Filter by campaign type (regular, optin)
    #[arg(long = "type", value_name = "TYPE")]
    pub campaign_type: Option<CampaignType>,

    /// Filter by campaign name (substring match)
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by name or subject (substring match)
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct GetArgs {
    /// Campaign identifier
    pub id: u64,

    /// Output the raw campaign JSON
    #[arg(long)]
    pub json: bool,

    /// Print only the campaign body (for piping)
    #[arg(long)]
    pub body_only: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct UpdateArgs {
    /// Campaign identifier
    pub id: u64,

    /// Campaign name
    #[arg(long)]
    pub name: Option<String>,

    /// Email subject
    #[arg(long)]
    pub subject: Option<String>,

    /// List IDs to target; auto-filled from the campaign when only --send-at is given
    #[arg(long, value_name = "IDS", num_args = 1..)]
    pub lists: Option<Vec<String>>,

    #[command(flatten)]
    pub fields: CampaignFields,
}

#[derive(clap::Args, Debug)]
pub struct ScheduleArgs {
    /// Campaign identifier
    pub id: u64,

    /// Target status
    #[arg(long, default_value = "scheduled")]
    pub status: CampaignStatus,

    /// Schedule timestamp in ISO-8601 format (lists are taken from the campaign)
    #[arg(long, value_name = "ISO")]
    pub send_at: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct ArchiveArgs {
    /// Campaign identifier
    pub id: u64,

    /// Enable public archive for the campaign
    #[arg(long)]
    pub enable: bool,

    /// Disable public archive for the campaign
    #[arg(long)]
    pub disable: bool,

    /// Archive template ID
    #[arg(long, value_name = "ID")]
    pub template_id: Option<u64>,

    /// Archive metadata as JSON
    #[arg(long, value_name = "JSON")]
    pub meta: Option<String>,

    /// Read archive metadata JSON from file
    #[arg(long, value_name = "PATH")]
    pub meta_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Default)]
pub struct DeleteArgs {
    /// Campaign identifier
    pub id: u64,
}

#[tracing::instrument(skip(api, runtime, out))]
pub async fn run<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    command: CampaignsCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        CampaignsCommand::Create(args) => create(api, runtime, args, out).await,
        CampaignsCommand::List(args) => list(api, args, out).await,
        CampaignsCommand::Get(args) => get(api, args, out).await,
        CampaignsCommand::Update(args) => update(api, runtime, args, out).await,
        CampaignsCommand::Schedule(args) => schedule(api, args, out).await,
        CampaignsCommand::Archive(args) => archive(api, runtime, args, out).await,
        CampaignsCommand::Delete(args) => delete(api, args, out).await,
    }
}

async fn create<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    args: CreateArgs,
    out: &mut W,
) -> Result<()> {
    let lists = parse_integer_list(&args.lists, "lists")?;
    let mut input = campaign_input(runtime, args.fields)?;
    input.name = Some(args.name);
    input.subject = Some(args.subject);
    input.lists = Some(lists);

    let campaign = api.create_campaign(&input).await?;
    writeln!(
        out,
        "Created campaign {} ({}) with status {}.",
        campaign.id,
        campaign.name,
        campaign.status.as_deref().unwrap_or("draft")
    )?;
    Ok(())
}

async fn list<A: ListmonkApi, W: Write>(api: &A, args: ListArgs, out: &mut W) -> Result<()> {
    let params = ListCampaignsParams {
        page: args.page,
        per_page: args.per_page,
    };
    let page = api.list_campaigns(&params).await?;
    let results = filter_campaigns(&page.results, &args);
    debug!("{} of {} campaign(s) match", results.len(), page.results.len());

    if results.is_empty() {
        writeln!(out, "No campaigns found.")?;
        return Ok(());
    }

    let mut table = Table::new(&["id", "name", "status", "type", "send_at", "lists"]);
    for campaign in &results {
        table.push(vec![
            campaign.id.to_string(),
            campaign.name.clone(),
            campaign.status.clone().unwrap_or_default(),
            campaign.campaign_type.clone().unwrap_or_default(),
            campaign.send_at.clone().unwrap_or_default(),
            campaign.lists.len().to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;

    writeln!(
        out,
        "Page {} / {} • Total: {} • Showing: {}",
        page.page,
        page.total_pages(),
        page.total,
        results.len()
    )?;
    Ok(())
}

/// Applies the status, type, name, and query filters of `campaigns list`.
///
/// Name and query matching is a case-insensitive substring match; the query
/// also looks at the subject.
pub fn filter_campaigns<'a>(campaigns: &'a [Campaign], args: &ListArgs) -> Vec<&'a Campaign> {
    let name = args.name.as_deref().map(str::to_lowercase);
    let query = args.query.as_deref().map(str::to_lowercase);

    campaigns
        .iter()
        .filter(|c| match args.status {
            Some(status) => c.status.as_deref() == Some(status.as_str()),
            None => true,
        })
        .filter(|c| match args.campaign_type {
            Some(kind) => c.campaign_type.as_deref() == Some(kind.as_str()),
            None => true,
        })
        .filter(|c| match &name {
            Some(needle) => c.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|c| match &query {
            Some(needle) => {
                c.name.to_lowercase().contains(needle.as_str())
                    || c.subject.to_lowercase().contains(needle.as_str())
            }
            None => true,
        })
        .collect()
}

async fn get<A: ListmonkApi, W: Write>(api: &A, args: GetArgs, out: &mut W) -> Result<()> {
    if args.json && args.body_only {
        bail!("Use either --json or --body-only, not both.");
    }

    let campaign = api.get_campaign(args.id).await?;

    if args.body_only {
        write!(out, "{}", campaign.body.as_deref().unwrap_or(""))?;
        return Ok(());
    }

    let output = format_campaign_output(&campaign, args.json)?;
    write!(out, "{}", output)?;
    if !output.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Renders a campaign as pretty JSON or as a header block followed by its body.
pub fn format_campaign_output(campaign: &Campaign, json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(campaign)?));
    }

    let mut lines = vec![
        format!("ID: {}", campaign.id),
        format!("Name: {}", campaign.name),
        format!("Subject: {}", campaign.subject),
    ];
    let optional = [
        ("Status", &campaign.status),
        ("Type", &campaign.campaign_type),
        ("Messenger", &campaign.messenger),
        ("Content-Type", &campaign.content_type),
        ("From", &campaign.from_email),
        ("Send-At", &campaign.send_at),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("{}: {}", label, value));
        }
    }

    let list_ids = campaign.list_ids();
    if !list_ids.is_empty() {
        let ids: Vec<String> = list_ids.iter().map(u64::to_string).collect();
        lines.push(format!("Lists: {}", ids.join(", ")));
    }
    if !campaign.tags.is_empty() {
        lines.push(format!("Tags: {}", campaign.tags.join(", ")));
    }

    lines.push(String::new());
    lines.push("--- BODY ---".to_string());
    lines.push(campaign.body.clone().unwrap_or_default());

    Ok(format!("{}\n", lines.join("\n")))
}

async fn update<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    args: UpdateArgs,
    out: &mut W,
) -> Result<()> {
    let mut input = campaign_input(runtime, args.fields)?;
    input.name = args.name;
    input.subject = args.subject;
    if let Some(lists) = &args.lists {
        input.lists = Some(parse_integer_list(lists, "lists")?);
    }

    if input.send_at.is_some() && input.lists.is_none() {
        let lists = current_list_ids(api, args.id).await?;
        if lists.is_empty() {
            bail!("Campaign has no lists assigned; please pass --lists explicitly.");
        }
        input.lists = Some(lists);
    }

    if input.is_empty() {
        writeln!(out, "No changes supplied. Nothing to update.")?;
        return Ok(());
    }

    let updated = api.update_campaign(args.id, &input).await?;
    writeln!(
        out,
        "Updated campaign {} ({}). Current status: {}.",
        updated.id,
        updated.name,
        updated.status.as_deref().unwrap_or("unknown")
    )?;
    Ok(())
}

async fn schedule<A: ListmonkApi, W: Write>(api: &A, args: ScheduleArgs, out: &mut W) -> Result<()> {
    if let Some(send_at) = args.send_at {
        let lists = current_list_ids(api, args.id).await?;
        if lists.is_empty() {
            bail!("Campaign has no lists assigned; please pass --lists via update before scheduling.");
        }
        info!("Setting send_at of campaign {} to {}", args.id, send_at);
        let input = CampaignInput {
            send_at: Some(send_at),
            lists: Some(lists),
            ..Default::default()
        };
        api.update_campaign(args.id, &input).await?;
    }

    let updated = api.update_campaign_status(args.id, args.status).await?;
    let status = updated
        .status
        .unwrap_or_else(|| args.status.as_str().to_string());
    writeln!(out, "Campaign {} now has status {}.", updated.id, status)?;
    Ok(())
}

async fn archive<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    args: ArchiveArgs,
    out: &mut W,
) -> Result<()> {
    let archive = match (args.enable, args.disable) {
        (true, true) => bail!("Use either --enable or --disable, not both."),
        (true, false) => true,
        (false, true) => false,
        (false, false) => bail!("Specify --enable or --disable to set the archive state."),
    };

    let archive_meta = read_inline_or_file(runtime, args.meta, args.meta_file, "meta")?
        .map(|raw| parse_json_object(&raw, "Archive metadata"))
        .transpose()?;

    let input = ArchiveInput {
        archive,
        archive_template_id: args.template_id,
        archive_meta,
    };
    api.update_campaign_archive(args.id, &input).await?;

    writeln!(
        out,
        "Campaign {} archive {}.",
        args.id,
        if archive { "enabled" } else { "disabled" }
    )?;
    Ok(())
}

async fn delete<A: ListmonkApi, W: Write>(api: &A, args: DeleteArgs, out: &mut W) -> Result<()> {
    api.delete_campaign(args.id).await?;
    writeln!(out, "Deleted campaign {}.", args.id)?;
    Ok(())
}

async fn current_list_ids<A: ListmonkApi>(api: &A, id: u64) -> Result<Vec<u64>> {
    let campaign = api.get_campaign(id).await?;
    debug!("Campaign {} targets lists {:?}", id, campaign.list_ids());
    Ok(campaign.list_ids())
}

fn campaign_input<R: Runtime>(runtime: &R, fields: CampaignFields) -> Result<CampaignInput> {
    let body = read_inline_or_file(runtime, fields.body, fields.body_file, "body")?;

    Ok(CampaignInput {
        body,
        from_email: fields.from_email,
        content_type: fields.content_type,
        messenger: fields.messenger,
        campaign_type: fields.campaign_type,
        tags: fields.tags.map(parse_string_list),
        template_id: fields.template_id,
        send_at: fields.send_at,
        ..Default::default()
    })
}
