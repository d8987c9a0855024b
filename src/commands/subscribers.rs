use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use crate::{
    listmonk::{ListmonkApi, SubscriberInput, SubscriberStatus},
    runtime::Runtime,
};

use super::input::{parse_integer_list, parse_json_object, read_inline_or_file};

#[derive(clap::Subcommand, Debug)]
pub enum SubscribersCommand {
    /// Create a subscriber
    Create(CreateSubscriberArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateSubscriberArgs {
    /// Subscriber email address
    #[arg(long)]
    pub email: String,

    /// Subscriber name
    #[arg(long)]
    pub name: String,

    /// List IDs to subscribe (space or comma separated, e.g. --lists 1 2)
    #[arg(long, value_name = "IDS", num_args = 1..)]
    pub lists: Option<Vec<String>>,

    /// Subscriber status (enabled, blocklisted)
    #[arg(long, default_value = "enabled")]
    pub status: SubscriberStatus,

    /// Subscriber attributes as a JSON object
    #[arg(long, value_name = "JSON")]
    pub attribs: Option<String>,

    /// Read subscriber attributes JSON from file
    #[arg(long, value_name = "PATH")]
    pub attribs_file: Option<PathBuf>,

    /// Preconfirm list subscriptions (skip double opt-in)
    #[arg(long)]
    pub preconfirm_subscriptions: bool,
}

#[tracing::instrument(skip(api, runtime, out))]
pub async fn run<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    command: SubscribersCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        SubscribersCommand::Create(args) => create(api, runtime, args, out).await,
    }
}

async fn create<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    args: CreateSubscriberArgs,
    out: &mut W,
) -> Result<()> {
    let lists = args
        .lists
        .as_deref()
        .map(|values| parse_integer_list(values, "lists"))
        .transpose()?;
    let attribs = read_inline_or_file(runtime, args.attribs, args.attribs_file, "attribs")?
        .map(|raw| parse_json_object(&raw, "attribs"))
        .transpose()?;

    let input = SubscriberInput {
        email: args.email,
        name: args.name,
        status: args.status,
        lists,
        attribs,
        preconfirm_subscriptions: args.preconfirm_subscriptions.then_some(true),
    };

    let subscriber = api.create_subscriber(&input).await?;
    let id = subscriber.id.map(|id| id.to_string()).unwrap_or_default();
    writeln!(out, "Created subscriber {} ({}).", id, subscriber.email)?;
    Ok(())
}
