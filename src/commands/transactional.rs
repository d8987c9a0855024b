use anyhow::{Result, bail};
use std::io::Write;
use std::path::PathBuf;

use crate::{
    listmonk::{ContentType, ListmonkApi, TransactionalMessage},
    runtime::Runtime,
};

use super::input::{normalize_string, parse_headers, parse_json_object, read_inline_or_file};

#[derive(clap::Subcommand, Debug)]
pub enum TxCommand {
    /// Send a transactional email
    Send(SendArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct SendArgs {
    /// Subscriber email address
    #[arg(long, value_name = "EMAIL")]
    pub subscriber_email: Option<String>,

    /// Subscriber ID
    #[arg(long, value_name = "ID")]
    pub subscriber_id: Option<u64>,

    /// Template ID
    #[arg(long, value_name = "ID")]
    pub template_id: Option<u64>,

    /// Template name
    #[arg(long, value_name = "NAME")]
    pub template_name: Option<String>,

    /// Template data as JSON
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Read template data JSON from file
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Custom headers as a JSON array of objects
    #[arg(long, value_name = "JSON")]
    pub headers: Option<String>,

    /// Read headers JSON from file
    #[arg(long, value_name = "PATH")]
    pub headers_file: Option<PathBuf>,

    /// Messenger (default: email)
    #[arg(long)]
    pub messenger: Option<String>,

    /// Content type (richtext, html, markdown, plain)
    #[arg(long, value_name = "TYPE")]
    pub content_type: Option<ContentType>,
}

#[tracing::instrument(skip(api, runtime, out))]
pub async fn run<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    command: TxCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        TxCommand::Send(args) => send(api, runtime, args, out).await,
    }
}

async fn send<A: ListmonkApi, R: Runtime, W: Write>(
    api: &A,
    runtime: &R,
    args: SendArgs,
    out: &mut W,
) -> Result<()> {
    let subscriber_email = normalize_string(args.subscriber_email);
    let template_name = normalize_string(args.template_name);

    if subscriber_email.is_none() && args.subscriber_id.is_none() {
        bail!("Provide --subscriber-email or --subscriber-id.");
    }
    if args.template_id.is_none() && template_name.is_none() {
        bail!("Provide --template-id or --template-name.");
    }

    let data = read_inline_or_file(runtime, args.data, args.data_file, "data")?
        .map(|raw| parse_json_object(&raw, "data"))
        .transpose()?;
    let headers = read_inline_or_file(runtime, args.headers, args.headers_file, "headers")?
        .map(|raw| parse_headers(&raw))
        .transpose()?;

    let message = TransactionalMessage {
        subscriber_email: subscriber_email.clone(),
        subscriber_id: args.subscriber_id,
        template_id: args.template_id,
        template_name,
        data,
        headers,
        messenger: normalize_string(args.messenger),
        content_type: args.content_type,
    };

    api.send_transactional(&message).await?;

    let target = match (subscriber_email, args.subscriber_id) {
        (Some(email), _) => email,
        (None, Some(id)) => format!("subscriber {}", id),
        (None, None) => String::new(),
    };
    writeln!(out, "Transactional email sent to {}.", target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listmonk::MockListmonkApi;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_by_email() {
        let mut api = MockListmonkApi::new();
        let runtime = MockRuntime::new();
        api.expect_send_transactional()
            .withf(|m| {
                m.subscriber_email.as_deref() == Some("ada@example.com")
                    && m.template_name.as_deref() == Some("welcome")
                    && m.data.as_ref().and_then(|d| d.get("code")) == Some(&json!(42))
                    && m.messenger.is_none()
                    && m.content_type == Some(ContentType::Html)
            })
            .times(1)
            .returning(|_| Ok(true));

        let args = SendArgs {
            subscriber_email: Some(" ada@example.com ".into()),
            template_name: Some("welcome".into()),
            data: Some(r#"{"code":42}"#.into()),
            messenger: Some("  ".into()),
            content_type: Some(ContentType::Html),
            ..Default::default()
        };
        let mut buf = Vec::new();
        run(&api, &runtime, TxCommand::Send(args), &mut buf).await.unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Transactional email sent to ada@example.com.\n"
        );
    }

    #[tokio::test]
    async fn test_send_by_id_with_headers_file() {
        let mut api = MockListmonkApi::new();
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/tmp/headers.json")))
            .returning(|_| Ok(r#"[{"X-Campaign":"spring"}]"#.to_string()));
        api.expect_send_transactional()
            .withf(|m| {
                m.subscriber_id == Some(8)
                    && m.template_id == Some(2)
                    && m.headers.as_ref().map(|h| h[0].get("X-Campaign").cloned())
                        == Some(Some("spring".to_string()))
            })
            .returning(|_| Ok(true));

        let args = SendArgs {
            subscriber_id: Some(8),
            template_id: Some(2),
            headers_file: Some("/tmp/headers.json".into()),
            ..Default::default()
        };
        let mut buf = Vec::new();
        send(&api, &runtime, args, &mut buf).await.unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Transactional email sent to subscriber 8.\n"
        );
    }

    #[tokio::test]
    async fn test_send_requires_recipient_and_template() {
        let api = MockListmonkApi::new();
        let runtime = MockRuntime::new();

        let args = SendArgs {
            subscriber_email: Some("   ".into()),
            template_id: Some(1),
            ..Default::default()
        };
        let err = send(&api, &runtime, args, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Provide --subscriber-email or --subscriber-id.");

        let args = SendArgs {
            subscriber_id: Some(1),
            ..Default::default()
        };
        let err = send(&api, &runtime, args, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Provide --template-id or --template-name.");
    }

    #[tokio::test]
    async fn test_send_rejects_data_and_data_file() {
        let api = MockListmonkApi::new();
        let runtime = MockRuntime::new();
        let args = SendArgs {
            subscriber_id: Some(1),
            template_id: Some(1),
            data: Some("{}".into()),
            data_file: Some("/tmp/data.json".into()),
            ..Default::default()
        };
        let err = send(&api, &runtime, args, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Provide either --data or --data-file, not both.");
    }

    #[tokio::test]
    async fn test_send_rejects_non_object_data() {
        let api = MockListmonkApi::new();
        let runtime = MockRuntime::new();
        let args = SendArgs {
            subscriber_id: Some(1),
            template_id: Some(1),
            data: Some("[1, 2]".into()),
            ..Default::default()
        };
        let err = send(&api, &runtime, args, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "data must be a JSON object.");
    }
}
