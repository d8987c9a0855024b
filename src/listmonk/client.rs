use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::json;
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::http::{HttpClient, RequestDescriptor, Result};

use super::types::{
    ArchiveInput, Campaign, CampaignInput, CampaignStatus, ListCampaignsParams, ListListsParams,
    MailingList, Page, Subscriber, SubscriberInput, Template, TransactionalMessage,
};

/// Typed operations on the Listmonk REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListmonkApi: Send + Sync {
    async fn list_lists(&self, params: &ListListsParams) -> Result<Page<MailingList>>;
    async fn list_campaigns(&self, params: &ListCampaignsParams) -> Result<Page<Campaign>>;
    async fn get_campaign(&self, id: u64) -> Result<Campaign>;
    async fn create_campaign(&self, input: &CampaignInput) -> Result<Campaign>;
    async fn update_campaign(&self, id: u64, input: &CampaignInput) -> Result<Campaign>;
    async fn update_campaign_status(&self, id: u64, status: CampaignStatus) -> Result<Campaign>;
    async fn update_campaign_archive(&self, id: u64, input: &ArchiveInput) -> Result<bool>;
    async fn delete_campaign(&self, id: u64) -> Result<()>;
    async fn create_subscriber(&self, input: &SubscriberInput) -> Result<Subscriber>;
    async fn list_templates(&self) -> Result<Vec<Template>>;
    async fn send_transactional(&self, message: &TransactionalMessage) -> Result<bool>;
}

pub struct ListmonkClient {
    http: HttpClient,
}

impl ListmonkClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    async fn send_json<T, B>(&self, descriptor: RequestDescriptor, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.http.execute_as(descriptor.with_json(body)?).await
    }
}

/// Appends a query string built from the given pairs, if any.
fn with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            any = true;
        }
    }

    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}

/// Zero and empty values are treated as unset.
fn positive(value: Option<u32>) -> Option<String> {
    value.filter(|v| *v > 0).map(|v| v.to_string())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn campaign_path(id: u64) -> String {
    format!("/api/campaigns/{}", id)
}

#[async_trait]
impl ListmonkApi for ListmonkClient {
    #[tracing::instrument(skip(self))]
    async fn list_lists(&self, params: &ListListsParams) -> Result<Page<MailingList>> {
        let path = with_query(
            "/api/lists",
            &[
                ("page", positive(params.page)),
                ("per_page", positive(params.per_page)),
                ("query", non_empty(&params.query)),
                ("tag", non_empty(&params.tag)),
            ],
        );
        debug!("Listing mailing lists: {}", path);
        self.http.execute_as(RequestDescriptor::get(path)).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_campaigns(&self, params: &ListCampaignsParams) -> Result<Page<Campaign>> {
        let path = with_query(
            "/api/campaigns",
            &[
                ("page", positive(params.page)),
                ("per_page", positive(params.per_page)),
            ],
        );
        debug!("Listing campaigns: {}", path);
        self.http.execute_as(RequestDescriptor::get(path)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_campaign(&self, id: u64) -> Result<Campaign> {
        self.http.execute_as(RequestDescriptor::get(campaign_path(id))).await
    }

    #[tracing::instrument(skip(self, input))]
    async fn create_campaign(&self, input: &CampaignInput) -> Result<Campaign> {
        self.send_json(RequestDescriptor::post("/api/campaigns"), input).await
    }

    #[tracing::instrument(skip(self, input))]
    async fn update_campaign(&self, id: u64, input: &CampaignInput) -> Result<Campaign> {
        self.send_json(RequestDescriptor::put(campaign_path(id)), input).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(&self, id: u64, status: CampaignStatus) -> Result<Campaign> {
        let path = format!("{}/status", campaign_path(id));
        self.send_json(RequestDescriptor::put(path), &json!({ "status": status }))
            .await
    }

    #[tracing::instrument(skip(self, input))]
    async fn update_campaign_archive(&self, id: u64, input: &ArchiveInput) -> Result<bool> {
        let path = format!("{}/archive", campaign_path(id));
        self.send_json(RequestDescriptor::put(path), input).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, id: u64) -> Result<()> {
        self.http
            .execute(RequestDescriptor::delete(campaign_path(id)))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, input))]
    async fn create_subscriber(&self, input: &SubscriberInput) -> Result<Subscriber> {
        self.send_json(RequestDescriptor::post("/api/subscribers"), input).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_templates(&self) -> Result<Vec<Template>> {
        self.http.execute_as(RequestDescriptor::get("/api/templates")).await
    }

    #[tracing::instrument(skip(self, message))]
    async fn send_transactional(&self, message: &TransactionalMessage) -> Result<bool> {
        self.send_json(RequestDescriptor::post("/api/tx"), message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Error, FailureKind};
    use crate::listmonk::types::{ContentType, SubscriberStatus};
    use mockito::Matcher;
    use std::time::Duration;

    fn client(base_url: &str) -> ListmonkClient {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            username: "api".to_string(),
            api_key: "secret".to_string(),
            timeout: Duration::from_secs(5),
            retry_count: 0,
        };
        ListmonkClient::new(&config).unwrap()
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/api/lists", &[("page", None)]), "/api/lists");
        assert_eq!(
            with_query(
                "/api/lists",
                &[("page", Some("2".into())), ("query", Some("news letter".into()))]
            ),
            "/api/lists?page=2&query=news+letter"
        );
        assert_eq!(positive(Some(0)), None);
        assert_eq!(non_empty(&Some(String::new())), None);
    }

    #[tokio::test]
    async fn test_list_lists() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/lists")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("per_page".into(), "10".into()),
                Matcher::UrlEncoded("tag".into(), "news".into()),
            ]))
            .match_header("authorization", "Basic YXBpOnNlY3JldA==")
            .with_status(200)
            .with_body(
                r#"{"data":{"results":[{"id":1,"name":"Weekly","type":"public","optin":"single","tags":["news"],"subscriber_count":42}],"total":11,"per_page":10,"page":2}}"#,
            )
            .create_async()
            .await;

        let params = ListListsParams {
            page: Some(2),
            per_page: Some(10),
            query: None,
            tag: Some("news".into()),
        };
        let page = client(&server.url()).list_lists(&params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "Weekly");
        assert_eq!(page.results[0].subscriber_count, Some(42));
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_get_campaign() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/campaigns/7")
            .with_status(200)
            .with_body(r#"{"data":{"id":7,"name":"Launch","subject":"Hi","status":"draft","lists":[{"id":3,"name":"All"}]}}"#)
            .create_async()
            .await;

        let campaign = client(&server.url()).get_campaign(7).await.unwrap();

        mock.assert_async().await;
        assert_eq!(campaign.id, 7);
        assert_eq!(campaign.status.as_deref(), Some("draft"));
        assert_eq!(campaign.list_ids(), vec![3]);
    }

    #[tokio::test]
    async fn test_create_campaign_sends_snake_case_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/campaigns")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "name": "Launch",
                "subject": "Hi",
                "lists": [1, 2],
                "content_type": "markdown",
                "from_email": "news@example.com"
            })))
            .with_status(200)
            .with_body(r#"{"data":{"id":11,"name":"Launch","subject":"Hi","status":"draft"}}"#)
            .create_async()
            .await;

        let input = CampaignInput {
            name: Some("Launch".into()),
            subject: Some("Hi".into()),
            lists: Some(vec![1, 2]),
            content_type: Some(ContentType::Markdown),
            from_email: Some("news@example.com".into()),
            ..Default::default()
        };
        let campaign = client(&server.url()).create_campaign(&input).await.unwrap();

        mock.assert_async().await;
        assert_eq!(campaign.id, 11);
    }

    #[tokio::test]
    async fn test_update_campaign_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/campaigns/5/status")
            .match_body(Matcher::Json(serde_json::json!({"status": "scheduled"})))
            .with_status(200)
            .with_body(r#"{"data":{"id":5,"name":"n","subject":"s","status":"scheduled"}}"#)
            .create_async()
            .await;

        let campaign = client(&server.url())
            .update_campaign_status(5, CampaignStatus::Scheduled)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(campaign.status.as_deref(), Some("scheduled"));
    }

    #[tokio::test]
    async fn test_update_campaign_archive() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/campaigns/5/archive")
            .match_body(Matcher::Json(serde_json::json!({
                "archive": true,
                "archive_template_id": 2,
                "archive_meta": {"name": "Subscriber"}
            })))
            .with_status(200)
            .with_body(r#"{"data":true}"#)
            .create_async()
            .await;

        let mut meta = serde_json::Map::new();
        meta.insert("name".into(), serde_json::json!("Subscriber"));
        let input = ArchiveInput {
            archive: true,
            archive_template_id: Some(2),
            archive_meta: Some(meta),
        };
        let updated = client(&server.url())
            .update_campaign_archive(5, &input)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(updated);
    }

    #[tokio::test]
    async fn test_delete_campaign() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/campaigns/9")
            .with_status(200)
            .with_body(r#"{"data":true}"#)
            .create_async()
            .await;

        client(&server.url()).delete_campaign(9).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_subscriber() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/subscribers")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "ada@example.com",
                "name": "Ada",
                "status": "enabled",
                "lists": [1],
                "preconfirm_subscriptions": true
            })))
            .with_status(200)
            .with_body(r#"{"data":{"id":21,"email":"ada@example.com","name":"Ada","status":"enabled","lists":[]}}"#)
            .create_async()
            .await;

        let input = SubscriberInput {
            email: "ada@example.com".into(),
            name: "Ada".into(),
            status: SubscriberStatus::Enabled,
            lists: Some(vec![1]),
            attribs: None,
            preconfirm_subscriptions: Some(true),
        };
        let subscriber = client(&server.url()).create_subscriber(&input).await.unwrap();

        mock.assert_async().await;
        assert_eq!(subscriber.id, Some(21));
    }

    #[tokio::test]
    async fn test_list_templates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/templates")
            .with_status(200)
            .with_body(r#"{"data":[{"id":1,"name":"Default","type":"campaign","is_default":true},{"id":2,"name":"Welcome","type":"tx","subject":"Hi"}]}"#)
            .create_async()
            .await;

        let templates = client(&server.url()).list_templates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].template_type.as_deref(), Some("tx"));
    }

    #[tokio::test]
    async fn test_send_transactional() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tx")
            .match_body(Matcher::Json(serde_json::json!({
                "subscriber_email": "ada@example.com",
                "template_id": 3
            })))
            .with_status(200)
            .with_body(r#"{"data":true}"#)
            .create_async()
            .await;

        let message = TransactionalMessage {
            subscriber_email: Some("ada@example.com".into()),
            template_id: Some(3),
            ..Default::default()
        };
        let sent = client(&server.url()).send_transactional(&message).await.unwrap();

        mock.assert_async().await;
        assert!(sent);
    }

    #[tokio::test]
    async fn test_not_found_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/campaigns/404")
            .with_status(404)
            .with_body(r#"{"message":"Campaign not found."}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url()).get_campaign(404).await.unwrap_err();

        mock.assert_async().await;
        let api = err.as_api().unwrap();
        assert_eq!(api.kind(), FailureKind::Status);
        assert_eq!(api.status(), 404);
        assert_eq!(api.message(), "Campaign not found.");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/templates")
            .with_status(200)
            .with_body(r#"{"data":{"unexpected":true}}"#)
            .create_async()
            .await;

        let err = client(&server.url()).list_templates().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
