use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Treats an explicit `null` like a missing field. Listmonk returns empty
/// Postgres arrays as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One page of a paginated listing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub results: Vec<T>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub page: u64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items. A zero page size means
    /// everything fits on one page.
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return u64::from(self.total > 0);
        }
        self.total.div_ceil(self.per_page)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct MailingList {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// List reference embedded in a campaign.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CampaignList {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A campaign as returned by the server.
///
/// Enumerated fields stay as plain strings so values added by newer server
/// versions still deserialize. Fields not modelled here are kept in `extra`
/// and written back out by `--json`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Campaign {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<CampaignList>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub template_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messenger: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub send_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Campaign {
    /// IDs of the lists the campaign targets, skipping references without one.
    pub fn list_ids(&self) -> Vec<u64> {
        self.lists
            .iter()
            .filter_map(|list| list.id)
            .filter(|id| *id != 0)
            .collect()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Subscriber {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<MailingList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Template {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A value outside an enumerated set of accepted strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {label} \"{value}\". Allowed values: {allowed}")]
pub struct InvalidValue {
    label: &'static str,
    value: String,
    allowed: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:tt {
            $($variant:ident => $text:tt),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(InvalidValue {
                        label: $label,
                        value: s.to_string(),
                        allowed: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Lifecycle state of a campaign.
    CampaignStatus, "status" {
        Draft => "draft",
        Scheduled => "scheduled",
        Running => "running",
        Paused => "paused",
        Finished => "finished",
        Cancelled => "cancelled",
    }
}

string_enum! {
    CampaignType, "campaign type" {
        Regular => "regular",
        Optin => "optin",
    }
}

string_enum! {
    /// Format of a campaign or transactional message body.
    ContentType, "content type" {
        Richtext => "richtext",
        Html => "html",
        Markdown => "markdown",
        Plain => "plain",
    }
}

string_enum! {
    SubscriberStatus, "subscriber status" {
        Enabled => "enabled",
        Blocklisted => "blocklisted",
    }
}

string_enum! {
    TemplateType, "template type" {
        Campaign => "campaign",
        CampaignVisual => "campaign_visual",
        Tx => "tx",
    }
}

/// Campaign fields to create or update. Unset fields are left out of the payload.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct CampaignInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<CampaignType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
}

impl CampaignInput {
    pub fn is_empty(&self) -> bool {
        *self == CampaignInput::default()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ArchiveInput {
    pub archive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_template_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_meta: Option<Map<String, Value>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubscriberInput {
    pub email: String,
    pub name: String,
    pub status: SubscriberStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribs: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preconfirm_subscriptions: Option<bool>,
}

/// A transactional message addressed by subscriber email or ID and rendered
/// from a template chosen by ID or name.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct TransactionalMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<BTreeMap<String, String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListListsParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub query: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListCampaignsParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_total_pages() {
        let page = |total, per_page| Page::<u64> {
            total,
            per_page,
            ..Default::default()
        };
        assert_eq!(page(45, 20).total_pages(), 3);
        assert_eq!(page(40, 20).total_pages(), 2);
        assert_eq!(page(0, 20).total_pages(), 0);
        assert_eq!(page(7, 0).total_pages(), 1);
        assert_eq!(page(0, 0).total_pages(), 0);
    }

    #[test]
    fn test_campaign_keeps_unknown_fields() {
        let value = json!({
            "id": 3,
            "name": "Launch",
            "subject": "Hello",
            "status": "draft",
            "type": "regular",
            "lists": [{"id": 1, "name": "Default"}, {"id": null, "name": "Gone"}],
            "views": 12,
            "archive": false
        });
        let campaign: Campaign = serde_json::from_value(value).unwrap();

        assert_eq!(campaign.id, 3);
        assert_eq!(campaign.campaign_type.as_deref(), Some("regular"));
        assert_eq!(campaign.list_ids(), vec![1]);
        assert_eq!(campaign.extra.get("views"), Some(&json!(12)));

        let out = serde_json::to_value(&campaign).unwrap();
        assert_eq!(out["views"], json!(12));
        assert_eq!(out["type"], json!("regular"));
    }

    #[test]
    fn test_campaign_accepts_unknown_status() {
        let campaign: Campaign =
            serde_json::from_value(json!({"id": 1, "name": "n", "status": "archived"})).unwrap();
        assert_eq!(campaign.status.as_deref(), Some("archived"));
        assert!(campaign.lists.is_empty());
        assert_eq!(campaign.subject, "");
    }

    #[test]
    fn test_null_arrays_decode_as_empty() {
        let campaign: Campaign = serde_json::from_str(
            r#"{"id":1,"name":"A","subject":"s","tags":null,"lists":null}"#,
        )
        .unwrap();
        assert!(campaign.tags.is_empty());
        assert!(campaign.lists.is_empty());
        assert!(campaign.list_ids().is_empty());
        assert!(!campaign.extra.contains_key("tags"));

        let list: MailingList =
            serde_json::from_str(r#"{"id":2,"name":"Default","tags":null}"#).unwrap();
        assert!(list.tags.is_empty());

        let subscriber: Subscriber =
            serde_json::from_str(r#"{"id":5,"email":"ada@example.com","lists":null}"#).unwrap();
        assert!(subscriber.lists.is_empty());

        let page: Page<MailingList> =
            serde_json::from_str(r#"{"results":null,"total":0,"per_page":20,"page":1}"#).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("scheduled".parse::<CampaignStatus>(), Ok(CampaignStatus::Scheduled));
        assert_eq!(
            "campaign_visual".parse::<TemplateType>(),
            Ok(TemplateType::CampaignVisual)
        );
        assert_eq!(ContentType::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_enum_parse_error_message() {
        let err = "sent".parse::<CampaignStatus>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status \"sent\". Allowed values: draft, scheduled, running, paused, finished, cancelled"
        );

        let err = "text".parse::<ContentType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid content type \"text\". Allowed values: richtext, html, markdown, plain"
        );
    }

    #[test]
    fn test_campaign_input_serialization_omits_unset_fields() {
        let input = CampaignInput {
            name: Some("Launch".into()),
            lists: Some(vec![1, 2]),
            from_email: Some("news@example.com".into()),
            content_type: Some(ContentType::Html),
            campaign_type: Some(CampaignType::Optin),
            template_id: Some(4),
            send_at: Some("2026-01-01T10:00:00Z".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "name": "Launch",
                "lists": [1, 2],
                "from_email": "news@example.com",
                "content_type": "html",
                "type": "optin",
                "template_id": 4,
                "send_at": "2026-01-01T10:00:00Z"
            })
        );
        assert!(!input.is_empty());
        assert!(CampaignInput::default().is_empty());
    }

    #[test]
    fn test_transactional_message_serialization() {
        let mut header = BTreeMap::new();
        header.insert("X-Tag".to_string(), "welcome".to_string());
        let message = TransactionalMessage {
            subscriber_id: Some(9),
            template_name: Some("welcome".into()),
            headers: Some(vec![header]),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "subscriber_id": 9,
                "template_name": "welcome",
                "headers": [{"X-Tag": "welcome"}]
            })
        );
    }
}
