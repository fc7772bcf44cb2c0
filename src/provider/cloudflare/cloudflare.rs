use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::RemoteZone;
use crate::record::{RecordSet, RecordType};
use crate::zone::{Origin, Zone, ZoneEntry};

use super::restful_cli::CfClient;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Auth {
    ApiToken(String),
    ApiKey { email: String, key: String },
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CfZone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(super) struct CfRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub r#type: String,

    pub content: String,

    pub ttl: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl CfRecord {
    /// Provider-side records for one record set, one per value.
    pub fn from_record_set(record: &RecordSet) -> Result<Vec<CfRecord>> {
        record
            .values()
            .iter()
            .map(|value| {
                let (content, priority) = match record.rtype() {
                    RecordType::A
                    | RecordType::AAAA
                    | RecordType::CNAME
                    | RecordType::TXT
                    | RecordType::PTR => (value.clone(), None),
                    RecordType::MX => {
                        let (pref, host) = split_mx(value).ok_or_else(|| {
                            Error::Provider(format!("invalid MX value '{}'", value))
                        })?;
                        (host.to_string(), Some(pref))
                    }
                    ty => {
                        return Err(Error::Provider(format!(
                            "{} records cannot be synced to cloudflare",
                            ty
                        )));
                    }
                };

                Ok(CfRecord {
                    id: None,
                    name: record.name().to_string(),
                    r#type: record.rtype().to_string(),
                    content,
                    ttl: record.ttl(),
                    priority,
                })
            })
            .collect()
    }

    fn into_entry(self) -> ZoneEntry {
        let rtype = RecordType::from(self.r#type.as_str());
        let value = match (&rtype, self.priority) {
            (RecordType::MX, Some(pref)) => format!("{} {}", pref, self.content),
            _ => self.content,
        };
        ZoneEntry::new(self.name, rtype, self.ttl, vec![value])
    }
}

fn split_mx(value: &str) -> Option<(u16, &str)> {
    let (pref, host) = value.trim().split_once(char::is_whitespace)?;
    Some((pref.parse().ok()?, host.trim()))
}

/// A Cloudflare hosted zone seen through the record set model.
pub struct Cloudflare {
    cli: CfClient,
    zone: CfZone,
    origin: Origin,
}

impl Cloudflare {
    pub async fn open(auth: Auth, zone: &str) -> Result<Self> {
        Self::open_with(CfClient::new(auth), zone).await
    }

    /// Like `open`, against another API root.
    pub async fn open_at(base_url: &str, auth: Auth, zone: &str) -> Result<Self> {
        Self::open_with(CfClient::with_base_url(auth, base_url), zone).await
    }

    async fn open_with(cli: CfClient, zone: &str) -> Result<Self> {
        let origin = Origin::new(zone)?;
        log::debug!("setting cloudflare zone to {}", origin);

        let zone = cli
            .zone_list(origin.as_str())
            .await?
            .into_iter()
            .inspect(|z| log::debug!("name: {} id: {}", z.name, z.id))
            .find(|z| fqdn(&z.name) == origin.fqdn())
            .ok_or_else(|| Error::ZoneNotFound(origin.to_string()))?;

        Ok(Self { cli, zone, origin })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Every record in the zone, normalized.
    pub async fn zone(&self) -> Result<Zone> {
        let records = self.cli.records_list(&self.zone.id).await?;
        let entries = records.into_iter().map(CfRecord::into_entry);
        Ok(Zone::normalize(self.origin.clone(), entries)?)
    }
}

fn fqdn(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.').to_ascii_lowercase())
}

#[async_trait]
impl RemoteZone for Cloudflare {
    async fn records(&self, types: &[RecordType]) -> Result<Vec<RecordSet>> {
        Ok(self.zone().await?.records(types))
    }

    async fn create(&self, record: &RecordSet) -> Result<()> {
        log::debug!("creating record in cloudflare for {}", record);
        let posts = CfRecord::from_record_set(record)?;
        self.cli.record_batch(&self.zone.id, vec![], posts).await
    }

    async fn update(&self, record: &RecordSet) -> Result<()> {
        log::debug!("overwriting record in cloudflare for {}", record);
        let posts = CfRecord::from_record_set(record)?;
        let deletes = self
            .cli
            .record_list(&self.zone.id, record.name(), record.rtype().as_str())
            .await?
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        self.cli.record_batch(&self.zone.id, deletes, posts).await
    }
}
