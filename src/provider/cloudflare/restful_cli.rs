use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::wrapper::http::{Client, Header, HeaderKey, Response};

use super::cloudflare::{Auth, CfRecord, CfZone};

const API_ROOT: &str = "https://api.cloudflare.com/client/v4";
const PER_PAGE: u32 = 100;

impl From<Auth> for Vec<Header> {
    fn from(auth: Auth) -> Self {
        match auth {
            Auth::ApiToken(api_token) => vec![Header::new(
                HeaderKey::Authorization,
                format!("Bearer {}", api_token),
            )],
            Auth::ApiKey { email, key } => vec![
                Header::new(HeaderKey::Custom("X-Auth-Email".to_string()), email),
                Header::new(HeaderKey::Custom("X-Auth-Key".to_string()), key),
            ],
        }
    }
}

pub(super) struct CfClient {
    base_url: String,
    cli: Client,
}

impl CfClient {
    pub fn new(auth: Auth) -> Self {
        Self::with_base_url(auth, API_ROOT)
    }

    pub fn with_base_url(auth: Auth, base_url: &str) -> Self {
        let mut headers: Vec<Header> = auth.into();
        headers.push(Header::new(
            HeaderKey::ContentType,
            "application/json".to_string(),
        ));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cli: Client::with_default_headers(headers),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<(T, Option<ResultInfo>)> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);
        let resp = self.cli.get(&url).await?;
        CfResponse::parse(resp)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {}", url);
        let body = serde_json::to_string(body)?;
        let resp = self.cli.post(&url, body).await?;
        let (result, _) = CfResponse::parse(resp)?;
        Ok(result)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CfError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CfResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<CfError>,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

impl CfResponse {
    fn parse<T: DeserializeOwned>(resp: Response) -> Result<(T, Option<ResultInfo>)> {
        let resp: CfResponse = serde_json::from_str(&resp.into_body()?)?;
        if !resp.success {
            let errors: Vec<String> = resp
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            return Err(Error::Provider(format!(
                "cloudflare api unsuccess: [{}]",
                errors.join(", ")
            )));
        }

        Ok((serde_json::from_value(resp.result)?, resp.result_info))
    }
}

impl CfClient {
    pub async fn zone_list(&self, name: &str) -> Result<Vec<CfZone>> {
        let (zones, _) = self.get(&format!("/zones?name={}", name)).await?;
        Ok(zones)
    }

    pub async fn records_list(&self, zoneid: &str) -> Result<Vec<CfRecord>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let path = format!(
                "/zones/{}/dns_records?page={}&per_page={}",
                zoneid, page, PER_PAGE
            );
            let (batch, info): (Vec<CfRecord>, _) = self.get(&path).await?;
            let fetched = batch.len();
            records.extend(batch);

            let total_pages = info.map(|i| i.total_pages).unwrap_or(1);
            if page >= total_pages || fetched == 0 {
                break;
            }
            page += 1;
        }

        log::debug!("fetched {} records of zone {}", records.len(), zoneid);
        Ok(records)
    }

    pub async fn record_list(&self, zoneid: &str, name: &str, rtype: &str) -> Result<Vec<CfRecord>> {
        let path = format!(
            "/zones/{}/dns_records?name={}&type={}&per_page={}",
            zoneid, name, rtype, PER_PAGE
        );
        let (records, _) = self.get(&path).await?;
        Ok(records)
    }
}

#[derive(Debug, Clone, Serialize)]
struct BatchRecordDelete {
    id: String,
}

#[derive(Debug, Clone, Serialize)]
struct BatchRecord {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deletes: Vec<BatchRecordDelete>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    posts: Vec<CfRecord>,
}

impl CfClient {
    /// Deletes and posts in a single batch; deletes run first on the
    /// provider side.
    pub async fn record_batch(
        &self,
        zoneid: &str,
        deletes: Vec<String>,
        posts: Vec<CfRecord>,
    ) -> Result<()> {
        let batch = BatchRecord {
            deletes: deletes
                .into_iter()
                .map(|id| BatchRecordDelete { id })
                .collect(),
            posts,
        };

        self.post(&format!("/zones/{}/dns_records/batch", zoneid), &batch)
            .await?;
        Ok(())
    }
}
