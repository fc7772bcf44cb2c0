use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum HeaderKey {
    Authorization,
    ContentType,
    Custom(String),
}

impl HeaderKey {
    fn as_str(&self) -> &str {
        match self {
            HeaderKey::Authorization => "Authorization",
            HeaderKey::ContentType => "Content-Type",
            HeaderKey::Custom(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    /// Body of a 2xx response. Rejected credentials become
    /// `Error::Credential` so callers can tell them apart.
    pub fn into_body(self) -> Result<String> {
        match self.status {
            200..=299 => Ok(self.body),
            401 | 403 => Err(Error::Credential(format!(
                "status: {}, body: {}",
                self.status, self.body
            ))),
            _ => Err(Error::HttpError(format!(
                "status: {}, body: {}",
                self.status, self.body
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    key: HeaderKey,
    value: String,
}

impl Header {
    pub fn new(key: HeaderKey, value: String) -> Self {
        Self { key, value }
    }
}

pub struct Client {
    cli: reqwest::Client,
    dft_headers: Vec<Header>,
}

impl Client {
    pub fn with_default_headers(headers: Vec<Header>) -> Self {
        Self {
            cli: reqwest::Client::new(),
            dft_headers: headers,
        }
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        let builder = self.add_headers(self.cli.get(url));
        Self::send(builder).await
    }

    pub async fn post(&self, url: &str, body: String) -> Result<Response> {
        let builder = self.add_headers(self.cli.post(url));
        Self::send(builder.body(body)).await
    }

    async fn send(builder: reqwest::RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        Ok(Response {
            status: response.status().into(),
            body: response.text().await?,
        })
    }

    fn add_headers(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for header in &self.dft_headers {
            builder = builder.header(header.key.as_str(), header.value.as_str());
        }

        builder
    }
}
