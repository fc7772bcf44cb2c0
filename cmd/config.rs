use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use zone_syncer::error::Error;
use zone_syncer::error::Result;
use zone_syncer::provider::cloudflare::Auth;

const ENV_API_TOKEN: &str = "CF_API_TOKEN";
const ENV_API_EMAIL: &str = "CF_API_EMAIL";
const ENV_API_KEY: &str = "CF_API_KEY";

////////////////////////////////////////////////////////////
// Parameters
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
pub struct CfgParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CfgParamList(Vec<CfgParam>);

impl CfgParamList {
    pub fn iter(&self) -> impl Iterator<Item = &CfgParam> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for CfgParamList {
    type Output = CfgParam;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

////////////////////////////////////////////////////////////
// Provider
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
pub struct CfgProviderAuthentication {
    pub method: String,
    pub params: CfgParamList,
}

impl CfgProviderAuthentication {
    pub fn get_value_ref(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == key)
            .map(|p| p.value.as_str())
    }
}

impl TryFrom<CfgProviderAuthentication> for Auth {
    type Error = Error;

    fn try_from(cfg: CfgProviderAuthentication) -> Result<Self> {
        if cfg.method == "api_token" {
            let api_token = cfg.get_value_ref("api_token").ok_or(Error::Credential(
                "authentication method is declared as api_token, but api_token is not found"
                    .to_string(),
            ))?;
            Ok(Auth::ApiToken(api_token.to_string()))
        } else if cfg.method == "api_key" {
            let email = cfg.get_value_ref("email");
            let key = cfg.get_value_ref("key");

            match (email, key) {
                (Some(email), Some(key)) => Ok(Auth::ApiKey {
                    email: email.to_string(),
                    key: key.to_string(),
                }),
                _ => Err(Error::Credential(
                    "api_key authentication requires both email and key".into(),
                )),
            }
        } else {
            Err(Error::Credential(format!(
                "{}: unsupported authentication method for cloudflare provider",
                cfg.method
            )))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CfgProvider {
    pub r#type: String,
    pub authentication: CfgProviderAuthentication,
}

////////////////////////////////////////////////////////////
// Yaml parser
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
pub struct Cfg {
    pub provider: CfgProvider,
}

pub struct Parser;

impl Parser {
    pub fn parse_yaml<P: AsRef<Path>>(path: P) -> Result<Cfg> {
        let reader = Self::file_reader(path)?;
        let config: Cfg = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    fn file_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
        let f = std::fs::File::open(path)?;
        Ok(BufReader::new(f))
    }
}

/// `$HOME/.config/zone-syncer/config.yaml`, if it exists.
pub fn default_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    let path = PathBuf::from(home)
        .join(".config")
        .join("zone-syncer")
        .join("config.yaml");
    path.exists().then_some(path)
}

////////////////////////////////////////////////////////////
// Credentials
////////////////////////////////////////////////////////////
/// Environment variables win over the config file, which is only read when
/// they are not set.
pub fn resolve_auth(config: Option<&Path>) -> Result<Auth> {
    let load = || match config.map(Path::to_path_buf).or_else(default_path) {
        Some(path) => {
            log::debug!("reading provider config from {}", path.display());
            Parser::parse_yaml(path).map(Some)
        }
        None => Ok(None),
    };

    resolve_auth_with(|key| std::env::var(key).ok(), load)
}

pub fn resolve_auth_with<F, L>(env: F, load: L) -> Result<Auth>
where
    F: Fn(&str) -> Option<String>,
    L: FnOnce() -> Result<Option<Cfg>>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(token) = non_empty(ENV_API_TOKEN) {
        log::info!("sourcing cloudflare credentials from {}", ENV_API_TOKEN);
        return Ok(Auth::ApiToken(token));
    }
    if let (Some(email), Some(key)) = (non_empty(ENV_API_EMAIL), non_empty(ENV_API_KEY)) {
        log::info!(
            "sourcing cloudflare credentials from {} and {}",
            ENV_API_EMAIL,
            ENV_API_KEY
        );
        return Ok(Auth::ApiKey { email, key });
    }

    match load()? {
        Some(cfg) if cfg.provider.r#type == "cloudflare" => {
            log::info!("sourcing cloudflare credentials from config file");
            cfg.provider.authentication.try_into()
        }
        Some(cfg) => Err(Error::Credential(format!(
            "{}: unsupported provider type",
            cfg.provider.r#type
        ))),
        None => Err(Error::Credential(format!(
            "environment variable {} (or {} and {}) not set and no config file found",
            ENV_API_TOKEN, ENV_API_EMAIL, ENV_API_KEY
        ))),
    }
}

////////////////////////////////////////////////////////////
// Unit test
////////////////////////////////////////////////////////////
#[cfg(test)]
#[path = "config_test.rs"]
mod test;
