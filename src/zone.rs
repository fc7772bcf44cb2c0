use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::{Result, ZoneError};
use crate::record::{RecordKey, RecordSet, RecordType};

////////////////////////////////////////////////////////////
// Origin
////////////////////////////////////////////////////////////
/// Apex of a zone, kept lower case and without the trailing root dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    pub fn new(origin: &str) -> std::result::Result<Self, ZoneError> {
        let origin = canonical_name(origin);
        if origin.is_empty() || origin == "@" {
            return Err(ZoneError::Invalid("zone origin is empty".to_string()));
        }
        Ok(Self(origin))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The origin with its trailing root dot, as providers list zones.
    pub fn fqdn(&self) -> String {
        format!("{}.", self.0)
    }

    /// Expands an origin-relative owner name into a name under this origin.
    pub fn qualify(&self, name: &str) -> String {
        let name = canonical_name(name);
        if name.is_empty() || name == "@" {
            return self.0.clone();
        }

        if self.contains(&name) {
            name
        } else {
            format!("{}.{}", name, self.0)
        }
    }

    /// Expands a CNAME/MX/NS target host. A host holding a dot is taken as
    /// already qualified. Returns `None` when nothing can be qualified.
    ///
    /// The root dot is dropped unless the host is a single label, in which
    /// case it stays so the host still reads as qualified next time.
    pub fn qualify_target(&self, host: &str) -> Option<String> {
        let host = host.trim().to_ascii_lowercase();
        match host.as_str() {
            "" => return None,
            "." => return Some(host),
            "@" => return Some(self.0.clone()),
            _ => {}
        }

        let qualified = match host.strip_suffix('.') {
            Some(absolute) if absolute.contains('.') => absolute.to_string(),
            Some(_) => host.clone(),
            None if host.contains('.') => host.clone(),
            None => format!("{}.{}", host, self.0),
        };
        Some(qualified)
    }

    /// Fails unless `other` names this same apex.
    pub fn ensure_same(&self, other: &Origin) -> Result<()> {
        if self != other {
            return Err(ZoneError::Invalid(format!(
                "zone origin {} does not match zone {}",
                self, other
            ))
            .into());
        }
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        name == self.0
            || name
                .strip_suffix(self.0.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_name(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

////////////////////////////////////////////////////////////
// Textual form
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ZoneEntry {
    pub name: String,

    #[serde(rename = "type")]
    pub rtype: RecordType,

    pub ttl: u32,

    #[serde(default)]
    pub values: Vec<String>,
}

impl ZoneEntry {
    pub fn new(name: impl Into<String>, rtype: RecordType, ttl: u32, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            rtype,
            ttl,
            values,
        }
    }
}

impl From<&RecordSet> for ZoneEntry {
    fn from(record: &RecordSet) -> Self {
        Self {
            name: record.name().to_string(),
            rtype: record.rtype().clone(),
            ttl: record.ttl(),
            values: record.values().iter().cloned().collect(),
        }
    }
}

/// Portable zone layout: `origin` plus an ordered `data` list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ZoneDocument {
    pub origin: String,
    pub data: Vec<ZoneEntry>,
}

////////////////////////////////////////////////////////////
// Zone
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    origin: Origin,
    records: Vec<RecordSet>,
}

impl Zone {
    /// Normalizes raw entries into comparable record sets.
    ///
    /// Both the local and the remote side go through here, so two sources
    /// describing the same data end up with equal record sets. Entries that
    /// share a name and type are merged into one set holding the lowest TTL.
    pub fn normalize<I>(origin: Origin, entries: I) -> std::result::Result<Self, ZoneError>
    where
        I: IntoIterator<Item = ZoneEntry>,
    {
        let mut records: Vec<RecordSet> = Vec::new();
        let mut index: HashMap<RecordKey, usize> = HashMap::new();
        let mut soa_found = false;

        for entry in entries {
            let ZoneEntry {
                name,
                rtype,
                ttl,
                values,
            } = entry;

            if rtype == RecordType::SOA {
                if soa_found {
                    return Err(ZoneError::DuplicateSoa);
                }
                if values.is_empty() {
                    return Err(ZoneError::Invalid(format!(
                        "SOA record {} has no value",
                        origin.qualify(&name)
                    )));
                }
                if values.len() > 1 {
                    return Err(ZoneError::MultiValueSoa(values.len()));
                }
                soa_found = true;
            }

            let name = origin.qualify(&name);

            if values.is_empty() {
                log::warn!("skipping {} record {} without values", rtype, name);
                continue;
            }

            let values = if rtype.has_target() {
                values
                    .iter()
                    .map(|value| qualify_value(&origin, &name, &rtype, value))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            } else {
                values
            };

            let key = RecordKey::new(name.clone(), rtype.clone());
            match index.get(&key) {
                Some(&at) => {
                    let prev = &records[at];
                    log::debug!("merging duplicate entry into {}", prev);
                    let values = prev.values().iter().cloned().chain(values);
                    let merged = RecordSet::new(name, rtype, prev.ttl().min(ttl), values);
                    records[at] = merged;
                }
                None => {
                    index.insert(key, records.len());
                    records.push(RecordSet::new(name, rtype, ttl, values));
                }
            }
        }

        Ok(Self { origin, records })
    }

    pub fn from_document(doc: ZoneDocument) -> std::result::Result<Self, ZoneError> {
        let origin = Origin::new(&doc.origin)?;
        Self::normalize(origin, doc.data)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc: ZoneDocument =
            serde_yaml::from_str(yaml).map_err(|e| ZoneError::Invalid(e.to_string()))?;
        Ok(Self::from_document(doc)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn all_records(&self) -> &[RecordSet] {
        &self.records
    }

    /// Record sets whose type is one of `types`, in source order.
    pub fn records(&self, types: &[RecordType]) -> Vec<RecordSet> {
        self.records
            .iter()
            .filter(|r| types.contains(r.rtype()))
            .cloned()
            .collect()
    }

    pub fn sync_records(&self) -> Vec<RecordSet> {
        self.records(&RecordType::SYNC)
    }

    pub fn to_document(&self) -> ZoneDocument {
        ZoneDocument {
            origin: self.origin.to_string(),
            data: self.records.iter().map(ZoneEntry::from).collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_document())?)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

fn qualify_value(
    origin: &Origin,
    name: &str,
    rtype: &RecordType,
    value: &str,
) -> std::result::Result<String, ZoneError> {
    let unqualified = || ZoneError::UnqualifiedTarget {
        name: name.to_string(),
        value: value.to_string(),
    };

    // MX carries its preference in front of the exchange host.
    let (prefix, host) = match rtype {
        RecordType::MX => {
            let value = value.trim();
            match value.rsplit_once(char::is_whitespace) {
                Some((pref, host)) => (Some(pref.trim_end()), host),
                None => return Err(unqualified()),
            }
        }
        _ => (None, value),
    };

    let host = origin.qualify_target(host).ok_or_else(unqualified)?;
    let qualified = match prefix {
        Some(pref) => format!("{} {}", pref, host),
        None => host,
    };

    if qualified != value {
        log::debug!("{} {}: target {} expanded to {}", rtype, name, value, qualified);
    }
    Ok(qualified)
}
