use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

////////////////////////////////////////////////////////////
// Record type
////////////////////////////////////////////////////////////
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    PTR,
    NS,
    SOA,
    Other(String),
}

impl RecordType {
    /// Types that take part in synchronization.
    pub const SYNC: [RecordType; 6] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::CNAME,
        RecordType::MX,
        RecordType::TXT,
        RecordType::PTR,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::PTR => "PTR",
            RecordType::NS => "NS",
            RecordType::SOA => "SOA",
            RecordType::Other(ty) => ty.as_str(),
        }
    }

    /// Whether the values of this type name a host that may be zone-relative.
    pub fn has_target(&self) -> bool {
        matches!(self, RecordType::CNAME | RecordType::MX | RecordType::NS)
    }

    pub fn is_sync(&self) -> bool {
        Self::SYNC.contains(self)
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::AAAA,
            "CNAME" => RecordType::CNAME,
            "MX" => RecordType::MX,
            "TXT" => RecordType::TXT,
            "PTR" => RecordType::PTR,
            "NS" => RecordType::NS,
            "SOA" => RecordType::SOA,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ty = String::deserialize(deserializer)?;
        if ty.trim().is_empty() {
            return Err(serde::de::Error::custom("have to give a type for record"));
        }
        Ok(RecordType::from(ty.trim()))
    }
}

////////////////////////////////////////////////////////////
// Record set
////////////////////////////////////////////////////////////
/// One normalized DNS record set. Equality covers every field, and `values`
/// compares as a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSet {
    name: String,
    rtype: RecordType,
    ttl: u32,
    values: BTreeSet<String>,
}

impl RecordSet {
    pub fn new<I, S>(name: impl Into<String>, rtype: RecordType, ttl: u32, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            rtype,
            ttl,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rtype(&self) -> &RecordType {
        &self.rtype
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.name.clone(), self.rtype.clone())
    }

    pub fn is_same_set(&self, name: &str, rtype: &RecordType) -> bool {
        self.name == name && &self.rtype == rtype
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        write!(
            f,
            "RecordSet<{}> <{}, {}, {{{}}}>",
            self.name,
            self.rtype,
            self.ttl,
            values.join(", ")
        )
    }
}

////////////////////////////////////////////////////////////
// Record key
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub name: String,
    pub rtype: RecordType,
}

impl RecordKey {
    pub fn new(name: impl Into<String>, rtype: RecordType) -> Self {
        Self {
            name: name.into(),
            rtype,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.rtype)
    }
}
