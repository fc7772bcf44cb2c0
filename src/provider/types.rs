use async_trait::async_trait;

use crate::error::Result;
use crate::record::{RecordSet, RecordType};

/// Live record store of one hosted zone.
///
/// Record sets handed out by `records` must already be normalized the same
/// way as the local zone, otherwise nothing compares equal.
#[async_trait]
pub trait RemoteZone {
    async fn records(&self, types: &[RecordType]) -> Result<Vec<RecordSet>>;

    async fn create(&self, record: &RecordSet) -> Result<()>;

    /// Overwrites the values and TTL of the remote set sharing the record's
    /// name and type.
    async fn update(&self, record: &RecordSet) -> Result<()>;
}
