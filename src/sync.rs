use crate::error::{Error, Result};
use crate::provider::RemoteZone;
use crate::record::{RecordKey, RecordSet, RecordType};
use crate::zone::Zone;

////////////////////////////////////////////////////////////
// Plan
////////////////////////////////////////////////////////////
/// Outcome of comparing a local zone with the remote one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub creates: Vec<RecordKey>,
    pub updates: Vec<RecordKey>,
    pub orphans: Vec<String>,
}

impl Plan {
    pub fn is_in_sync(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.orphans.is_empty()
    }
}

enum Change<'a> {
    Update(&'a RecordSet),
    Create(&'a RecordSet),
}

/// Updates first, then creates, each in local order.
fn classify<'a>(local: &'a [RecordSet], remote: &[RecordSet]) -> Vec<Change<'a>> {
    let nonexistent: Vec<&RecordSet> = local.iter().filter(|r| !remote.contains(r)).collect();

    let (updates, creates): (Vec<&RecordSet>, Vec<&RecordSet>) = nonexistent
        .into_iter()
        .partition(|rec| remote.iter().any(|r| r.is_same_set(rec.name(), rec.rtype())));

    updates
        .into_iter()
        .map(Change::Update)
        .chain(creates.into_iter().map(Change::Create))
        .collect()
}

fn orphans(local: &[RecordSet], remote: &[RecordSet]) -> Vec<String> {
    remote
        .iter()
        .filter(|r| !local.contains(r))
        .map(|r| r.name().to_string())
        .collect()
}

/// Classifies without touching the remote side.
pub fn reconcile(local: &[RecordSet], remote: &[RecordSet]) -> Plan {
    let mut plan = Plan::default();
    for change in classify(local, remote) {
        match change {
            Change::Update(rec) => plan.updates.push(rec.key()),
            Change::Create(rec) => plan.creates.push(rec.key()),
        }
    }
    plan.orphans = orphans(local, remote);
    plan
}

////////////////////////////////////////////////////////////
// Syncer
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Unreconciled,
    Reconciled,
}

pub struct ZoneSyncer<'a, R: RemoteZone + ?Sized> {
    remote: &'a R,
    local_records: Vec<RecordSet>,
    remote_records: Vec<RecordSet>,
    dry_run: bool,
    plan: Plan,
    state: State,
}

impl<'a, R: RemoteZone + ?Sized> ZoneSyncer<'a, R> {
    pub fn new(
        local_records: Vec<RecordSet>,
        remote_records: Vec<RecordSet>,
        remote: &'a R,
        dry_run: bool,
    ) -> Self {
        log::debug!(
            "initializing syncer with {} local and {} remote record sets",
            local_records.len(),
            remote_records.len()
        );
        Self {
            remote,
            local_records,
            remote_records,
            dry_run,
            plan: Plan::default(),
            state: State::Unreconciled,
        }
    }

    /// Reads the remote records itself and compares them against `zone`.
    pub async fn load(zone: &Zone, remote: &'a R, dry_run: bool) -> Result<Self> {
        let remote_records = remote.records(&RecordType::SYNC).await?;
        Ok(Self::new(zone.sync_records(), remote_records, remote, dry_run))
    }

    /// Classifies every record and, unless in dry-run mode, pushes each
    /// update and create to the remote zone as soon as it is classified.
    ///
    /// A failed mutation aborts the run. Whatever was applied before stays
    /// applied and is the only thing the plan records.
    pub async fn run(&mut self) -> Result<&Plan> {
        self.plan = Plan::default();
        self.state = State::Unreconciled;

        for change in classify(&self.local_records, &self.remote_records) {
            match change {
                Change::Update(rec) => {
                    if !self.dry_run {
                        log::debug!("updating {}", rec);
                        self.remote.update(rec).await.map_err(|e| mutation_failure(rec, e))?;
                    }
                    self.plan.updates.push(rec.key());
                }
                Change::Create(rec) => {
                    if !self.dry_run {
                        log::debug!("creating {}", rec);
                        self.remote.create(rec).await.map_err(|e| mutation_failure(rec, e))?;
                    }
                    self.plan.creates.push(rec.key());
                }
            }
        }

        self.plan.orphans = orphans(&self.local_records, &self.remote_records);
        self.state = State::Reconciled;
        Ok(&self.plan)
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn is_reconciled(&self) -> bool {
        self.state == State::Reconciled
    }

    /// Logs one line per category and returns the lines.
    pub fn report(&self) -> Vec<String> {
        let (created, updated, detected) = if self.dry_run {
            (
                "[dryrun] Would have created",
                "[dryrun] Would have updated",
                "[dryrun] Would have detected",
            )
        } else {
            ("Created", "Updated", "Detected")
        };

        let lines = vec![
            format!(
                "{} {} new records: {}",
                created,
                self.plan.creates.len(),
                join_keys(&self.plan.creates)
            ),
            format!(
                "{} {} existing records: {}",
                updated,
                self.plan.updates.len(),
                join_keys(&self.plan.updates)
            ),
            format!(
                "{} {} orphaned records: [{}]",
                detected,
                self.plan.orphans.len(),
                self.plan.orphans.join(", ")
            ),
        ];

        for line in &lines {
            log::info!("{}", line);
        }
        lines
    }
}

fn join_keys(keys: &[RecordKey]) -> String {
    let keys: Vec<String> = keys.iter().map(RecordKey::to_string).collect();
    format!("[{}]", keys.join(", "))
}

fn mutation_failure(record: &RecordSet, err: Error) -> Error {
    match err {
        Error::MutationFailure { .. } => err,
        other => Error::MutationFailure {
            record: record.key(),
            reason: other.to_string(),
        },
    }
}
