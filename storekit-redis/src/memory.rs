//! Embedded in-memory store client.
//!
//! `MemoryStore` implements the full [`StoreClient`] contract against
//! process-local state, with the remote store's observable semantics:
//! member-lexical tie-break on equal scores, numeric increment type errors,
//! kind mismatch ("WRONGTYPE") errors, lazy TTL expiry, and deletion of
//! containers that become empty. It backs every test in this workspace and
//! doubles as an embedded backend where no external server is available.

use crate::client::{Command, Reply, ScoreBound, ScoredMember, StoreClient};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use storekit_core::error::{Result, StoreError};
use tracing::trace;

#[derive(Debug, Clone)]
enum Container {
    Hash(HashMap<String, String>),
    Sorted(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    container: Container,
    expires_at: Option<Instant>,
}

impl Entry {
    fn hash() -> Self {
        Self {
            container: Container::Hash(HashMap::new()),
            expires_at: None,
        }
    }

    fn sorted() -> Self {
        Self {
            container: Container::Sorted(HashMap::new()),
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    fn is_empty(&self) -> bool {
        match &self.container {
            Container::Hash(fields) => fields.is_empty(),
            Container::Sorted(members) => members.is_empty(),
        }
    }
}

/// In-process implementation of [`StoreClient`].
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

fn wrong_type() -> StoreError {
    StoreError::store("WRONGTYPE operation against a key holding the wrong kind of value")
}

fn not_an_integer() -> StoreError {
    StoreError::store("hash value is not an integer or out of range")
}

fn not_a_float() -> StoreError {
    StoreError::store("hash value is not a valid float")
}

/// Members ordered by (score, member) ascending, the store's native order
fn ordered_pairs(members: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = members
        .iter()
        .map(|(m, s)| (m.clone(), *s))
        .collect();
    pairs.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    pairs
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL of a container, if one is set and the key is live.
    ///
    /// Not part of the client contract; tests use it to observe expiry
    /// alongside the data written in the same pipeline.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.expires_at.map(|at| at - now)
    }

    fn drop_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
    }

    fn drop_if_empty(entries: &mut HashMap<String, Entry>, key: &str) {
        if entries.get(key).is_some_and(|e| e.is_empty()) {
            entries.remove(key);
        }
    }

    /// Read-side view of a live hash container; absent/expired keys are `None`
    fn read_hash<'a>(
        entries: &'a HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Result<Option<&'a HashMap<String, String>>> {
        match entries.get(key) {
            Some(e) if e.is_expired(now) => Ok(None),
            Some(Entry {
                container: Container::Hash(fields),
                ..
            }) => Ok(Some(fields)),
            Some(_) => Err(wrong_type()),
            None => Ok(None),
        }
    }

    /// Read-side view of a live sorted container
    fn read_sorted<'a>(
        entries: &'a HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Result<Option<&'a HashMap<String, f64>>> {
        match entries.get(key) {
            Some(e) if e.is_expired(now) => Ok(None),
            Some(Entry {
                container: Container::Sorted(members),
                ..
            }) => Ok(Some(members)),
            Some(_) => Err(wrong_type()),
            None => Ok(None),
        }
    }

    /// Write-side handle to a hash container, creating it when absent
    fn write_hash<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Result<&'a mut HashMap<String, String>> {
        Self::drop_expired(entries, key, now);
        let entry = entries.entry(key.to_string()).or_insert_with(Entry::hash);
        match &mut entry.container {
            Container::Hash(fields) => Ok(fields),
            Container::Sorted(_) => Err(wrong_type()),
        }
    }

    fn write_sorted<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Result<&'a mut HashMap<String, f64>> {
        Self::drop_expired(entries, key, now);
        let entry = entries.entry(key.to_string()).or_insert_with(Entry::sorted);
        match &mut entry.container {
            Container::Sorted(members) => Ok(members),
            Container::Hash(_) => Err(wrong_type()),
        }
    }

    /// Check a command against the current state without applying it.
    ///
    /// `execute` validates the whole batch first so that a failing command
    /// leaves no earlier command applied. Validation looks at the pre-batch
    /// state only, which is exact for the pipelines the adapters build (one
    /// data command plus an optional expiry on the same key).
    fn validate(entries: &HashMap<String, Entry>, cmd: &Command, now: Instant) -> Result<()> {
        match cmd {
            Command::HashSet { key, .. } => {
                Self::read_hash(entries, key, now).map(|_| ())
            }
            Command::HashIncrBy { key, field, delta } => {
                if let Some(fields) = Self::read_hash(entries, key, now)? {
                    if let Some(raw) = fields.get(field) {
                        let current: i64 = raw.parse().map_err(|_| not_an_integer())?;
                        current.checked_add(*delta).ok_or_else(not_an_integer)?;
                    }
                }
                Ok(())
            }
            Command::HashIncrByFloat { key, field, .. } => {
                if let Some(fields) = Self::read_hash(entries, key, now)? {
                    if let Some(raw) = fields.get(field) {
                        raw.parse::<f64>().map_err(|_| not_a_float())?;
                    }
                }
                Ok(())
            }
            Command::SortedAdd { key, .. } => {
                Self::read_sorted(entries, key, now).map(|_| ())
            }
            Command::Expire { .. } => Ok(()),
        }
    }

    fn apply(entries: &mut HashMap<String, Entry>, cmd: Command, now: Instant) -> Result<Reply> {
        match cmd {
            Command::HashSet { key, fields } => {
                let map = Self::write_hash(entries, &key, now)?;
                let mut added = 0i64;
                for (field, value) in fields {
                    if map.insert(field, value).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Int(added))
            }
            Command::HashIncrBy { key, field, delta } => {
                let map = Self::write_hash(entries, &key, now)?;
                let current: i64 = match map.get(&field) {
                    Some(raw) => raw.parse().map_err(|_| not_an_integer())?,
                    None => 0,
                };
                let next = current.checked_add(delta).ok_or_else(not_an_integer)?;
                map.insert(field, next.to_string());
                Ok(Reply::Int(next))
            }
            Command::HashIncrByFloat { key, field, delta } => {
                let map = Self::write_hash(entries, &key, now)?;
                let current: f64 = match map.get(&field) {
                    Some(raw) => raw.parse().map_err(|_| not_a_float())?,
                    None => 0.0,
                };
                let next = current + delta;
                map.insert(field, next.to_string());
                Ok(Reply::Float(next))
            }
            Command::SortedAdd { key, entries: new_entries } => {
                let members = Self::write_sorted(entries, &key, now)?;
                let mut added = 0i64;
                for (member, score) in new_entries {
                    if members.insert(member, score).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Int(added))
            }
            Command::Expire { key, ttl } => {
                Self::drop_expired(entries, &key, now);
                if !entries.contains_key(&key) {
                    return Ok(Reply::Int(0));
                }
                if ttl.is_zero() {
                    entries.remove(&key);
                } else if let Some(entry) = entries.get_mut(&key) {
                    entry.expires_at = Some(now + ttl);
                }
                Ok(Reply::Int(1))
            }
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn execute(&self, batch: Vec<Command>) -> Result<Vec<Reply>> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        for cmd in &batch {
            Self::validate(&entries, cmd, now)?;
        }

        trace!(commands = batch.len(), "executing pipeline");
        let mut replies = Vec::with_capacity(batch.len());
        for cmd in batch {
            replies.push(Self::apply(&mut entries, cmd, now)?);
        }
        Ok(replies)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?.and_then(|fields| fields.get(field).cloned()))
    }

    async fn hash_get_multi(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        let now = Instant::now();
        let entries = self.entries.read();
        let map = Self::read_hash(&entries, key, now)?;
        Ok(fields
            .iter()
            .map(|f| map.and_then(|m| m.get(f).cloned()))
            .collect())
    }

    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn hash_delete(&self, key: &str, fields: &[String]) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::drop_expired(&mut entries, key, now);

        let removed = match entries.get_mut(key) {
            Some(Entry {
                container: Container::Hash(map),
                ..
            }) => fields.iter().filter(|f| map.remove(*f).is_some()).count() as i64,
            Some(_) => return Err(wrong_type()),
            None => 0,
        };
        Self::drop_if_empty(&mut entries, key);
        Ok(removed)
    }

    async fn hash_exists(&self, key: &str, field: &str) -> Result<bool> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?.is_some_and(|m| m.contains_key(field)))
    }

    async fn hash_len(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?.map_or(0, |m| m.len() as i64))
    }

    async fn hash_keys(&self, key: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn hash_values(&self, key: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_hash(&entries, key, now)?
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn sorted_remove(&self, key: &str, members: &[String]) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::drop_expired(&mut entries, key, now);

        let removed = match entries.get_mut(key) {
            Some(Entry {
                container: Container::Sorted(map),
                ..
            }) => members.iter().filter(|m| map.remove(*m).is_some()).count() as i64,
            Some(_) => return Err(wrong_type()),
            None => 0,
        };
        Self::drop_if_empty(&mut entries, key);
        Ok(removed)
    }

    async fn sorted_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
        offset: i64,
        count: i64,
        desc: bool,
    ) -> Result<Vec<ScoredMember>> {
        let now = Instant::now();
        let entries = self.entries.read();
        let Some(members) = Self::read_sorted(&entries, key, now)? else {
            return Ok(Vec::new());
        };

        let mut pairs: Vec<(String, f64)> = ordered_pairs(members)
            .into_iter()
            .filter(|(_, score)| ScoreBound::contains(min, max, *score))
            .collect();
        if desc {
            pairs.reverse();
        }

        let offset = offset.max(0) as usize;
        let iter = pairs.into_iter().skip(offset);
        let selected: Vec<(String, f64)> = if count < 0 {
            iter.collect()
        } else {
            iter.take(count as usize).collect()
        };

        Ok(selected
            .into_iter()
            .map(|(member, score)| ScoredMember { member, score })
            .collect())
    }

    async fn sorted_pop_min(&self, key: &str, count: i64) -> Result<Vec<ScoredMember>> {
        self.pop(key, count, false)
    }

    async fn sorted_pop_max(&self, key: &str, count: i64) -> Result<Vec<ScoredMember>> {
        self.pop(key, count, true)
    }

    async fn sorted_remove_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::drop_expired(&mut entries, key, now);

        let removed = match entries.get_mut(key) {
            Some(Entry {
                container: Container::Sorted(map),
                ..
            }) => {
                let doomed: Vec<String> = map
                    .iter()
                    .filter(|(_, score)| ScoreBound::contains(min, max, **score))
                    .map(|(m, _)| m.clone())
                    .collect();
                for member in &doomed {
                    map.remove(member);
                }
                doomed.len() as i64
            }
            Some(_) => return Err(wrong_type()),
            None => 0,
        };
        Self::drop_if_empty(&mut entries, key);
        Ok(removed)
    }

    async fn sorted_len(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_sorted(&entries, key, now)?.map_or(0, |m| m.len() as i64))
    }

    async fn sorted_count(&self, key: &str, min: ScoreBound, max: ScoreBound) -> Result<i64> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_sorted(&entries, key, now)?.map_or(0, |m| {
            m.values()
                .filter(|score| ScoreBound::contains(min, max, **score))
                .count() as i64
        }))
    }

    async fn sorted_score(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(Self::read_sorted(&entries, key, now)?.and_then(|m| m.get(member).copied()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        match Self::apply(&mut entries, Command::Expire { key: key.to_string(), ttl }, now)? {
            Reply::Int(n) => Ok(n == 1),
            _ => Ok(false),
        }
    }
}

impl MemoryStore {
    fn pop(&self, key: &str, count: i64, from_max: bool) -> Result<Vec<ScoredMember>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::drop_expired(&mut entries, key, now);

        let popped = match entries.get_mut(key) {
            Some(Entry {
                container: Container::Sorted(map),
                ..
            }) => {
                let mut pairs = ordered_pairs(map);
                if from_max {
                    pairs.reverse();
                }
                let take = count.max(0) as usize;
                let popped: Vec<(String, f64)> = pairs.into_iter().take(take).collect();
                for (member, _) in &popped {
                    map.remove(member);
                }
                popped
            }
            Some(_) => return Err(wrong_type()),
            None => Vec::new(),
        };
        Self::drop_if_empty(&mut entries, key);

        Ok(popped
            .into_iter()
            .map(|(member, score)| ScoredMember { member, score })
            .collect())
    }
}
