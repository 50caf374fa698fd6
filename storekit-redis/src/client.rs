//! Remote-store client contract.
//!
//! This is the accessor layer's only external boundary: a command executor
//! able to run single hash/sorted-set commands and small atomic pipelines.
//! Concrete implementations wrap a real connection (built elsewhere from
//! [`storekit_core::config::RedisConfig`]); [`crate::memory::MemoryStore`]
//! provides an embedded in-process implementation.
//!
//! Values cross this boundary as UTF-8 wire strings; typing happens above,
//! in the adapters, through [`storekit_core::codec::WireValue`].

use async_trait::async_trait;
use storekit_core::error::{Result, StoreError};
use std::time::Duration;

/// One bound of a score window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    /// Unbounded below ("-inf")
    NegInf,
    /// Unbounded above ("+inf")
    PosInf,
    /// Inclusive numeric bound
    Value(f64),
}

impl ScoreBound {
    /// Parse the store's string form: `"-inf"`, `"+inf"`/`"inf"`, or a number
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "-inf" => Ok(Self::NegInf),
            "+inf" | "inf" => Ok(Self::PosInf),
            _ => raw
                .parse::<f64>()
                .map(Self::Value)
                .map_err(|_| StoreError::invalid_input(format!("invalid score bound {:?}", raw))),
        }
    }

    /// The bound as a float, with infinities mapped to IEEE infinities
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::NegInf => f64::NEG_INFINITY,
            Self::PosInf => f64::INFINITY,
            Self::Value(v) => *v,
        }
    }

    /// Whether `score` lies within `[min, max]` (both inclusive)
    pub fn contains(min: ScoreBound, max: ScoreBound, score: f64) -> bool {
        score >= min.as_f64() && score <= max.as_f64()
    }
}

/// A raw member/score pair as the store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

/// One write command inside an atomic pipeline.
///
/// Pipelines built by the adapters hold one data command plus an optional
/// trailing [`Command::Expire`]; the executor applies the whole batch
/// atomically or not at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set hash fields (HSET with one or more field/value pairs)
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Increment a hash field's integer value, creating it at 0 (HINCRBY)
    HashIncrBy {
        key: String,
        field: String,
        delta: i64,
    },
    /// Increment a hash field's float value, creating it at 0 (HINCRBYFLOAT)
    HashIncrByFloat {
        key: String,
        field: String,
        delta: f64,
    },
    /// Insert or update sorted-set members (ZADD)
    SortedAdd {
        key: String,
        entries: Vec<(String, f64)>,
    },
    /// Refresh the container's time-to-live (EXPIRE)
    Expire { key: String, ttl: Duration },
}

/// Reply to one pipelined command, positionally matching the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Command succeeded with no interesting value
    Unit,
    /// Integer reply (e.g. post-increment value)
    Int(i64),
    /// Float reply (e.g. post-increment value of HINCRBYFLOAT)
    Float(f64),
}

/// Command executor for one Redis-like remote store.
///
/// Every method is a single stateless request/response; `execute` runs a
/// small batch as one atomic pipeline, all-or-nothing, reporting the first
/// failure. Cancellation is the caller's: dropping a returned future must
/// abandon the call without side effects beyond what the store has already
/// applied.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Run a batch of write commands as one atomic pipeline.
    ///
    /// On success the replies match the batch positionally. On failure no
    /// command in the batch is applied.
    async fn execute(&self, batch: Vec<Command>) -> Result<Vec<Reply>>;

    /// Get one hash field; `None` when the field or the key is absent
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Get several hash fields, positionally; absent fields yield `None`
    async fn hash_get_multi(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>>;

    /// Get every field/value pair in the hash
    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// Delete hash fields, returning how many existed
    async fn hash_delete(&self, key: &str, fields: &[String]) -> Result<i64>;

    /// Whether the hash field exists
    async fn hash_exists(&self, key: &str, field: &str) -> Result<bool>;

    /// Number of fields in the hash
    async fn hash_len(&self, key: &str) -> Result<i64>;

    /// Every field name in the hash
    async fn hash_keys(&self, key: &str) -> Result<Vec<String>>;

    /// Every value in the hash
    async fn hash_values(&self, key: &str) -> Result<Vec<String>>;

    /// Remove sorted-set members, returning how many existed
    async fn sorted_remove(&self, key: &str, members: &[String]) -> Result<i64>;

    /// Members with scores in `[min, max]`, ordered by score then member
    /// (reversed when `desc`), paginated by `offset`/`count` (`count < 0`
    /// means no limit)
    async fn sorted_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
        offset: i64,
        count: i64,
        desc: bool,
    ) -> Result<Vec<ScoredMember>>;

    /// Atomically remove and return up to `count` lowest-scoring members
    async fn sorted_pop_min(&self, key: &str, count: i64) -> Result<Vec<ScoredMember>>;

    /// Atomically remove and return up to `count` highest-scoring members
    async fn sorted_pop_max(&self, key: &str, count: i64) -> Result<Vec<ScoredMember>>;

    /// Remove members with scores in `[min, max]`, returning count removed
    async fn sorted_remove_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<i64>;

    /// Cardinality of the sorted set
    async fn sorted_len(&self, key: &str) -> Result<i64>;

    /// Number of members with scores in `[min, max]`
    async fn sorted_count(&self, key: &str, min: ScoreBound, max: ScoreBound) -> Result<i64>;

    /// Score of a member; `None` when the member or the key is absent
    async fn sorted_score(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Set the container's time-to-live; returns false when the key is absent
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bound_parse() {
        assert_eq!(ScoreBound::parse("-inf").unwrap(), ScoreBound::NegInf);
        assert_eq!(ScoreBound::parse("+inf").unwrap(), ScoreBound::PosInf);
        assert_eq!(ScoreBound::parse("inf").unwrap(), ScoreBound::PosInf);
        assert_eq!(ScoreBound::parse("42").unwrap(), ScoreBound::Value(42.0));
        assert_eq!(
            ScoreBound::parse("-3.5").unwrap(),
            ScoreBound::Value(-3.5)
        );
        assert!(ScoreBound::parse("soon").is_err());
    }

    #[test]
    fn test_score_bound_contains() {
        let min = ScoreBound::Value(1.0);
        let max = ScoreBound::Value(3.0);
        assert!(ScoreBound::contains(min, max, 1.0));
        assert!(ScoreBound::contains(min, max, 3.0));
        assert!(!ScoreBound::contains(min, max, 3.5));
        assert!(ScoreBound::contains(ScoreBound::NegInf, ScoreBound::PosInf, -1e18));
    }
}
