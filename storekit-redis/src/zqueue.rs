//! Typed sorted-queue adapter over one remote sorted-set container.

use crate::client::{Command, ScoreBound, ScoredMember, StoreClient};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use storekit_core::codec::WireValue;
use storekit_core::error::{Result, StoreError};

/// Largest score magnitude a queue accepts.
///
/// The store keeps scores as IEEE doubles, so only integers up to 2^53 are
/// exactly representable; anything beyond would silently lose precision.
pub const MAX_SAFE_SCORE: i64 = 1 << 53;

/// One sorted-set entry: a member and its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element<T> {
    pub member: T,
    pub score: i64,
}

impl<T> Element<T> {
    pub fn new(member: T, score: i64) -> Self {
        Self { member, score }
    }
}

/// Projection helpers for element lists.
pub trait ElementListExt<T> {
    /// Drop the scores, keeping the members in list order
    fn members(self) -> Vec<T>;
}

impl<T> ElementListExt<T> for Vec<Element<T>> {
    fn members(self) -> Vec<T> {
        self.into_iter().map(|e| e.member).collect()
    }
}

fn checked_score(score: i64) -> Result<f64> {
    if !(-MAX_SAFE_SCORE..=MAX_SAFE_SCORE).contains(&score) {
        return Err(StoreError::invalid_input(format!(
            "score {} is outside the exactly-representable range of +/-2^53",
            score
        )));
    }
    Ok(score as f64)
}

/// Typed view of one remote score-ordered container.
///
/// A `ZQueue` binds a container key to a member type `T` and carries a
/// default direction: when `desc` is set, unqualified range calls return
/// highest scores first. The `*_rev` range variants invert the stored flag
/// for that call only and never mutate it. The flag is adapter
/// configuration, not per-call state; mutating it concurrently with
/// in-flight range calls needs external synchronization.
pub struct ZQueue<T> {
    key: String,
    client: Arc<dyn StoreClient>,
    desc: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: WireValue> ZQueue<T> {
    /// Create an ascending-order adapter bound to `key`
    pub fn new(client: Arc<dyn StoreClient>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            client,
            desc: false,
            _marker: PhantomData,
        }
    }

    /// Set the default direction at construction time
    pub fn with_desc(mut self, desc: bool) -> Self {
        self.desc = desc;
        self
    }

    /// The container key this adapter is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether unqualified range calls run highest-score-first
    pub fn is_desc(&self) -> bool {
        self.desc
    }

    /// Change the default direction for subsequent unqualified range calls
    pub fn set_desc(&mut self, desc: bool) {
        self.desc = desc;
    }

    /// Insert a member or update its score, optionally refreshing the
    /// container TTL in the same atomic pipeline
    pub async fn add(&self, member: &T, score: i64, ttl: Option<Duration>) -> Result<()> {
        let mut batch = vec![Command::SortedAdd {
            key: self.key.clone(),
            entries: vec![(member.encode(), checked_score(score)?)],
        }];
        self.push_expire(&mut batch, ttl);
        self.client.execute(batch).await?;
        Ok(())
    }

    /// Insert or update several members in one pipeline; empty input is a
    /// successful no-op
    pub async fn add_multi(&self, elements: &[Element<T>], ttl: Option<Duration>) -> Result<()> {
        if elements.is_empty() {
            return Ok(());
        }

        let entries = elements
            .iter()
            .map(|e| Ok((e.member.encode(), checked_score(e.score)?)))
            .collect::<Result<Vec<_>>>()?;
        let mut batch = vec![Command::SortedAdd {
            key: self.key.clone(),
            entries,
        }];
        self.push_expire(&mut batch, ttl);
        self.client.execute(batch).await?;
        Ok(())
    }

    /// Remove a member; removing an absent member is a no-op
    pub async fn remove(&self, member: &T) -> Result<()> {
        self.client
            .sorted_remove(&self.key, &[member.encode()])
            .await?;
        Ok(())
    }

    /// Remove several members; empty input is a successful no-op
    pub async fn remove_multi(&self, members: &[T]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }

        let encoded: Vec<String> = members.iter().map(WireValue::encode).collect();
        self.client.sorted_remove(&self.key, &encoded).await?;
        Ok(())
    }

    /// Elements with scores in `[min, max]`, in the adapter's default order
    pub async fn range_by_score(&self, min: i64, max: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), Some(max), 0, -1, self.desc)
            .await
    }

    /// Paginated variant of [`ZQueue::range_by_score`]; `count = -1` means
    /// no limit
    pub async fn range_by_score_with_limit(
        &self,
        min: i64,
        max: i64,
        offset: i64,
        count: i64,
    ) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), Some(max), offset, count, self.desc)
            .await
    }

    /// Elements with scores >= `min`, in the adapter's default order
    pub async fn range_from_score(&self, min: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), None, 0, -1, self.desc).await
    }

    /// Elements with scores <= `max`, in the adapter's default order
    pub async fn range_to_score(&self, max: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(None, Some(max), 0, -1, self.desc).await
    }

    /// [`ZQueue::range_by_score`] with the default order inverted for this
    /// call only
    pub async fn range_by_score_rev(&self, min: i64, max: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), Some(max), 0, -1, !self.desc)
            .await
    }

    /// [`ZQueue::range_by_score_with_limit`] with the default order inverted
    /// for this call only
    pub async fn range_by_score_with_limit_rev(
        &self,
        min: i64,
        max: i64,
        offset: i64,
        count: i64,
    ) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), Some(max), offset, count, !self.desc)
            .await
    }

    /// [`ZQueue::range_from_score`] with the default order inverted for this
    /// call only
    pub async fn range_from_score_rev(&self, min: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(Some(min), None, 0, -1, !self.desc).await
    }

    /// [`ZQueue::range_to_score`] with the default order inverted for this
    /// call only
    pub async fn range_to_score_rev(&self, max: i64) -> Result<Vec<Element<T>>> {
        self.range_internal(None, Some(max), 0, -1, !self.desc).await
    }

    /// Every range call funnels through here; `None` bounds map to the
    /// store's infinity sentinels
    async fn range_internal(
        &self,
        min: Option<i64>,
        max: Option<i64>,
        offset: i64,
        count: i64,
        desc: bool,
    ) -> Result<Vec<Element<T>>> {
        let min = match min {
            Some(v) => ScoreBound::Value(checked_score(v)?),
            None => ScoreBound::NegInf,
        };
        let max = match max {
            Some(v) => ScoreBound::Value(checked_score(v)?),
            None => ScoreBound::PosInf,
        };

        let rows = self
            .client
            .sorted_range_by_score(&self.key, min, max, offset, count, desc)
            .await?;
        rows.into_iter().map(Self::decode_element).collect()
    }

    /// Remove and return the lowest-scoring element; `None` on an empty
    /// container
    pub async fn pop_min(&self) -> Result<Option<Element<T>>> {
        let mut popped = self.pop_min_multi(1).await?;
        Ok(popped.pop())
    }

    /// Remove and return the highest-scoring element; `None` on an empty
    /// container
    pub async fn pop_max(&self) -> Result<Option<Element<T>>> {
        let mut popped = self.pop_max_multi(1).await?;
        Ok(popped.pop())
    }

    /// Remove and return up to `count` lowest-scoring elements
    pub async fn pop_min_multi(&self, count: i64) -> Result<Vec<Element<T>>> {
        let rows = self.client.sorted_pop_min(&self.key, count).await?;
        rows.into_iter().map(Self::decode_element).collect()
    }

    /// Remove and return up to `count` highest-scoring elements
    pub async fn pop_max_multi(&self, count: i64) -> Result<Vec<Element<T>>> {
        let rows = self.client.sorted_pop_max(&self.key, count).await?;
        rows.into_iter().map(Self::decode_element).collect()
    }

    /// Remove every element with a score in `[min, max]`, returning the
    /// count removed; `min`/`max` accept `"-inf"`/`"+inf"` sentinels
    pub async fn remove_range_by_score(&self, min: &str, max: &str) -> Result<i64> {
        self.client
            .sorted_remove_range_by_score(
                &self.key,
                ScoreBound::parse(min)?,
                ScoreBound::parse(max)?,
            )
            .await
    }

    /// Number of elements in the container
    pub async fn count(&self) -> Result<i64> {
        self.client.sorted_len(&self.key).await
    }

    /// Number of elements with scores in `[min, max]`; `min`/`max` accept
    /// `"-inf"`/`"+inf"` sentinels
    pub async fn count_by_score(&self, min: &str, max: &str) -> Result<i64> {
        self.client
            .sorted_count(
                &self.key,
                ScoreBound::parse(min)?,
                ScoreBound::parse(max)?,
            )
            .await
    }

    /// Score of a member; an absent member is `None`, not an error
    pub async fn score(&self, member: &T) -> Result<Option<i64>> {
        let score = self
            .client
            .sorted_score(&self.key, &member.encode())
            .await?;
        Ok(score.map(|s| s as i64))
    }

    fn decode_element(row: ScoredMember) -> Result<Element<T>> {
        Ok(Element {
            member: T::decode(&row.member)?,
            score: row.score as i64,
        })
    }

    fn push_expire(&self, batch: &mut Vec<Command>, ttl: Option<Duration>) {
        if let Some(ttl) = ttl {
            batch.push(Command::Expire {
                key: self.key.clone(),
                ttl,
            });
        }
    }
}
