//! Typed field-map adapter over one remote hash container.

use crate::client::{Command, Reply, StoreClient};
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use storekit_core::codec::WireValue;
use storekit_core::error::{Result, StoreError};

/// Typed view of one remote hash container.
///
/// A `FieldMap` binds a container key to a field type `K` and a value type
/// `V` for its lifetime. It holds no data of its own; every call is one
/// request (or one atomic pipeline) against the shared client. Writes can
/// refresh the container's TTL in the same pipeline, so the new value and
/// the new expiry become visible together or not at all.
pub struct FieldMap<K, V> {
    key: String,
    client: Arc<dyn StoreClient>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> FieldMap<K, V>
where
    K: WireValue + Eq + Hash + Clone,
    V: WireValue,
{
    /// Create an adapter bound to `key`
    pub fn new(client: Arc<dyn StoreClient>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            client,
            _marker: PhantomData,
        }
    }

    /// The container key this adapter is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Set one field, optionally refreshing the container TTL in the same
    /// atomic pipeline
    pub async fn set(&self, field: &K, value: &V, ttl: Option<Duration>) -> Result<()> {
        let mut batch = vec![Command::HashSet {
            key: self.key.clone(),
            fields: vec![(field.encode(), value.encode())],
        }];
        self.push_expire(&mut batch, ttl);
        self.client.execute(batch).await?;
        Ok(())
    }

    /// Set several fields in one pipeline; empty input is a successful no-op
    pub async fn set_multi(&self, fields: &HashMap<K, V>, ttl: Option<Duration>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let encoded = fields
            .iter()
            .map(|(k, v)| (k.encode(), v.encode()))
            .collect();
        let mut batch = vec![Command::HashSet {
            key: self.key.clone(),
            fields: encoded,
        }];
        self.push_expire(&mut batch, ttl);
        self.client.execute(batch).await?;
        Ok(())
    }

    /// Get one field; an absent field is `None`, not an error
    pub async fn get(&self, field: &K) -> Result<Option<V>> {
        match self.client.hash_get(&self.key, &field.encode()).await? {
            Some(raw) => Ok(Some(V::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Get several fields; absent fields are omitted from the result
    pub async fn get_multi(&self, fields: &[K]) -> Result<HashMap<K, V>> {
        if fields.is_empty() {
            return Ok(HashMap::new());
        }

        let encoded: Vec<String> = fields.iter().map(WireValue::encode).collect();
        let raws = self.client.hash_get_multi(&self.key, &encoded).await?;

        let mut result = HashMap::with_capacity(fields.len());
        for (field, raw) in fields.iter().zip(raws) {
            if let Some(raw) = raw {
                result.insert(field.clone(), V::decode(&raw)?);
            }
        }
        Ok(result)
    }

    /// Get every field in the container; any decode failure aborts the call
    pub async fn get_all(&self) -> Result<HashMap<K, V>> {
        let pairs = self.client.hash_get_all(&self.key).await?;

        let mut result = HashMap::with_capacity(pairs.len());
        for (raw_key, raw_value) in pairs {
            result.insert(K::decode(&raw_key)?, V::decode(&raw_value)?);
        }
        Ok(result)
    }

    /// Delete fields; absent fields and empty input are no-ops
    pub async fn delete(&self, fields: &[K]) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let encoded: Vec<String> = fields.iter().map(WireValue::encode).collect();
        self.client.hash_delete(&self.key, &encoded).await?;
        Ok(())
    }

    /// Whether a field exists
    pub async fn exists(&self, field: &K) -> Result<bool> {
        self.client.hash_exists(&self.key, &field.encode()).await
    }

    /// Number of fields in the container
    pub async fn len(&self) -> Result<i64> {
        self.client.hash_len(&self.key).await
    }

    /// Whether the container has no fields
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Every field name; any decode failure aborts the call
    pub async fn keys(&self) -> Result<Vec<K>> {
        let raws = self.client.hash_keys(&self.key).await?;
        raws.iter().map(|raw| K::decode(raw)).collect()
    }

    /// Every value; any decode failure aborts the call
    pub async fn values(&self) -> Result<Vec<V>> {
        let raws = self.client.hash_values(&self.key).await?;
        raws.iter().map(|raw| V::decode(raw)).collect()
    }

    /// Atomically increment a field's integer value (creating it at 0),
    /// returning the post-increment value; the optional TTL refresh rides
    /// the same pipeline
    pub async fn incr(&self, field: &K, delta: i64, ttl: Option<Duration>) -> Result<i64> {
        let mut batch = vec![Command::HashIncrBy {
            key: self.key.clone(),
            field: field.encode(),
            delta,
        }];
        self.push_expire(&mut batch, ttl);
        let replies = self.client.execute(batch).await?;
        match replies.first() {
            Some(Reply::Int(v)) => Ok(*v),
            _ => Err(StoreError::store("missing integer reply for increment")),
        }
    }

    /// Float counterpart of [`FieldMap::incr`]
    pub async fn incr_float(&self, field: &K, delta: f64, ttl: Option<Duration>) -> Result<f64> {
        let mut batch = vec![Command::HashIncrByFloat {
            key: self.key.clone(),
            field: field.encode(),
            delta,
        }];
        self.push_expire(&mut batch, ttl);
        let replies = self.client.execute(batch).await?;
        match replies.first() {
            Some(Reply::Float(v)) => Ok(*v),
            _ => Err(StoreError::store("missing float reply for increment")),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde::{Deserialize, Serialize};
    use storekit_core::codec::Json;

    fn map<K, V>(client: Arc<MemoryStore>, key: &str) -> FieldMap<K, V>
    where
        K: WireValue + Eq + Hash + Clone,
        V: WireValue,
    {
        FieldMap::new(client, key)
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let client = Arc::new(MemoryStore::new());
        let prices: FieldMap<String, i64> = map(client, "prices");

        prices.set(&"apple".to_string(), &120, None).await.unwrap();
        assert_eq!(prices.get(&"apple".to_string()).await.unwrap(), Some(120));
        assert_eq!(prices.get(&"pear".to_string()).await.unwrap(), None);

        prices.delete(&["apple".to_string()]).await.unwrap();
        assert_eq!(prices.get(&"apple".to_string()).await.unwrap(), None);

        // Deleting again is a no-op
        prices.delete(&["apple".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_multi_and_projections() {
        let client = Arc::new(MemoryStore::new());
        let scores: FieldMap<u32, i64> = map(client, "scores");

        // Empty multi-set succeeds without touching the store
        scores.set_multi(&HashMap::new(), None).await.unwrap();
        assert_eq!(scores.len().await.unwrap(), 0);
        assert!(scores.is_empty().await.unwrap());

        let mut batch = HashMap::new();
        batch.insert(1u32, 10i64);
        batch.insert(2u32, 20i64);
        batch.insert(3u32, 30i64);
        scores.set_multi(&batch, None).await.unwrap();

        assert_eq!(scores.len().await.unwrap(), 3);
        assert!(scores.exists(&2).await.unwrap());

        let mut keys = scores.keys().await.unwrap();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);

        let mut values = scores.values().await.unwrap();
        values.sort_unstable();
        assert_eq!(values, vec![10, 20, 30]);

        assert_eq!(scores.get_all().await.unwrap(), batch);
    }

    #[tokio::test]
    async fn test_get_multi_omits_absent_fields() {
        let client = Arc::new(MemoryStore::new());
        let ages: FieldMap<String, u8> = map(client, "ages");

        ages.set(&"ada".to_string(), &36, None).await.unwrap();

        let result = ages
            .get_multi(&["ada".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("ada"), Some(&36));
        assert!(!result.contains_key("ghost"));

        assert!(ages.get_multi(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_aborts_whole_call() {
        let client = Arc::new(MemoryStore::new());
        let writer: FieldMap<String, String> = map(client.clone(), "mixed");
        writer
            .set(&"good".to_string(), &"1".to_string(), None)
            .await
            .unwrap();
        writer
            .set(&"bad".to_string(), &"not-a-number".to_string(), None)
            .await
            .unwrap();

        let reader: FieldMap<String, i64> = map(client, "mixed");
        assert!(reader.get_all().await.unwrap_err().is_conversion());
        assert!(reader.values().await.unwrap_err().is_conversion());
        assert_eq!(
            reader.get(&"good".to_string()).await.unwrap(),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_incr_from_absent() {
        let client = Arc::new(MemoryStore::new());
        let counters: FieldMap<String, i64> = map(client, "counters");

        assert_eq!(counters.incr(&"hits".to_string(), 5, None).await.unwrap(), 5);
        assert_eq!(counters.incr(&"hits".to_string(), 3, None).await.unwrap(), 8);

        let drift = counters
            .incr_float(&"drift".to_string(), 0.5, None)
            .await
            .unwrap();
        assert!((drift - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ttl_refresh_rides_the_write() {
        let client = Arc::new(MemoryStore::new());
        let session: FieldMap<String, String> = map(client.clone(), "session");

        session
            .set(
                &"token".to_string(),
                &"abc".to_string(),
                Some(Duration::from_secs(30)),
            )
            .await
            .unwrap();

        // Value present and expiry set in the same observable step
        assert_eq!(
            session.get(&"token".to_string()).await.unwrap(),
            Some("abc".to_string())
        );
        assert!(client.remaining_ttl("session").is_some());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        admin: bool,
    }

    #[tokio::test]
    async fn test_composite_values() {
        let client = Arc::new(MemoryStore::new());
        let profiles: FieldMap<u64, Json<Profile>> = map(client, "profiles");

        let profile = Json(Profile {
            name: "lin".to_string(),
            admin: true,
        });
        profiles.set(&7, &profile, None).await.unwrap();
        assert_eq!(profiles.get(&7).await.unwrap(), Some(profile));
    }
}
