//! Cross-crate end-to-end tests: typed adapters over the embedded store.

use std::collections::HashMap;
use std::sync::Arc;
use storekit_redis::prelude::*;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Order {
    id: u64,
    item: String,
    quantity: u32,
}

#[tokio::test]
async fn field_map_and_zqueue_share_one_client() {
    let client: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    let orders: FieldMap<u64, Json<Order>> = FieldMap::new(client.clone(), "orders");
    let backlog: ZQueue<u64> = ZQueue::new(client.clone(), "orders:backlog");

    let order = Json(Order {
        id: 1,
        item: "keyboard".to_string(),
        quantity: 2,
    });
    orders.set(&1, &order, None).await.unwrap();
    backlog.add(&1, 1700000000, None).await.unwrap();

    let next = backlog.pop_min().await.unwrap().unwrap();
    let fetched = orders.get(&next.member).await.unwrap().unwrap();
    assert_eq!(fetched, order);

    // The backlog entry is consumed, the order record is untouched
    assert_eq!(backlog.count().await.unwrap(), 0);
    assert_eq!(orders.len().await.unwrap(), 1);
}

#[tokio::test]
async fn adapters_over_the_same_key_observe_each_other() {
    let client: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    let writer: FieldMap<String, i64> = FieldMap::new(client.clone(), "stats");
    let reader: FieldMap<String, i64> = FieldMap::new(client.clone(), "stats");

    writer.incr(&"requests".to_string(), 5, None).await.unwrap();
    assert_eq!(reader.get(&"requests".to_string()).await.unwrap(), Some(5));

    let mut batch = HashMap::new();
    batch.insert("errors".to_string(), 1i64);
    writer.set_multi(&batch, None).await.unwrap();
    assert_eq!(reader.len().await.unwrap(), 2);
}

#[tokio::test]
async fn range_family_agrees_on_one_internal_ordering() {
    let client: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let queue: ZQueue<String> = ZQueue::new(client.clone(), "due");

    queue
        .add_multi(
            &[
                Element::new("early".to_string(), 10),
                Element::new("mid".to_string(), 20),
                Element::new("late".to_string(), 30),
            ],
            None,
        )
        .await
        .unwrap();

    // Unbounded range == bounded range covering everything
    let all = queue.range_by_score(10, 30).await.unwrap();
    let from = queue.range_from_score(10).await.unwrap();
    assert_eq!(all, from);

    // Rev of rev is the base ordering
    let rev: Vec<String> = queue.range_by_score_rev(10, 30).await.unwrap().members();
    let base: Vec<String> = all.members();
    let mut rev_back = rev.clone();
    rev_back.reverse();
    assert_eq!(rev_back, base);

    // Counting agrees with retrieval
    assert_eq!(
        queue.count_by_score("-inf", "+inf").await.unwrap() as usize,
        base.len()
    );
}

#[tokio::test]
async fn remove_range_reports_prior_cardinality() {
    let client: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let queue: ZQueue<u32> = ZQueue::new(client, "sweep");

    for (i, score) in [(1u32, 5i64), (2, 15), (3, 25)] {
        queue.add(&i, score, None).await.unwrap();
    }

    let before = queue.count().await.unwrap();
    let removed = queue.remove_range_by_score("-inf", "+inf").await.unwrap();
    assert_eq!(removed, before);
    assert_eq!(queue.count().await.unwrap(), 0);
}
