//! Integration tests over a real PostgreSQL instance.
//!
//! These need `DATABASE_URL`; without it every test logs a skip and passes.
//! Data from other runs may exist, so assertions are always restricted to
//! the rows created by the running test.

use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use storefront_catalog::ItemKind;
use storefront_core::{Address, DomainError, ItemId, MemberId, OrderId};
use storefront_infra::catalog::ItemStore;
use storefront_infra::members::MemberStore;
use storefront_infra::order_queries::{OrderQueryDto, OrderQueryStore};
use storefront_infra::orders::{OrderGraph, OrderSearch, OrderStore};
use storefront_infra::{init_schema, StoreError, DEFAULT_BATCH_FETCH_SIZE};
use storefront_orders::OrderStatus;

async fn pool_or_skip(test: &str) -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping {test}: DATABASE_URL not set");
        return None;
    };
    let pool = PgPool::connect(&url).await.expect("failed to connect");
    init_schema(&pool).await.expect("failed to init schema");
    Some(pool)
}

fn unique(name: &str) -> String {
    format!("{name}-{}", Uuid::now_v7())
}

async fn seed_member(pool: &PgPool, name: &str) -> MemberId {
    MemberStore::new(pool.clone())
        .register(&unique(name), Address::new("Seoul", "Teheran-ro 1", "06000"))
        .await
        .expect("failed to register member")
}

async fn seed_book(pool: &PgPool, name: &str, price: i64, stock: i64) -> ItemId {
    ItemStore::new(pool.clone())
        .create(
            ItemKind::Book {
                author: "kim".to_string(),
                isbn: "979-11-00000-00-0".to_string(),
            },
            &unique(name),
            price,
            stock,
        )
        .await
        .expect("failed to create item")
}

/// Strategy-independent view of one order, for content comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LogicalOrder {
    order_id: OrderId,
    member_name: String,
    city: String,
    lines: Vec<(String, i64, i64)>,
}

fn from_graph(g: &OrderGraph) -> LogicalOrder {
    LogicalOrder {
        order_id: g.order_id,
        member_name: g.member.name().to_string(),
        city: g.delivery.address().city.clone(),
        lines: g
            .lines
            .iter()
            .map(|l| {
                (
                    l.item.name().to_string(),
                    l.order_item.order_price(),
                    l.order_item.count(),
                )
            })
            .collect(),
    }
}

fn from_dto(o: &OrderQueryDto) -> LogicalOrder {
    LogicalOrder {
        order_id: o.order_id,
        member_name: o.name.clone(),
        city: o.address.city.clone(),
        lines: o
            .order_items
            .iter()
            .map(|i| (i.item_name.clone(), i.order_price, i.count))
            .collect(),
    }
}

fn restrict(mut orders: Vec<LogicalOrder>, ours: &BTreeSet<OrderId>) -> Vec<LogicalOrder> {
    orders.retain(|o| ours.contains(&o.order_id));
    orders.sort();
    orders
}

#[tokio::test]
async fn every_strategy_returns_identical_logical_content() {
    let Some(pool) = pool_or_skip("every_strategy_returns_identical_logical_content").await
    else {
        return;
    };

    let member_a = seed_member(&pool, "kim").await;
    let member_b = seed_member(&pool, "lee").await;
    let book_1 = seed_book(&pool, "book-1", 100, 100).await;
    let book_2 = seed_book(&pool, "book-2", 200, 100).await;
    let book_3 = seed_book(&pool, "book-3", 300, 100).await;

    let orders = OrderStore::new(pool.clone(), DEFAULT_BATCH_FETCH_SIZE);
    let mut ours = BTreeSet::new();
    ours.insert(
        orders
            .place_order_with_lines(member_a, &[(book_1, 3), (book_2, 1)])
            .await
            .unwrap(),
    );
    ours.insert(
        orders
            .place_order_with_lines(member_b, &[(book_2, 2), (book_3, 4)])
            .await
            .unwrap(),
    );
    ours.insert(orders.place_order(member_a, book_3, 1).await.unwrap());

    let queries = OrderQueryStore::new(pool.clone());
    let search = OrderSearch::default();

    let naive = restrict(
        orders
            .find_all_naive(&search)
            .await
            .unwrap()
            .iter()
            .map(from_graph)
            .collect(),
        &ours,
    );
    let joined = restrict(
        orders
            .find_all_with_items()
            .await
            .unwrap()
            .iter()
            .map(from_graph)
            .collect(),
        &ours,
    );
    let paged = restrict(
        orders
            .find_all_paged_with_lines(0, 1_000_000)
            .await
            .unwrap()
            .iter()
            .map(from_graph)
            .collect(),
        &ours,
    );
    let per_root = restrict(
        queries
            .find_order_dtos()
            .await
            .unwrap()
            .iter()
            .map(from_dto)
            .collect(),
        &ours,
    );
    let batched = restrict(
        queries
            .find_order_dtos_optimized()
            .await
            .unwrap()
            .iter()
            .map(from_dto)
            .collect(),
        &ours,
    );
    let flat = restrict(
        queries
            .find_order_dtos_flat()
            .await
            .unwrap()
            .iter()
            .map(from_dto)
            .collect(),
        &ours,
    );

    assert_eq!(naive.len(), 3);
    assert_eq!(naive, joined);
    assert_eq!(naive, paged);
    assert_eq!(naive, per_root);
    assert_eq!(naive, batched);
    assert_eq!(naive, flat);
}

#[tokio::test]
async fn small_batch_size_still_loads_every_line() {
    let Some(pool) = pool_or_skip("small_batch_size_still_loads_every_line").await else {
        return;
    };

    let member = seed_member(&pool, "park").await;
    let book = seed_book(&pool, "book-4", 50, 1_000).await;

    // Batch size 2 forces several IN-clause round trips.
    let orders = OrderStore::new(pool.clone(), 2);
    let mut ours = BTreeSet::new();
    for _ in 0..5 {
        ours.insert(orders.place_order(member, book, 1).await.unwrap());
    }

    let paged: Vec<LogicalOrder> = orders
        .find_all_paged_with_lines(0, 1_000_000)
        .await
        .unwrap()
        .iter()
        .map(from_graph)
        .collect();
    let paged = restrict(paged, &ours);
    assert_eq!(paged.len(), 5);
    assert!(paged.iter().all(|o| o.lines.len() == 1));
}

#[tokio::test]
async fn placing_and_canceling_roundtrips_stock() {
    let Some(pool) = pool_or_skip("placing_and_canceling_roundtrips_stock").await else {
        return;
    };

    let member = seed_member(&pool, "kim").await;
    let book = seed_book(&pool, "book-1", 100, 10).await;
    let items = ItemStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone(), DEFAULT_BATCH_FETCH_SIZE);

    let order_id = orders.place_order(member, book, 3).await.unwrap();
    assert_eq!(items.find_one(book).await.unwrap().stock_quantity(), 7);

    let order = orders.find_one(order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Ordered);
    assert_eq!(order.total_price(), 300);

    let canceled = orders.cancel_order(order_id).await.unwrap();
    assert_eq!(canceled.status(), OrderStatus::Canceled);
    assert_eq!(items.find_one(book).await.unwrap().stock_quantity(), 10);

    // Double cancel is an explicit conflict.
    match orders.cancel_order(order_id).await.unwrap_err() {
        StoreError::Domain(DomainError::Conflict(_)) => {}
        other => panic!("Expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn ordering_beyond_stock_fails_without_side_effects() {
    let Some(pool) = pool_or_skip("ordering_beyond_stock_fails_without_side_effects").await
    else {
        return;
    };

    let member = seed_member(&pool, "kim").await;
    let book = seed_book(&pool, "book-1", 100, 10).await;
    let items = ItemStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone(), DEFAULT_BATCH_FETCH_SIZE);

    match orders.place_order(member, book, 11).await.unwrap_err() {
        StoreError::Domain(DomainError::InsufficientStock {
            requested,
            available,
        }) => {
            assert_eq!(requested, 11);
            assert_eq!(available, 10);
        }
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(items.find_one(book).await.unwrap().stock_quantity(), 10);
}

#[tokio::test]
async fn missing_ids_are_clean_not_found_errors() {
    let Some(pool) = pool_or_skip("missing_ids_are_clean_not_found_errors").await else {
        return;
    };

    let orders = OrderStore::new(pool.clone(), DEFAULT_BATCH_FETCH_SIZE);
    match orders.find_one(OrderId::new()).await.unwrap_err() {
        StoreError::Domain(DomainError::NotFound) => {}
        other => panic!("Expected NotFound, got {other:?}"),
    }

    match orders
        .place_order(MemberId::new(), ItemId::new(), 1)
        .await
        .unwrap_err()
    {
        StoreError::Domain(DomainError::NotFound) => {}
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_member_names_conflict() {
    let Some(pool) = pool_or_skip("duplicate_member_names_conflict").await else {
        return;
    };

    let members = MemberStore::new(pool.clone());
    let name = unique("kim");
    members
        .register(&name, Address::new("Seoul", "Teheran-ro 1", "06000"))
        .await
        .unwrap();
    match members
        .register(&name, Address::new("Busan", "Haeundae-ro 2", "48000"))
        .await
        .unwrap_err()
    {
        StoreError::Domain(DomainError::Conflict(_)) => {}
        other => panic!("Expected Conflict, got {other:?}"),
    }
}
