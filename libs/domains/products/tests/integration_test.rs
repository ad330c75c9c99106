//! Integration tests for Products domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries and the ILIKE name search work against the real schema
//! - Table constraints back up request validation
//! - Ids come from the sequence and are not reused
//! - Concurrent partial updates do not lose writes
//!
//! They need Docker: `cargo test -p domain_products -- --ignored`

use domain_products::*;
use sea_orm::ConnectionTrait;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_get_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = CreateProduct {
        name: builder.name("phone"),
        description: Some("Integration test product".to_string()),
        price: builder.price(0),
        in_stock: true,
    };

    let created = repo.create(input.clone()).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.name, input.name);

    let retrieved = assert_some(
        repo.get_by_id(created.id).await.unwrap(),
        "product should exist",
    );
    assert_eq!(retrieved.description, input.description);
    assert_price_eq(retrieved.price, input.price, "retrieved price");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_filters_and_orders_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    for (name, price, in_stock) in [
        ("Phone", 50000.0, true),
        ("Headphone", 12000.0, false),
        ("Tablet", 30000.0, true),
        ("50% off_sale", 10.0, true),
    ] {
        repo.create(CreateProduct {
            name: name.to_string(),
            description: None,
            price,
            in_stock,
        })
        .await
        .unwrap();
    }

    let phones = repo
        .list(ProductFilter {
            q: Some("PHONE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = phones.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Phone", "Headphone"]);

    let literal = repo
        .list(ProductFilter {
            q: Some("%".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(literal.len(), 1, "% in the query matches literally");

    let in_range = repo
        .list(ProductFilter {
            in_stock: Some(true),
            min_price: Some(30000.0),
            max_price: Some(50000.0),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i32> = in_range.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_replace_update_delete() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let created = repo
        .create(CreateProduct {
            name: "Phone".to_string(),
            description: Some("Flagship".to_string()),
            price: 50000.0,
            in_stock: true,
        })
        .await
        .unwrap();

    let updated = assert_some(
        repo.update(
            created.id,
            UpdateProduct {
                description: Some(None),
                price: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap(),
        "update existing",
    );
    assert_eq!(updated.name, "Phone");
    assert_eq!(updated.description, None);
    assert_price_eq(updated.price, 100.0, "patched price");

    let replaced = assert_some(
        repo.replace(
            created.id,
            CreateProduct {
                name: "Phone 2".to_string(),
                description: None,
                price: 200.0,
                in_stock: false,
            },
        )
        .await
        .unwrap(),
        "replace existing",
    );
    assert_eq!(replaced.name, "Phone 2");
    assert!(!replaced.in_stock);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
    assert_eq!(repo.update(created.id, UpdateProduct::default()).await.unwrap(), None);

    let next = repo
        .create(CreateProduct {
            name: "Tablet".to_string(),
            description: None,
            price: 1.0,
            in_stock: true,
        })
        .await
        .unwrap();
    assert!(next.id > created.id, "ids are never reused");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_price_constraint_enforced_by_schema() {
    let db = TestDatabase::new().await;

    let result = db
        .connection()
        .execute_unprepared("INSERT INTO products (name, price) VALUES ('Free', 0)")
        .await;
    assert!(result.is_err(), "price > 0 check constraint should reject");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_updates_do_not_lose_writes() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let created = repo
        .create(CreateProduct {
            name: "Phone".to_string(),
            description: None,
            price: 100.0,
            in_stock: true,
        })
        .await
        .unwrap();

    let price_repo = repo.clone();
    let stock_repo = repo.clone();
    let id = created.id;

    let (price, stock) = tokio::join!(
        tokio::spawn(async move {
            price_repo
                .update(
                    id,
                    UpdateProduct {
                        price: Some(250.0),
                        ..Default::default()
                    },
                )
                .await
        }),
        tokio::spawn(async move {
            stock_repo
                .update(
                    id,
                    UpdateProduct {
                        in_stock: Some(false),
                        ..Default::default()
                    },
                )
                .await
        }),
    );
    price.unwrap().unwrap();
    stock.unwrap().unwrap();

    let stored = assert_some(repo.get_by_id(id).await.unwrap(), "product should exist");
    assert_price_eq(stored.price, 250.0, "price update kept");
    assert!(!stored.in_stock, "stock update kept");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_truncate_restarts_ids() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("truncate_restarts_ids");

    let input = CreateProduct {
        name: builder.name("phone"),
        description: None,
        price: builder.price(1),
        in_stock: true,
    };
    repo.create(input.clone()).await.unwrap();
    db.truncate_products().await;

    let created = repo.create(input).await.unwrap();
    assert_eq!(created.id, 1);
}
