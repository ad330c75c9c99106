use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    error::ProductResult,
    models::{CreateProduct, Product, ProductFilter, UpdateProduct},
    repository::ProductRepository,
};

/// PostgreSQL implementation of ProductRepository
///
/// Ids come from the `products.id` serial column, so they are never reused.
/// Read-modify-write updates lock the row for the length of a transaction.
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load the row under `FOR UPDATE`, apply `change`, write it back.
    async fn modify<F>(&self, id: i32, change: F) -> ProductResult<Option<Product>>
    where
        F: FnOnce(&mut Product) + Send,
    {
        let txn = self.db.begin().await?;

        let Some(model) = entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut product: Product = model.into();
        change(&mut product);

        let saved = entity::ActiveModel::from(&product).update(&txn).await?;
        txn.commit().await?;

        Ok(Some(saved.into()))
    }
}

/// `%`, `_` and `\` in user input match literally.
fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let mut query = entity::Entity::find();

        if let Some(q) = filter.q.as_deref() {
            query = query.filter(Expr::col(entity::Column::Name).ilike(like_pattern(q)));
        }

        if let Some(in_stock) = filter.in_stock {
            query = query.filter(entity::Column::InStock.eq(in_stock));
        }

        if let Some(min_price) = filter.min_price {
            query = query.filter(entity::Column::Price.gte(min_price));
        }

        if let Some(max_price) = filter.max_price {
            query = query.filter(entity::Column::Price.lte(max_price));
        }

        let models = query
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn replace(&self, id: i32, input: CreateProduct) -> ProductResult<Option<Product>> {
        let product = self.modify(id, |product| product.replace(input)).await?;
        if product.is_some() {
            tracing::info!(product_id = id, "Replaced product");
        }
        Ok(product)
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let product = self.modify(id, |product| product.apply_update(input)).await?;
        if product.is_some() {
            tracing::info!(product_id = id, "Updated product");
        }
        Ok(product)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProductError;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn phone_model() -> entity::Model {
        entity::Model {
            id: 1,
            name: "Phone".to_string(),
            description: None,
            price: 50000.0,
            in_stock: true,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("phone"), "%phone%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[tokio::test]
    async fn test_get_by_id_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![phone_model()]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(product.name, "Phone");
        assert_eq!(product.price, 50000.0);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert_eq!(repo.get_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_failure_becomes_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo.list(ProductFilter::default()).await.unwrap_err();
        assert!(matches!(err, ProductError::Database(_)));
    }
}
