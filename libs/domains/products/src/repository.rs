use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Inputs reaching the repository are already validated. Lookups of a
/// missing id return `None`/`false`; the service turns those into
/// `ProductError::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a new product under a freshly assigned id
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Products matching every criterion in `filter`, ordered by id
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Overwrite every mutable field of an existing product
    async fn replace(&self, id: i32, input: CreateProduct) -> ProductResult<Option<Product>>;

    /// Merge the supplied fields into an existing product
    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>>;

    /// Returns `true` when a product was removed
    async fn delete(&self, id: i32) -> ProductResult<bool>;
}

#[derive(Debug, Default)]
struct Catalog {
    products: BTreeMap<i32, Product>,
    last_id: i32,
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Ids start at 1 and are never reused, even after deletes.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut catalog = self.catalog.write().await;

        let id = catalog
            .last_id
            .checked_add(1)
            .ok_or_else(|| ProductError::Internal("product id space exhausted".to_string()))?;
        catalog.last_id = id;

        let product = Product::new(id, input);
        catalog.products.insert(id, product.clone());

        tracing::info!(product_id = id, "Created product");
        Ok(product)
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let catalog = self.catalog.read().await;

        Ok(catalog
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.get(&id).cloned())
    }

    async fn replace(&self, id: i32, input: CreateProduct) -> ProductResult<Option<Product>> {
        let mut catalog = self.catalog.write().await;

        let Some(product) = catalog.products.get_mut(&id) else {
            return Ok(None);
        };
        product.replace(input);

        tracing::info!(product_id = id, "Replaced product");
        Ok(Some(product.clone()))
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let mut catalog = self.catalog.write().await;

        let Some(product) = catalog.products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply_update(input);

        tracing::info!(product_id = id, "Updated product");
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut catalog = self.catalog.write().await;

        let removed = catalog.products.remove(&id).is_some();
        if removed {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }
}
