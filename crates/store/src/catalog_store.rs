use std::sync::Arc;

use tracing::{debug, info, warn};

use storefront_catalog::{NewProduct, Product, ProductPatch};
use storefront_core::{DomainError, DomainResult, ExpectedVersion, ProductId};

use super::MAX_COMMIT_ATTEMPTS;
use super::state_store::{StateStore, StoreError, Write};

/// Catalog operations: product creation, lookup, validated partial update,
/// deletion, batch fetch.
#[derive(Debug)]
pub struct CatalogStore<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: StateStore> CatalogStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_product(&self, input: NewProduct) -> DomainResult<Product> {
        let product = input.into_product(self.store.allocate_product_id())?;
        self.store.commit(vec![Write::PutProduct {
            expected: ExpectedVersion::Exact(0),
            product: product.clone(),
        }])?;
        info!(
            id = product.id.value(),
            title = %product.title,
            price_minor = product.price_minor,
            count = product.count,
            "product created"
        );
        Ok(product)
    }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.store.product(id).map(|(product, _)| product)
    }

    /// Apply a partial update. At least one field must be present; each
    /// present field is revalidated with the creation rules.
    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        if patch.is_empty() {
            return Err(DomainError::validation(
                "fields",
                "at least one field must be provided",
            ));
        }

        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let (mut product, version) = self
                .store
                .product(id)
                .ok_or_else(|| DomainError::not_found("product", id))?;
            patch.apply_to(&mut product)?;

            match self.store.commit(vec![Write::PutProduct {
                expected: ExpectedVersion::Exact(version),
                product: product.clone(),
            }]) {
                Ok(()) => {
                    info!(id = id.value(), "product updated");
                    return Ok(product);
                }
                Err(StoreError::Concurrency(msg)) => {
                    debug!(id = id.value(), attempt, %msg, "update conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "update of product {id} kept conflicting"
        )))
    }

    /// Remove a product. Unknown ids are reported, not errored.
    pub fn delete_product(&self, id: ProductId) -> (bool, String) {
        let Some((product, _)) = self.store.product(id) else {
            warn!(id = id.value(), "product not found for deletion");
            return (false, format!("product {id} not found"));
        };

        match self.store.commit(vec![Write::DeleteProduct { id }]) {
            Ok(()) => {
                info!(id = id.value(), title = %product.title, "product deleted");
                (true, format!("deleted product '{}' ({id})", product.title))
            }
            Err(StoreError::NotFound { .. }) => (false, format!("product {id} not found")),
            Err(e) => {
                warn!(id = id.value(), error = %e, "product deletion failed");
                (false, format!("failed to delete product {id}: {e}"))
            }
        }
    }

    /// All products, in stable id order.
    pub fn list_products(&self) -> Vec<Product> {
        self.store.list_products()
    }

    /// Products whose id is in `ids`, ordered by id. Used for batch
    /// price/stock resolution when pricing an order.
    pub fn products(&self, ids: &[ProductId]) -> Vec<Product> {
        self.store.products_by_ids(ids)
    }
}
