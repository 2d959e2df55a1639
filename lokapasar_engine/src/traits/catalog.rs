use crate::{pricing::Product, traits::OrderStoreError};

/// Read-only access to the product catalog. Catalog management is an external collaborator; the engine only needs a
/// snapshot of the rows a cart references, taken at pricing time.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog: Clone {
    /// Fetches the products (with their variants) for the given ids. Missing ids are simply absent from the result;
    /// the pricing engine turns that into an `InvalidLineItem` error.
    async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, OrderStoreError>;
}
