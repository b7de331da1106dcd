use uuid::Uuid;

use crate::domain::{NewProduct, Product};

/// Whether a lookup sees soft-deleted products.
///
/// Cart-facing reads always use [`DeletedFilter::Exclude`]; the marker row stays
/// in storage either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletedFilter {
    Exclude,
    Include,
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait ProductPort {
    async fn get_product(&self, product_id: Uuid, filter: DeletedFilter) -> Result<Product, Error>;
    async fn create_product(&self, product: &NewProduct) -> Result<Uuid, Error>;
    /// Soft-deletes every listed product, or none when any id is unknown.
    async fn mark_deleted(&self, product_ids: &[Uuid]) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a product does not exist
    ///
    /// Also covers soft-deleted products under [`DeletedFilter::Exclude`].
    #[error("product {0} does not exist")]
    ProductDoesNotExist(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
