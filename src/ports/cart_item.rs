use uuid::Uuid;

use crate::domain::{CartItem, NewCartItem};

/// Storage operations over a member's cart lines.
///
/// Every read joins against live products: a line whose product is
/// soft-deleted does not exist as far as callers are concerned.
#[mockall::automock]
#[async_trait::async_trait]
pub trait CartItemPort {
    /// The member's cart lines, in insertion order.
    async fn find_cart_items(&self, member_id: Uuid) -> Result<Vec<CartItem>, Error>;
    async fn get_cart_item(&self, cart_item_id: Uuid) -> Result<CartItem, Error>;
    /// How many of `cart_item_ids` exist, belong to `member_id`, and reference
    /// a live product.
    async fn count_matching(&self, member_id: Uuid, cart_item_ids: &[Uuid])
        -> Result<usize, Error>;
    async fn create_cart_item(&self, cart_item: &NewCartItem) -> Result<Uuid, Error>;
    async fn update_quantity(&self, cart_item: &CartItem) -> Result<(), Error>;
    async fn delete_cart_item(&self, cart_item_id: Uuid) -> Result<(), Error>;
    /// Deletes the listed lines, restricted to those owned by `member_id`.
    async fn delete_matching(&self, member_id: Uuid, cart_item_ids: &[Uuid]) -> Result<(), Error>;
    /// Cascade used when products are removed from the catalog; returns the
    /// number of lines deleted.
    async fn delete_by_products(&self, product_ids: &[Uuid]) -> Result<usize, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a cart item does not exist
    ///
    /// Also covers items whose product has been soft-deleted.
    #[error("cart item {0} does not exist")]
    CartItemDoesNotExist(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
