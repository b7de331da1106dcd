use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::ports::{cart_item::CartItemPort, product::ProductPort};

use super::{DomainLogic, Error};

/// Takes products off the catalog.
///
/// Administrative operation: products are soft-deleted, then every cart line
/// referencing them is detached so no cart keeps pointing at a dead product.
pub struct RemoveProductsRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RemoveProductsResponse {
    /// Cart lines deleted by the cascade.
    pub detached_cart_items: usize,
}

impl<M, P, C, K, N> Service<RemoveProductsRequest> for DomainLogic<M, P, C, K, N>
where
    P: ProductPort + 'static,
    C: CartItemPort + 'static,
{
    type Response = RemoveProductsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RemoveProductsRequest) -> Self::Future {
        let products = self.products.clone();
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            products.mark_deleted(&req.product_ids).await?;
            let detached_cart_items = cart_items.delete_by_products(&req.product_ids).await?;
            tracing::info!(
                removed = req.product_ids.len(),
                detached_cart_items,
                "products removed from the catalog"
            );

            Ok(RemoveProductsResponse {
                detached_cart_items,
            })
        })
    }
}
