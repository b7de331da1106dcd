use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{Member, NewCartItem},
    ports::{
        cart_item::CartItemPort,
        product::{DeletedFilter, ProductPort},
    },
};

use super::{DomainLogic, Error};

/// Puts a product into the member's cart.
///
/// Every call creates a new line, even for a product already in the cart;
/// lines are never merged.
pub struct AddCartItemRequest {
    pub member: Member,
    pub product_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AddCartItemResponse {
    pub cart_item_id: Uuid,
}

impl<M, P, C, K, N> Service<AddCartItemRequest> for DomainLogic<M, P, C, K, N>
where
    P: ProductPort + 'static,
    C: CartItemPort + 'static,
{
    type Response = AddCartItemResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AddCartItemRequest) -> Self::Future {
        let products = self.products.clone();
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            // Soft-deleted products cannot be added.
            let product = products
                .get_product(req.product_id, DeletedFilter::Exclude)
                .await?;

            let cart_item_id = cart_items
                .create_cart_item(&NewCartItem::new(&req.member, &product))
                .await?;
            tracing::info!(
                member_id = %req.member.id,
                product_id = %product.id,
                cart_item_id = %cart_item_id,
                "cart item added"
            );

            Ok(AddCartItemResponse { cart_item_id })
        })
    }
}
