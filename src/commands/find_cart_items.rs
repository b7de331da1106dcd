use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::{
    domain::{CartItem, Member},
    ports::cart_item::CartItemPort,
};

use super::{DomainLogic, Error};

pub struct FindCartItemsRequest {
    pub member: Member,
}

/// The member's cart, in insertion order, restricted to live products.
#[derive(Debug, PartialEq, Eq)]
pub struct FindCartItemsResponse {
    pub cart_items: Vec<CartItem>,
}

impl<M, P, C, K, N> Service<FindCartItemsRequest> for DomainLogic<M, P, C, K, N>
where
    C: CartItemPort + 'static,
{
    type Response = FindCartItemsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindCartItemsRequest) -> Self::Future {
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            let cart_items = cart_items.find_cart_items(req.member.id).await?;
            Ok(FindCartItemsResponse { cart_items })
        })
    }
}
