use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{domain::Member, ports::cart_item::CartItemPort};

use super::{ensure_owner, DomainLogic, Error};

pub struct RemoveCartItemRequest {
    pub member: Member,
    pub cart_item_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RemoveCartItemResponse {
    pub cart_item_id: Uuid,
}

impl<M, P, C, K, N> Service<RemoveCartItemRequest> for DomainLogic<M, P, C, K, N>
where
    C: CartItemPort + 'static,
{
    type Response = RemoveCartItemResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RemoveCartItemRequest) -> Self::Future {
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            let cart_item = cart_items.get_cart_item(req.cart_item_id).await?;
            ensure_owner(&req.member, &cart_item)?;

            cart_items.delete_cart_item(cart_item.id).await?;
            tracing::info!(
                member_id = %req.member.id,
                cart_item_id = %cart_item.id,
                "cart item removed"
            );

            Ok(RemoveCartItemResponse {
                cart_item_id: cart_item.id,
            })
        })
    }
}
