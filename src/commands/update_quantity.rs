use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{domain::Member, ports::cart_item::CartItemPort};

use super::{ensure_owner, DomainLogic, Error};

pub struct UpdateQuantityRequest {
    pub member: Member,
    pub cart_item_id: Uuid,
    /// Zero means "take the item out of the cart".
    pub quantity: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpdateQuantityResponse {
    Updated { quantity: u32 },
    /// The request carried a zero quantity and the line was deleted instead.
    Removed,
}

impl<M, P, C, K, N> Service<UpdateQuantityRequest> for DomainLogic<M, P, C, K, N>
where
    C: CartItemPort + 'static,
{
    type Response = UpdateQuantityResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdateQuantityRequest) -> Self::Future {
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            let mut cart_item = cart_items.get_cart_item(req.cart_item_id).await?;
            ensure_owner(&req.member, &cart_item)?;

            if req.quantity == 0 {
                cart_items.delete_cart_item(cart_item.id).await?;
                tracing::info!(
                    member_id = %req.member.id,
                    cart_item_id = %cart_item.id,
                    "cart item removed on zero quantity"
                );
                return Ok(UpdateQuantityResponse::Removed);
            }

            cart_item.change_quantity(req.quantity);
            cart_items.update_quantity(&cart_item).await?;
            tracing::info!(
                member_id = %req.member.id,
                cart_item_id = %cart_item.id,
                quantity = req.quantity,
                "cart item quantity changed"
            );

            Ok(UpdateQuantityResponse::Updated {
                quantity: req.quantity,
            })
        })
    }
}
