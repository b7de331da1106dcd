use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{domain::Member, ports::cart_item::CartItemPort};

use super::{DomainLogic, Error};

/// Bulk removal of cart lines.
///
/// All-or-nothing: the request only proceeds when every id names an existing
/// item owned by the caller, so mixing in someone else's id deletes nothing.
pub struct RemoveCartItemsRequest {
    pub member: Member,
    pub cart_item_ids: Vec<Uuid>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RemoveCartItemsResponse {
    pub removed: usize,
}

impl<M, P, C, K, N> Service<RemoveCartItemsRequest> for DomainLogic<M, P, C, K, N>
where
    C: CartItemPort + 'static,
{
    type Response = RemoveCartItemsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RemoveCartItemsRequest) -> Self::Future {
        let cart_items = self.cart_items.clone();
        Box::pin(async move {
            let matched = cart_items
                .count_matching(req.member.id, &req.cart_item_ids)
                .await?;
            if matched != req.cart_item_ids.len() {
                tracing::warn!(
                    member_id = %req.member.id,
                    requested = req.cart_item_ids.len(),
                    matched,
                    "bulk cart removal rejected"
                );
                return Err(Error::InvalidCartItemIds {
                    member_id: req.member.id,
                    requested: req.cart_item_ids.len(),
                    matched,
                });
            }

            // The delete itself stays scoped to the member as well; the count
            // check above is not the only guard.
            cart_items
                .delete_matching(req.member.id, &req.cart_item_ids)
                .await?;
            tracing::info!(
                member_id = %req.member.id,
                removed = req.cart_item_ids.len(),
                "cart items removed"
            );

            Ok(RemoveCartItemsResponse {
                removed: req.cart_item_ids.len(),
            })
        })
    }
}
