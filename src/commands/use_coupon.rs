use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use chrono::Utc;
use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{Member, MemberCoupon},
    ports::member_coupon::MemberCouponPort,
};

use super::{ensure_owner, DomainLogic, Error};

/// Redeems one of the member's coupons.
pub struct UseCouponRequest {
    pub member: Member,
    pub coupon_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UseCouponResponse {
    pub member_coupon: MemberCoupon,
}

impl<M, P, C, K, N> Service<UseCouponRequest> for DomainLogic<M, P, C, K, N>
where
    N: MemberCouponPort + 'static,
{
    type Response = UseCouponResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UseCouponRequest) -> Self::Future {
        let member_coupons = self.member_coupons.clone();
        Box::pin(async move {
            let member_coupon = member_coupons
                .get_member_coupon(req.member.id, req.coupon_id)
                .await?;
            // The lookup is already scoped to the member; the guard still
            // runs, like on every other mutation.
            ensure_owner(&req.member, &member_coupon)?;

            if !member_coupon.can_use(Utc::now()) {
                return Err(Error::CouponNotUsable {
                    member_id: req.member.id,
                    coupon_id: req.coupon_id,
                });
            }

            // Full-record update: everything but the used flag carries over.
            let member_coupon = member_coupon.mark_used();
            member_coupons.update_member_coupon(&member_coupon).await?;
            tracing::info!(
                member_id = %req.member.id,
                coupon_id = %req.coupon_id,
                "coupon redeemed"
            );

            Ok(UseCouponResponse { member_coupon })
        })
    }
}
