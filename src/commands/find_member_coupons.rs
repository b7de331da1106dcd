use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{domain::MemberCoupon, ports::member_coupon::MemberCouponPort};

use super::{DomainLogic, Error};

pub struct FindMemberCouponsRequest {
    pub member_id: Uuid,
}

/// Every issuance held by the member, used or not, each joined with its
/// parent coupon for display.
#[derive(Debug, PartialEq, Eq)]
pub struct FindMemberCouponsResponse {
    pub member_coupons: Vec<MemberCoupon>,
}

impl<M, P, C, K, N> Service<FindMemberCouponsRequest> for DomainLogic<M, P, C, K, N>
where
    N: MemberCouponPort + 'static,
{
    type Response = FindMemberCouponsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindMemberCouponsRequest) -> Self::Future {
        let member_coupons = self.member_coupons.clone();
        Box::pin(async move {
            let member_coupons = member_coupons.find_member_coupons(req.member_id).await?;
            Ok(FindMemberCouponsResponse { member_coupons })
        })
    }
}
