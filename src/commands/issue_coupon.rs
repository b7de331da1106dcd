use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use chrono::{DateTime, Utc};
use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{Member, NewMemberCoupon},
    ports::{
        coupon::CouponPort,
        member_coupon::{self, MemberCouponPort},
    },
};

use super::{DomainLogic, Error};

/// Issues a coupon to a member.
///
/// A member holds at most one issuance per coupon, used or not.
pub struct IssueCouponRequest {
    pub member: Member,
    pub coupon_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct IssueCouponResponse {
    pub member_coupon_id: Uuid,
    /// End of the validity window granted by this issuance.
    pub expired_at: DateTime<Utc>,
}

impl<M, P, C, K, N> Service<IssueCouponRequest> for DomainLogic<M, P, C, K, N>
where
    K: CouponPort + 'static,
    N: MemberCouponPort + 'static,
{
    type Response = IssueCouponResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: IssueCouponRequest) -> Self::Future {
        let coupons = self.coupons.clone();
        let member_coupons = self.member_coupons.clone();
        Box::pin(async move {
            let coupon = coupons.get_coupon(req.coupon_id).await?;
            if member_coupons
                .member_coupon_exists(req.member.id, coupon.id)
                .await?
            {
                return Err(Error::AlreadyIssued {
                    member_id: req.member.id,
                    coupon_id: coupon.id,
                });
            }

            let issued = NewMemberCoupon::issue(&req.member, &coupon, Utc::now());
            // The (member, coupon) uniqueness constraint in storage is the
            // authoritative guard; map its violation like the pre-check.
            let member_coupon_id = member_coupons
                .create_member_coupon(&issued)
                .await
                .map_err(|err| match err {
                    member_coupon::Error::AlreadyIssued {
                        member_id,
                        coupon_id,
                    } => Error::AlreadyIssued {
                        member_id,
                        coupon_id,
                    },
                    err => err.into(),
                })?;
            tracing::info!(
                member_id = %req.member.id,
                coupon_id = %coupon.id,
                member_coupon_id = %member_coupon_id,
                "coupon issued"
            );

            Ok(IssueCouponResponse {
                member_coupon_id,
                expired_at: issued.expired_at,
            })
        })
    }
}
