use uuid::Uuid;

use crate::domain::{MemberCoupon, NewMemberCoupon};

/// Storage operations over issued coupons.
///
/// Reads return the issuance joined with its parent coupon. At most one
/// issuance exists per (member, coupon) pair; the adapter enforces it.
#[mockall::automock]
#[async_trait::async_trait]
pub trait MemberCouponPort {
    async fn get_member_coupon(
        &self,
        member_id: Uuid,
        coupon_id: Uuid,
    ) -> Result<MemberCoupon, Error>;
    async fn find_member_coupons(&self, member_id: Uuid) -> Result<Vec<MemberCoupon>, Error>;
    async fn member_coupon_exists(&self, member_id: Uuid, coupon_id: Uuid)
        -> Result<bool, Error>;
    async fn create_member_coupon(&self, member_coupon: &NewMemberCoupon) -> Result<Uuid, Error>;
    /// Persists the whole record, not a partial patch.
    async fn update_member_coupon(&self, member_coupon: &MemberCoupon) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when no issuance exists for the pair
    #[error("coupon {coupon_id} was never issued to member {member_id}")]
    MemberCouponDoesNotExist { member_id: Uuid, coupon_id: Uuid },

    /// Storage-level uniqueness constraint on (member, coupon)
    #[error("coupon {coupon_id} is already issued to member {member_id}")]
    AlreadyIssued { member_id: Uuid, coupon_id: Uuid },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
