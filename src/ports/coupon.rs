use uuid::Uuid;

use crate::domain::{Coupon, NewCoupon};

#[mockall::automock]
#[async_trait::async_trait]
pub trait CouponPort {
    async fn get_coupon(&self, coupon_id: Uuid) -> Result<Coupon, Error>;
    async fn create_coupon(&self, coupon: &NewCoupon) -> Result<Uuid, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a coupon does not exist
    #[error("coupon {0} does not exist")]
    CouponDoesNotExist(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
