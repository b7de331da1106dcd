use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Member, Owned};

pub mod add_cart_item;
pub mod find_cart_items;
pub mod find_member_coupons;
pub mod issue_coupon;
pub mod register_member;
pub mod remove_cart_item;
pub mod remove_cart_items;
pub mod remove_products;
pub mod update_quantity;
pub mod use_coupon;

/// Shared state for every command service.
///
/// One storage port per aggregate; commands never talk to each other.
pub struct DomainLogic<M, P, C, K, N> {
    members: Arc<M>,
    products: Arc<P>,
    cart_items: Arc<C>,
    coupons: Arc<K>,
    member_coupons: Arc<N>,
}

impl<M, P, C, K, N> DomainLogic<M, P, C, K, N> {
    pub fn new(
        members: Arc<M>,
        products: Arc<P>,
        cart_items: Arc<C>,
        coupons: Arc<K>,
        member_coupons: Arc<N>,
    ) -> Self {
        Self {
            members,
            products,
            cart_items,
            coupons,
            member_coupons,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("member port error: {0:?}")]
    Member(#[from] crate::ports::member::Error),
    #[error("product port error: {0:?}")]
    Product(#[from] crate::ports::product::Error),
    #[error("cart item port error: {0:?}")]
    CartItem(#[from] crate::ports::cart_item::Error),
    #[error("coupon port error: {0:?}")]
    Coupon(#[from] crate::ports::coupon::Error),
    #[error("member coupon port error: {0:?}")]
    MemberCoupon(#[from] crate::ports::member_coupon::Error),

    /// The authenticated member does not own the addressed resource
    #[error("member {member_id} does not own resource {resource_id}")]
    NotOwner { member_id: Uuid, resource_id: Uuid },

    /// The bulk-removal id set does not fully match the member's own items
    #[error("{matched} of {requested} cart item id(s) belong to member {member_id}")]
    InvalidCartItemIds {
        member_id: Uuid,
        requested: usize,
        matched: usize,
    },

    /// The coupon has already been issued to this member
    #[error("coupon {coupon_id} was already issued to member {member_id}")]
    AlreadyIssued { member_id: Uuid, coupon_id: Uuid },

    /// The coupon has been redeemed before, or its validity window has passed
    #[error("coupon {coupon_id} is already used or expired for member {member_id}")]
    CouponNotUsable { member_id: Uuid, coupon_id: Uuid },

    /// The requested member name is taken
    #[error("member name {0:?} is already taken")]
    NameTaken(String),
}

/// Ownership guard applied at the top of every mutating command.
///
/// Ownership is re-verified on each call; it is never cached from a prior
/// lookup.
fn ensure_owner(member: &Member, resource: &impl Owned) -> Result<(), Error> {
    if resource.is_owned_by(member) {
        return Ok(());
    }
    Err(Error::NotOwner {
        member_id: member.id,
        resource_id: resource.resource_id(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::DomainLogic;
    use crate::{
        adapters::database::memory::MemoryDatabase,
        domain::{Coupon, Member, NewCartItem, NewCoupon, NewMember, NewProduct, Product},
        ports::{
            cart_item::CartItemPort,
            coupon::CouponPort,
            member::MemberPort,
            product::{DeletedFilter, ProductPort},
        },
    };

    pub type MemoryLogic =
        DomainLogic<MemoryDatabase, MemoryDatabase, MemoryDatabase, MemoryDatabase, MemoryDatabase>;

    /// Wires every port to the same in-memory database.
    pub fn domain_logic(database: &MemoryDatabase) -> MemoryLogic {
        let database = Arc::new(database.clone());
        DomainLogic {
            members: database.clone(),
            products: database.clone(),
            cart_items: database.clone(),
            coupons: database.clone(),
            member_coupons: database,
        }
    }

    pub async fn seed_member(database: &MemoryDatabase, name: &str) -> Member {
        let id = database
            .create_member(&NewMember {
                name: name.to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap();
        database.get_member(id).await.unwrap()
    }

    pub async fn seed_product(database: &MemoryDatabase, name: &str) -> Product {
        let id = database
            .create_product(&NewProduct {
                name: name.to_string(),
                price: 18_000,
                image_url: format!("https://img.example/{name}.png"),
            })
            .await
            .unwrap();
        database
            .get_product(id, DeletedFilter::Include)
            .await
            .unwrap()
    }

    pub async fn seed_coupon(database: &MemoryDatabase, name: &str, period_days: u32) -> Coupon {
        let id = database
            .create_coupon(&NewCoupon {
                name: name.to_string(),
                discount_rate: 10,
                period_days,
                expired_at: Utc::now() + Duration::days(365),
            })
            .await
            .unwrap();
        database.get_coupon(id).await.unwrap()
    }

    pub async fn seed_cart_item(
        database: &MemoryDatabase,
        member: &Member,
        product: &Product,
    ) -> Uuid {
        database
            .create_cart_item(&NewCartItem::new(member, product))
            .await
            .unwrap()
    }
}
