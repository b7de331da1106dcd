use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Quantity assigned to a cart item when a product is first added.
pub const INITIAL_QUANTITY: u32 = 1;

/// A registered member of the shop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Unique identifier for the `Member`
    ///
    /// Assigned by the storage adapter when the member is persisted.
    pub id: Uuid,
    /// Unique login name
    pub name: String,
    pub password: String,
}

/// A member that has not been persisted yet.
///
/// Members receive their identifier from storage, so a pre-persistence value
/// carries none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub password: String,
}

/// A catalog product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Price in the shop's smallest currency unit
    pub price: u32,
    pub image_url: String,
    /// Soft-delete marker
    ///
    /// Deleted products keep their storage row but are invisible to every
    /// cart-facing read.
    pub is_deleted: bool,
}

/// A product that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: u32,
    pub image_url: String,
}

/// A resource that belongs to exactly one member.
///
/// Ownership is fixed at creation and never transferred; every mutating
/// command checks it through this predicate before acting.
pub trait Owned {
    fn resource_id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;

    fn is_owned_by(&self, member: &Member) -> bool {
        self.owner_id() == member.id
    }
}

/// A line in a member's cart, joined with its owner and live product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub member: Member,
    pub product: Product,
    quantity: u32,
}

impl CartItem {
    pub fn new(id: Uuid, member: Member, product: Product, quantity: u32) -> Self {
        Self {
            id,
            member,
            product,
            quantity,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Replaces the quantity.
    ///
    /// A quantity of zero is a removal command, not a stored state; callers
    /// intercept it before reaching this method.
    pub fn change_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity >= 1);
        self.quantity = quantity;
    }
}

impl Owned for CartItem {
    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.member.id
    }
}

/// A cart line that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCartItem {
    pub member_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

impl NewCartItem {
    /// A fresh line for `product` in `member`'s cart, at [`INITIAL_QUANTITY`].
    pub fn new(member: &Member, product: &Product) -> Self {
        Self {
            member_id: member.id,
            product_id: product.id,
            quantity: INITIAL_QUANTITY,
        }
    }
}

/// A discount definition. Immutable reference data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coupon {
    pub id: Uuid,
    pub name: String,
    /// Discount as an integer percentage
    pub discount_rate: u32,
    /// Validity window granted on issuance, in days
    pub period_days: u32,
    pub expired_at: DateTime<Utc>,
}

/// A coupon definition that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCoupon {
    pub name: String,
    pub discount_rate: u32,
    pub period_days: u32,
    pub expired_at: DateTime<Utc>,
}

/// A coupon issued to a member, joined with its parent coupon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberCoupon {
    pub id: Uuid,
    pub member_id: Uuid,
    pub coupon: Coupon,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    is_used: bool,
}

impl MemberCoupon {
    pub fn new(
        id: Uuid,
        member_id: Uuid,
        coupon: Coupon,
        issued_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
        is_used: bool,
    ) -> Self {
        Self {
            id,
            member_id,
            coupon,
            issued_at,
            expired_at,
            is_used,
        }
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    /// Whether the coupon can still be redeemed at `now`.
    ///
    /// Both conditions are necessary: unused, and strictly before expiry.
    pub fn can_use(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now < self.expired_at
    }

    /// The one-way transition to the redeemed state.
    ///
    /// All other fields carry over unchanged; the record is persisted whole.
    pub fn mark_used(self) -> Self {
        Self {
            is_used: true,
            ..self
        }
    }
}

impl Owned for MemberCoupon {
    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.member_id
    }
}

/// An issuance that has not been persisted yet.
///
/// Stored with `is_used = false`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMemberCoupon {
    pub member_id: Uuid,
    pub coupon_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl NewMemberCoupon {
    /// Issues `coupon` to `member` at `now`.
    ///
    /// The validity window runs from `now` for the coupon's period.
    pub fn issue(member: &Member, coupon: &Coupon, now: DateTime<Utc>) -> Self {
        Self {
            member_id: member.id,
            coupon_id: coupon.id,
            issued_at: now,
            expired_at: now + Duration::days(coupon.period_days as i64),
        }
    }
}
