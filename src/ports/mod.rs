pub mod cart_item;
pub mod coupon;
pub mod member;
pub mod member_coupon;
pub mod product;
