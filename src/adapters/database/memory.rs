use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    domain::{
        CartItem, Coupon, Member, MemberCoupon, NewCartItem, NewCoupon, NewMember,
        NewMemberCoupon, NewProduct, Product,
    },
    ports::{
        cart_item::{self, CartItemPort},
        coupon::{self, CouponPort},
        member::{self, MemberPort},
        member_coupon::{self, MemberCouponPort},
        product::{self, DeletedFilter, ProductPort},
    },
};

/// In-memory storage backing all five ports.
///
/// A single lock guards every table so that joins read one consistent
/// snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<Uuid, Member>,
    products: HashMap<Uuid, Product>,
    coupons: HashMap<Uuid, Coupon>,
    /// `Vec` rather than a map: listings must come back in insertion order.
    cart_items: Vec<CartItemRow>,
    member_coupons: Vec<MemberCouponRow>,
}

#[derive(Clone, Debug)]
struct CartItemRow {
    id: Uuid,
    member_id: Uuid,
    product_id: Uuid,
    quantity: u32,
}

#[derive(Clone, Debug)]
struct MemberCouponRow {
    id: Uuid,
    member_id: Uuid,
    coupon_id: Uuid,
    issued_at: DateTime<Utc>,
    expired_at: DateTime<Utc>,
    is_used: bool,
}

impl Tables {
    fn product_is_live(&self, product_id: Uuid) -> bool {
        self.products
            .get(&product_id)
            .map_or(false, |product| !product.is_deleted)
    }

    /// Joins a cart row with its owner and product.
    ///
    /// `None` when the product is soft-deleted: the row still exists, the
    /// item does not.
    fn join_cart_item(&self, row: &CartItemRow) -> Result<Option<CartItem>, cart_item::Error> {
        let member = self
            .members
            .get(&row.member_id)
            .ok_or_else(|| cart_item::Error::Adapter(dangling("member", row.member_id)))?;
        let product = self
            .products
            .get(&row.product_id)
            .ok_or_else(|| cart_item::Error::Adapter(dangling("product", row.product_id)))?;
        if product.is_deleted {
            return Ok(None);
        }
        Ok(Some(CartItem::new(
            row.id,
            member.clone(),
            product.clone(),
            row.quantity,
        )))
    }

    fn join_member_coupon(
        &self,
        row: &MemberCouponRow,
    ) -> Result<MemberCoupon, member_coupon::Error> {
        let coupon = self
            .coupons
            .get(&row.coupon_id)
            .ok_or_else(|| member_coupon::Error::Adapter(dangling("coupon", row.coupon_id)))?;
        Ok(MemberCoupon::new(
            row.id,
            row.member_id,
            coupon.clone(),
            row.issued_at,
            row.expired_at,
            row.is_used,
        ))
    }
}

#[async_trait::async_trait]
impl MemberPort for MemoryDatabase {
    async fn get_member(&self, member_id: Uuid) -> Result<Member, member::Error> {
        self.tables
            .lock()?
            .members
            .get(&member_id)
            .cloned()
            .ok_or(member::Error::MemberDoesNotExist(member_id))
    }

    async fn get_member_by_name(&self, name: &str) -> Result<Member, member::Error> {
        self.tables
            .lock()?
            .members
            .values()
            .find(|member| member.name == name)
            .cloned()
            .ok_or_else(|| member::Error::MemberNameDoesNotExist(name.to_string()))
    }

    async fn member_exists(&self, name: &str) -> Result<bool, member::Error> {
        let exists = self
            .tables
            .lock()?
            .members
            .values()
            .any(|member| member.name == name);
        Ok(exists)
    }

    async fn create_member(&self, member: &NewMember) -> Result<Uuid, member::Error> {
        let mut tables = self.tables.lock()?;
        if tables.members.values().any(|m| m.name == member.name) {
            return Err(member::Error::NameAlreadyExists(member.name.clone()));
        }
        let id = Uuid::new_v4();
        tables.members.insert(
            id,
            Member {
                id,
                name: member.name.clone(),
                password: member.password.clone(),
            },
        );
        Ok(id)
    }

    async fn update_member(&self, member: &Member) -> Result<(), member::Error> {
        let mut tables = self.tables.lock()?;
        let stored = tables
            .members
            .get_mut(&member.id)
            .ok_or(member::Error::MemberDoesNotExist(member.id))?;
        *stored = member.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductPort for MemoryDatabase {
    async fn get_product(
        &self,
        product_id: Uuid,
        filter: DeletedFilter,
    ) -> Result<Product, product::Error> {
        let product = self
            .tables
            .lock()?
            .products
            .get(&product_id)
            .cloned()
            .ok_or(product::Error::ProductDoesNotExist(product_id))?;
        if product.is_deleted && filter == DeletedFilter::Exclude {
            return Err(product::Error::ProductDoesNotExist(product_id));
        }
        Ok(product)
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Uuid, product::Error> {
        let mut tables = self.tables.lock()?;
        let id = Uuid::new_v4();
        tables.products.insert(
            id,
            Product {
                id,
                name: product.name.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                is_deleted: false,
            },
        );
        Ok(id)
    }

    async fn mark_deleted(&self, product_ids: &[Uuid]) -> Result<(), product::Error> {
        let mut tables = self.tables.lock()?;
        // All-or-nothing: reject the whole batch on the first unknown id.
        for product_id in product_ids {
            if !tables.products.contains_key(product_id) {
                return Err(product::Error::ProductDoesNotExist(*product_id));
            }
        }
        for product_id in product_ids {
            if let Some(product) = tables.products.get_mut(product_id) {
                product.is_deleted = true;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CouponPort for MemoryDatabase {
    async fn get_coupon(&self, coupon_id: Uuid) -> Result<Coupon, coupon::Error> {
        self.tables
            .lock()?
            .coupons
            .get(&coupon_id)
            .cloned()
            .ok_or(coupon::Error::CouponDoesNotExist(coupon_id))
    }

    async fn create_coupon(&self, coupon: &NewCoupon) -> Result<Uuid, coupon::Error> {
        let mut tables = self.tables.lock()?;
        let id = Uuid::new_v4();
        tables.coupons.insert(
            id,
            Coupon {
                id,
                name: coupon.name.clone(),
                discount_rate: coupon.discount_rate,
                period_days: coupon.period_days,
                expired_at: coupon.expired_at,
            },
        );
        Ok(id)
    }
}

#[async_trait::async_trait]
impl CartItemPort for MemoryDatabase {
    async fn find_cart_items(&self, member_id: Uuid) -> Result<Vec<CartItem>, cart_item::Error> {
        let tables = self.tables.lock()?;
        let mut cart_items = Vec::new();
        for row in tables
            .cart_items
            .iter()
            .filter(|row| row.member_id == member_id)
        {
            if let Some(cart_item) = tables.join_cart_item(row)? {
                cart_items.push(cart_item);
            }
        }
        Ok(cart_items)
    }

    async fn get_cart_item(&self, cart_item_id: Uuid) -> Result<CartItem, cart_item::Error> {
        let tables = self.tables.lock()?;
        let row = tables
            .cart_items
            .iter()
            .find(|row| row.id == cart_item_id)
            .ok_or(cart_item::Error::CartItemDoesNotExist(cart_item_id))?;
        tables
            .join_cart_item(row)?
            .ok_or(cart_item::Error::CartItemDoesNotExist(cart_item_id))
    }

    async fn count_matching(
        &self,
        member_id: Uuid,
        cart_item_ids: &[Uuid],
    ) -> Result<usize, cart_item::Error> {
        let tables = self.tables.lock()?;
        let count = tables
            .cart_items
            .iter()
            .filter(|row| {
                cart_item_ids.contains(&row.id)
                    && row.member_id == member_id
                    && tables.product_is_live(row.product_id)
            })
            .count();
        Ok(count)
    }

    async fn create_cart_item(&self, cart_item: &NewCartItem) -> Result<Uuid, cart_item::Error> {
        let mut tables = self.tables.lock()?;
        let id = Uuid::new_v4();
        tables.cart_items.push(CartItemRow {
            id,
            member_id: cart_item.member_id,
            product_id: cart_item.product_id,
            quantity: cart_item.quantity,
        });
        Ok(id)
    }

    async fn update_quantity(&self, cart_item: &CartItem) -> Result<(), cart_item::Error> {
        let mut tables = self.tables.lock()?;
        let row = tables
            .cart_items
            .iter_mut()
            .find(|row| row.id == cart_item.id)
            .ok_or(cart_item::Error::CartItemDoesNotExist(cart_item.id))?;
        row.quantity = cart_item.quantity();
        Ok(())
    }

    async fn delete_cart_item(&self, cart_item_id: Uuid) -> Result<(), cart_item::Error> {
        // Deleting an absent row is a no-op, like SQL DELETE matching nothing.
        self.tables.lock()?.cart_items.retain(|row| row.id != cart_item_id);
        Ok(())
    }

    async fn delete_matching(
        &self,
        member_id: Uuid,
        cart_item_ids: &[Uuid],
    ) -> Result<(), cart_item::Error> {
        // The member scope is part of the delete itself, not a pre-check:
        // rows owned by someone else never match.
        self.tables.lock()?.cart_items.retain(|row| {
            !(cart_item_ids.contains(&row.id) && row.member_id == member_id)
        });
        Ok(())
    }

    async fn delete_by_products(&self, product_ids: &[Uuid]) -> Result<usize, cart_item::Error> {
        let mut tables = self.tables.lock()?;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|row| !product_ids.contains(&row.product_id));
        Ok(before - tables.cart_items.len())
    }
}

#[async_trait::async_trait]
impl MemberCouponPort for MemoryDatabase {
    async fn get_member_coupon(
        &self,
        member_id: Uuid,
        coupon_id: Uuid,
    ) -> Result<MemberCoupon, member_coupon::Error> {
        let tables = self.tables.lock()?;
        let row = tables
            .member_coupons
            .iter()
            .find(|row| row.member_id == member_id && row.coupon_id == coupon_id)
            .ok_or(member_coupon::Error::MemberCouponDoesNotExist {
                member_id,
                coupon_id,
            })?;
        tables.join_member_coupon(row)
    }

    async fn find_member_coupons(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<MemberCoupon>, member_coupon::Error> {
        let tables = self.tables.lock()?;
        tables
            .member_coupons
            .iter()
            .filter(|row| row.member_id == member_id)
            .map(|row| tables.join_member_coupon(row))
            .collect()
    }

    async fn member_coupon_exists(
        &self,
        member_id: Uuid,
        coupon_id: Uuid,
    ) -> Result<bool, member_coupon::Error> {
        let exists = self
            .tables
            .lock()?
            .member_coupons
            .iter()
            .any(|row| row.member_id == member_id && row.coupon_id == coupon_id);
        Ok(exists)
    }

    async fn create_member_coupon(
        &self,
        member_coupon: &NewMemberCoupon,
    ) -> Result<Uuid, member_coupon::Error> {
        let mut tables = self.tables.lock()?;
        // Uniqueness on (member, coupon) regardless of used state.
        let duplicate = tables.member_coupons.iter().any(|row| {
            row.member_id == member_coupon.member_id && row.coupon_id == member_coupon.coupon_id
        });
        if duplicate {
            return Err(member_coupon::Error::AlreadyIssued {
                member_id: member_coupon.member_id,
                coupon_id: member_coupon.coupon_id,
            });
        }
        let id = Uuid::new_v4();
        tables.member_coupons.push(MemberCouponRow {
            id,
            member_id: member_coupon.member_id,
            coupon_id: member_coupon.coupon_id,
            issued_at: member_coupon.issued_at,
            expired_at: member_coupon.expired_at,
            is_used: false,
        });
        Ok(id)
    }

    async fn update_member_coupon(
        &self,
        member_coupon: &MemberCoupon,
    ) -> Result<(), member_coupon::Error> {
        let mut tables = self.tables.lock()?;
        let row = tables
            .member_coupons
            .iter_mut()
            .find(|row| row.id == member_coupon.id)
            .ok_or(member_coupon::Error::MemberCouponDoesNotExist {
                member_id: member_coupon.member_id,
                coupon_id: member_coupon.coupon.id,
            })?;
        *row = MemberCouponRow {
            id: member_coupon.id,
            member_id: member_coupon.member_id,
            coupon_id: member_coupon.coupon.id,
            issued_at: member_coupon.issued_at,
            expired_at: member_coupon.expired_at,
            is_used: member_coupon.is_used(),
        };
        Ok(())
    }
}

/// A row referencing a record that is gone from its table.
#[derive(Debug, thiserror::Error)]
#[error("{table} {id} is referenced but missing")]
struct DanglingRowError {
    table: &'static str,
    id: Uuid,
}

fn dangling(table: &'static str, id: Uuid) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(DanglingRowError { table, id })
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for member::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for product::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for coupon::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for cart_item::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for member_coupon::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use speculoos::prelude::*;

    async fn member(database: &MemoryDatabase, name: &str) -> Member {
        let id = database
            .create_member(&NewMember {
                name: name.to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap();
        database.get_member(id).await.unwrap()
    }

    async fn product(database: &MemoryDatabase, name: &str) -> Product {
        let id = database
            .create_product(&NewProduct {
                name: name.to_string(),
                price: 2500,
                image_url: "https://img.example/p.png".to_string(),
            })
            .await
            .unwrap();
        database
            .get_product(id, DeletedFilter::Include)
            .await
            .unwrap()
    }

    async fn coupon(database: &MemoryDatabase, name: &str) -> Coupon {
        let id = database
            .create_coupon(&NewCoupon {
                name: name.to_string(),
                discount_rate: 15,
                period_days: 7,
                expired_at: Utc::now() + Duration::days(365),
            })
            .await
            .unwrap();
        database.get_coupon(id).await.unwrap()
    }

    #[tokio::test]
    async fn test_member_name_is_unique() {
        let database = MemoryDatabase::default();
        member(&database, "dooly").await;

        let res = database
            .create_member(&NewMember {
                name: "dooly".to_string(),
                password: "other".to_string(),
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, member::Error::NameAlreadyExists(name) if name == "dooly"));
    }

    #[tokio::test]
    async fn test_get_member_by_name() {
        let database = MemoryDatabase::default();
        let created = member(&database, "dooly").await;

        let res = database.get_member_by_name("dooly").await;

        assert_that!(res).is_ok().is_equal_to(created);
        let res = database.get_member_by_name("nobody").await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, member::Error::MemberNameDoesNotExist(_)));
    }

    #[tokio::test]
    async fn test_update_member() {
        let database = MemoryDatabase::default();
        let mut stored = member(&database, "dooly").await;

        stored.password = "rotated".to_string();
        database.update_member(&stored).await.unwrap();

        let res = database.get_member(stored.id).await;
        assert_that!(res).is_ok().is_equal_to(stored);
    }

    #[tokio::test]
    async fn test_cart_listing_keeps_insertion_order() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let chair = product(&database, "chair").await;
        let desk = product(&database, "desk").await;

        let first = database
            .create_cart_item(&NewCartItem::new(&owner, &chair))
            .await
            .unwrap();
        let second = database
            .create_cart_item(&NewCartItem::new(&owner, &desk))
            .await
            .unwrap();

        let listing = database.find_cart_items(owner.id).await.unwrap();
        let ids: Vec<_> = listing.iter().map(|cart_item| cart_item.id).collect();
        assert_that!(ids).is_equal_to(vec![first, second]);
    }

    #[tokio::test]
    async fn test_soft_deleted_products_are_invisible() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let chair = product(&database, "chair").await;
        let desk = product(&database, "desk").await;
        let kept = database
            .create_cart_item(&NewCartItem::new(&owner, &desk))
            .await
            .unwrap();
        let hidden = database
            .create_cart_item(&NewCartItem::new(&owner, &chair))
            .await
            .unwrap();

        database.mark_deleted(&[chair.id]).await.unwrap();

        // The row is still there, but no read returns it.
        let listing = database.find_cart_items(owner.id).await.unwrap();
        assert_that!(listing).has_length(1);
        assert_that!(listing[0].id).is_equal_to(kept);
        let res = database.get_cart_item(hidden).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, cart_item::Error::CartItemDoesNotExist(_)));
        let res = database.get_product(chair.id, DeletedFilter::Exclude).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, product::Error::ProductDoesNotExist(_)));
        assert_that!(database.get_product(chair.id, DeletedFilter::Include).await).is_ok();
    }

    #[tokio::test]
    async fn test_count_matching_is_scoped_to_the_member() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let other = member(&database, "ddochi").await;
        let chair = product(&database, "chair").await;
        let mine = database
            .create_cart_item(&NewCartItem::new(&owner, &chair))
            .await
            .unwrap();
        let theirs = database
            .create_cart_item(&NewCartItem::new(&other, &chair))
            .await
            .unwrap();

        let res = database.count_matching(owner.id, &[mine, theirs]).await;

        assert_that!(res).is_ok().is_equal_to(1);
    }

    #[tokio::test]
    async fn test_delete_matching_never_touches_other_members() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let other = member(&database, "ddochi").await;
        let chair = product(&database, "chair").await;
        let mine = database
            .create_cart_item(&NewCartItem::new(&owner, &chair))
            .await
            .unwrap();
        let theirs = database
            .create_cart_item(&NewCartItem::new(&other, &chair))
            .await
            .unwrap();

        database.delete_matching(owner.id, &[mine, theirs]).await.unwrap();

        assert_that!(database.find_cart_items(owner.id).await.unwrap()).is_empty();
        let survivors = database.find_cart_items(other.id).await.unwrap();
        assert_that!(survivors).has_length(1);
        assert_that!(survivors[0].id).is_equal_to(theirs);
    }

    #[tokio::test]
    async fn test_delete_by_products_reports_removed_rows() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let other = member(&database, "ddochi").await;
        let chair = product(&database, "chair").await;
        let desk = product(&database, "desk").await;
        for buyer in [&owner, &other] {
            database
                .create_cart_item(&NewCartItem::new(buyer, &chair))
                .await
                .unwrap();
        }
        database
            .create_cart_item(&NewCartItem::new(&owner, &desk))
            .await
            .unwrap();

        let res = database.delete_by_products(&[chair.id]).await;

        assert_that!(res).is_ok().is_equal_to(2);
        assert_that!(database.find_cart_items(owner.id).await.unwrap()).has_length(1);
    }

    #[tokio::test]
    async fn test_update_quantity_persists() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let chair = product(&database, "chair").await;
        let id = database
            .create_cart_item(&NewCartItem::new(&owner, &chair))
            .await
            .unwrap();

        let mut cart_item = database.get_cart_item(id).await.unwrap();
        cart_item.change_quantity(4);
        database.update_quantity(&cart_item).await.unwrap();

        let res = database.get_cart_item(id).await;
        assert_that!(res)
            .is_ok()
            .matches(|cart_item| cart_item.quantity() == 4);
    }

    #[tokio::test]
    async fn test_member_coupon_pair_is_unique() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let welcome = coupon(&database, "welcome").await;
        let issued = NewMemberCoupon::issue(&owner, &welcome, Utc::now());

        assert_that!(database.create_member_coupon(&issued).await).is_ok();
        let res = database.create_member_coupon(&issued).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, member_coupon::Error::AlreadyIssued { .. }));
        let stored = database.find_member_coupons(owner.id).await.unwrap();
        assert_that!(stored).has_length(1);
    }

    #[tokio::test]
    async fn test_member_coupon_full_update() {
        let database = MemoryDatabase::default();
        let owner = member(&database, "dooly").await;
        let welcome = coupon(&database, "welcome").await;
        database
            .create_member_coupon(&NewMemberCoupon::issue(&owner, &welcome, Utc::now()))
            .await
            .unwrap();

        let stored = database
            .get_member_coupon(owner.id, welcome.id)
            .await
            .unwrap();
        let issued_at = stored.issued_at;
        database
            .update_member_coupon(&stored.mark_used())
            .await
            .unwrap();

        let res = database.get_member_coupon(owner.id, welcome.id).await;
        assert_that!(res)
            .is_ok()
            .matches(|member_coupon| member_coupon.is_used() && member_coupon.issued_at == issued_at);
    }
}
