//! Order Storage
//! Mission: Persist orders with ownership scoping

use crate::auth::models::User;
use crate::db::Db;
use crate::orders::models::{Order, OrderStatus, PizzaSize};
use anyhow::Result;
use rusqlite::{params, Connection};
use tracing::info;

/// Errors from order mutations.
#[derive(Debug)]
pub enum OrderStoreError {
    /// The order does not exist, or exists but is not owned by the caller.
    /// The two cases are deliberately indistinguishable.
    NotFound,
    Database(anyhow::Error),
}

impl std::fmt::Display for OrderStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStoreError::NotFound => write!(f, "Order not found."),
            OrderStoreError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for OrderStoreError {}

impl From<rusqlite::Error> for OrderStoreError {
    fn from(err: rusqlite::Error) -> Self {
        OrderStoreError::Database(err.into())
    }
}

const ORDER_COLUMNS: &str =
    "o.id, o.quantity, o.order_status, o.pizza_size, o.flavour, o.user_id, u.username";

/// Order storage over the shared SQLite handle.
pub struct OrderStore {
    db: Db,
}

impl OrderStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Place a new order. Status is always forced to pending, whatever the
    /// caller supplied.
    pub fn create(
        &self,
        quantity: u32,
        size: PizzaSize,
        flavour: bool,
        owner: &User,
    ) -> Result<Order> {
        let conn = self.db.lock();

        conn.execute(
            "INSERT INTO orders (quantity, order_status, pizza_size, flavour, user_id)
             VALUES (?1, 'pending', ?2, ?3, ?4)",
            params![quantity, size.as_str(), flavour as i64, owner.id],
        )?;

        let order = Order {
            id: conn.last_insert_rowid(),
            quantity,
            status: OrderStatus::Pending,
            size,
            flavour,
            user_id: owner.id,
            owner: owner.username.clone(),
        };

        info!("🍕 Order {} placed by {}", order.id, order.owner);

        Ok(order)
    }

    /// List every order in the system. Staff-only by caller contract; the
    /// store itself does not gate access.
    pub fn list_all(&self) -> Result<Vec<Order>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders o JOIN users u ON u.id = o.user_id ORDER BY o.id",
            ORDER_COLUMNS
        ))?;

        let orders = stmt
            .query_map([], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// Look up an order by id regardless of owner. Staff-only by caller
    /// contract.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let conn = self.db.lock();
        Ok(fetch_order(&conn, id, None)?)
    }

    /// Look up an order by id, visible only to its owner.
    pub fn find_by_id_for_user(&self, id: i64, user_id: i64) -> Result<Option<Order>> {
        let conn = self.db.lock();
        Ok(fetch_order(&conn, id, Some(user_id))?)
    }

    /// List all orders belonging to one user.
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders o JOIN users u ON u.id = o.user_id
             WHERE o.user_id = ?1 ORDER BY o.id",
            ORDER_COLUMNS
        ))?;

        let orders = stmt
            .query_map(params![user_id], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// Replace an order's quantity, size, and flavour. Owner-only: a
    /// mismatched owner is reported as not found.
    pub fn update(
        &self,
        id: i64,
        quantity: u32,
        size: PizzaSize,
        flavour: bool,
        owner_id: i64,
    ) -> Result<Order, OrderStoreError> {
        let conn = self.db.lock();

        let updated = conn.execute(
            "UPDATE orders SET quantity = ?1, pizza_size = ?2, flavour = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![quantity, size.as_str(), flavour as i64, id, owner_id],
        )?;

        if updated == 0 {
            return Err(OrderStoreError::NotFound);
        }

        fetch_order(&conn, id, None)?.ok_or(OrderStoreError::NotFound)
    }

    /// Move an order to a new status. Staff-only by caller contract; the
    /// status has already been parsed into the enum, so no stray values
    /// can reach the database.
    pub fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order, OrderStoreError> {
        let conn = self.db.lock();

        let updated = conn.execute(
            "UPDATE orders SET order_status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;

        if updated == 0 {
            return Err(OrderStoreError::NotFound);
        }

        info!("📦 Order {} moved to {}", id, status.as_str());

        fetch_order(&conn, id, None)?.ok_or(OrderStoreError::NotFound)
    }

    /// Delete an order. Owner-only: a mismatched owner is reported as not
    /// found.
    pub fn delete(&self, id: i64, owner_id: i64) -> Result<(), OrderStoreError> {
        let conn = self.db.lock();

        let deleted = conn.execute(
            "DELETE FROM orders WHERE id = ?1 AND user_id = ?2",
            params![id, owner_id],
        )?;

        if deleted == 0 {
            return Err(OrderStoreError::NotFound);
        }

        info!("🗑️  Order {} deleted", id);

        Ok(())
    }
}

fn fetch_order(
    conn: &Connection,
    id: i64,
    owner_id: Option<i64>,
) -> rusqlite::Result<Option<Order>> {
    let result = match owner_id {
        Some(user_id) => conn.query_row(
            &format!(
                "SELECT {} FROM orders o JOIN users u ON u.id = o.user_id
                 WHERE o.id = ?1 AND o.user_id = ?2",
                ORDER_COLUMNS
            ),
            params![id, user_id],
            row_to_order,
        ),
        None => conn.query_row(
            &format!(
                "SELECT {} FROM orders o JOIN users u ON u.id = o.user_id WHERE o.id = ?1",
                ORDER_COLUMNS
            ),
            params![id],
            row_to_order,
        ),
    };

    match result {
        Ok(order) => Ok(Some(order)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn row_to_order(row: &rusqlite::Row) -> rusqlite::Result<Order> {
    let status_str: String = row.get(2)?;
    let size_str: String = row.get(3)?;
    Ok(Order {
        id: row.get(0)?,
        quantity: row.get(1)?,
        // CHECK constraints keep these columns inside the enums
        status: OrderStatus::from_str(&status_str).unwrap_or(OrderStatus::Pending),
        size: PizzaSize::from_str(&size_str).unwrap_or(PizzaSize::Medium),
        flavour: row.get::<_, i64>(4)? == 1,
        user_id: row.get(5)?,
        owner: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_store::UserStore;
    use crate::db;
    use tempfile::NamedTempFile;

    struct Fixture {
        users: UserStore,
        orders: OrderStore,
        _temp: NamedTempFile,
    }

    fn fixture() -> Fixture {
        let temp = NamedTempFile::new().unwrap();
        let handle = db::open(temp.path().to_str().unwrap()).unwrap();
        Fixture {
            users: UserStore::new(handle.clone()).unwrap(),
            orders: OrderStore::new(handle),
            _temp: temp,
        }
    }

    fn signup(fx: &Fixture, name: &str) -> User {
        fx.users
            .create(name, &format!("{}@x.com", name), "hash")
            .unwrap()
    }

    #[test]
    fn test_new_order_is_pending() {
        let fx = fixture();
        let alice = signup(&fx, "alice");

        let order = fx
            .orders
            .create(2, PizzaSize::Medium, true, &alice)
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.owner, "alice");

        // Also pending when read back
        let read = fx.orders.find_by_id(order.id).unwrap().unwrap();
        assert_eq!(read.status, OrderStatus::Pending);
        assert_eq!(read.quantity, 2);
    }

    #[test]
    fn test_list_for_user_is_scoped() {
        let fx = fixture();
        let alice = signup(&fx, "alice");
        let bob = signup(&fx, "bob");

        fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();
        fx.orders.create(2, PizzaSize::Large, true, &bob).unwrap();
        fx.orders.create(3, PizzaSize::Small, true, &alice).unwrap();

        let alices = fx.orders.list_for_user(alice.id).unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|o| o.user_id == alice.id));

        // Global listing sees everything
        let all = fx.orders.list_all().unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_find_by_id_for_user_hides_foreign_orders() {
        let fx = fixture();
        let alice = signup(&fx, "alice");
        let bob = signup(&fx, "bob");

        let order = fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();

        assert!(fx
            .orders
            .find_by_id_for_user(order.id, alice.id)
            .unwrap()
            .is_some());
        assert!(fx
            .orders
            .find_by_id_for_user(order.id, bob.id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_replaces_fields() {
        let fx = fixture();
        let alice = signup(&fx, "alice");

        let order = fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();
        let updated = fx
            .orders
            .update(order.id, 4, PizzaSize::ExtraLarge, true, alice.id)
            .unwrap();

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.size, PizzaSize::ExtraLarge);
        assert!(updated.flavour);
        // Update never touches status
        assert_eq!(updated.status, OrderStatus::Pending);
    }

    #[test]
    fn test_update_by_non_owner_is_not_found() {
        let fx = fixture();
        let alice = signup(&fx, "alice");
        let bob = signup(&fx, "bob");

        let order = fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();

        let err = fx
            .orders
            .update(order.id, 2, PizzaSize::Large, true, bob.id)
            .unwrap_err();
        assert!(matches!(err, OrderStoreError::NotFound));

        // And the order is unchanged
        let read = fx.orders.find_by_id(order.id).unwrap().unwrap();
        assert_eq!(read.quantity, 1);
    }

    #[test]
    fn test_update_status() {
        let fx = fixture();
        let alice = signup(&fx, "alice");

        let order = fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();
        let updated = fx
            .orders
            .update_status(order.id, OrderStatus::InProgress)
            .unwrap();
        assert_eq!(updated.status, OrderStatus::InProgress);

        let err = fx
            .orders
            .update_status(9999, OrderStatus::Delivered)
            .unwrap_err();
        assert!(matches!(err, OrderStoreError::NotFound));
    }

    #[test]
    fn test_delete_is_owner_only() {
        let fx = fixture();
        let alice = signup(&fx, "alice");
        let bob = signup(&fx, "bob");

        let order = fx.orders.create(1, PizzaSize::Small, false, &alice).unwrap();

        let err = fx.orders.delete(order.id, bob.id).unwrap_err();
        assert!(matches!(err, OrderStoreError::NotFound));
        assert!(fx.orders.find_by_id(order.id).unwrap().is_some());

        fx.orders.delete(order.id, alice.id).unwrap();
        assert!(fx.orders.find_by_id(order.id).unwrap().is_none());
    }
}
