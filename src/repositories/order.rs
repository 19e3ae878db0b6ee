//! OrderRepository - Orders and their status transitions

use super::{Create, Read};
use crate::dtos::{CreateOrderDTO, OrderTransitionDTO};
use crate::entities::{Order, OrderStatus, PaymentStatus};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument, warn};

pub struct OrderRepository {
    connection_pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Orders where the user is the seeker or the provider, newest first
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, Error> {
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT * FROM orders WHERE (seeker_id = ");
        query_builder
            .push_bind(user_id)
            .push(" OR provider_id = ")
            .push_bind(user_id)
            .push(")");
        if let Some(status) = status {
            query_builder.push(" AND status = ").push_bind(status);
        }
        query_builder.push(" ORDER BY created_at DESC, order_id DESC");

        query_builder
            .build_query_as::<Order>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Every order in `status`, oldest update first (review queues)
    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, Error> {
        sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = ? ORDER BY updated_at ASC, order_id ASC",
        )
        .bind(status)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Orders with a receipt waiting for an admin decision
    pub async fn list_pending_payments(&self) -> Result<Vec<Order>, Error> {
        sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = ? AND payment_status = ? ORDER BY updated_at ASC, order_id ASC",
        )
        .bind(OrderStatus::PendingPayment)
        .bind(PaymentStatus::Submitted)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count_pending_payments(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE status = ? AND payment_status = ?",
        )
        .bind(OrderStatus::PendingPayment)
        .bind(PaymentStatus::Submitted)
        .fetch_one(&self.connection_pool)
        .await
    }

    pub async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, Error> {
        sqlx::query_as::<_, (OrderStatus, i64)>(
            "SELECT status, COUNT(*) FROM orders GROUP BY status",
        )
        .fetch_all(&self.connection_pool)
        .await
    }

    /// True while the user takes part in a paid, running or disputed order
    pub async fn has_engaged_orders(&self, user_id: i64) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM orders
                WHERE (seeker_id = ? OR provider_id = ?)
                AND status IN (?, ?, ?)
            )
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(OrderStatus::Paid)
        .bind(OrderStatus::InProgress)
        .bind(OrderStatus::Disputed)
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Cancels the not yet paid orders of an account being deleted.
    /// Orders with a receipt under review are left to the admins.
    #[instrument(skip(self))]
    pub async fn cancel_open_for_user(&self, user_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?, updated_at = ?
            WHERE (seeker_id = ? OR provider_id = ?)
            AND (status = ? OR (status = ? AND payment_status <> ?))
            "#,
        )
        .bind(OrderStatus::Cancelled)
        .bind(Utc::now())
        .bind(user_id)
        .bind(user_id)
        .bind(OrderStatus::PendingApproval)
        .bind(OrderStatus::PendingPayment)
        .bind(PaymentStatus::Submitted)
        .execute(&self.connection_pool)
        .await?;

        debug!("Cancelled {} open orders", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Moves the order to `next` if it is still in the observed
    /// (`expected_status`, `expected_payment`) state, writing the `Some`
    /// fields of `data` in the same statement.
    ///
    /// # Returns
    /// * `Ok(Some(Order))` - the updated order
    /// * `Ok(None)` - the order changed in the meantime (or does not exist)
    #[instrument(skip(self, data))]
    pub async fn transition(
        &self,
        order_id: i64,
        expected_status: OrderStatus,
        expected_payment: PaymentStatus,
        next: OrderStatus,
        data: &OrderTransitionDTO,
    ) -> Result<Option<Order>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
        query_builder.push_bind(next);
        query_builder.push(", updated_at = ").push_bind(Utc::now());

        if let Some(payment_status) = data.payment_status {
            query_builder
                .push(", payment_status = ")
                .push_bind(payment_status);
        }
        if let Some(ref receipt) = data.payment_receipt_url {
            query_builder
                .push(", payment_receipt_url = ")
                .push_bind(receipt.clone());
        }
        if let Some(ref reference) = data.payment_reference {
            query_builder
                .push(", payment_reference = ")
                .push_bind(reference.clone());
        }
        if let Some(ref reason) = data.decline_reason {
            query_builder
                .push(", decline_reason = ")
                .push_bind(reason.clone());
        }
        if let Some(ref reason) = data.dispute_reason {
            query_builder
                .push(", dispute_reason = ")
                .push_bind(reason.clone());
        }
        if let Some(disputed_by) = data.disputed_by {
            query_builder.push(", disputed_by = ").push_bind(disputed_by);
        }
        if let Some(ref note) = data.resolution_note {
            query_builder
                .push(", resolution_note = ")
                .push_bind(note.clone());
        }
        if let Some(until) = data.grace_period_until {
            query_builder.push(", grace_period_until = ").push_bind(until);
        }

        query_builder.push(" WHERE order_id = ").push_bind(order_id);
        query_builder.push(" AND status = ").push_bind(expected_status);
        query_builder
            .push(" AND payment_status = ")
            .push_bind(expected_payment);
        query_builder.push(" RETURNING *");

        let order = query_builder
            .build_query_as::<Order>()
            .fetch_optional(&self.connection_pool)
            .await?;

        match &order {
            Some(_) => info!(
                "Order {} moved from {:?} to {:?}",
                order_id, expected_status, next
            ),
            None => warn!(
                "Order {} was no longer {:?}/{:?}",
                order_id, expected_status, expected_payment
            ),
        }
        Ok(order)
    }
}

impl Create<Order, CreateOrderDTO> for OrderRepository {
    #[instrument(skip(self, data), fields(seeker_id = %data.seeker_id, provider_id = %data.provider_id))]
    async fn create(&self, data: &CreateOrderDTO) -> Result<Order, Error> {
        debug!("Creating new order");
        let now = Utc::now();
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (seeker_id, provider_id, title, description, amount, status,
                                payment_status, scheduled_for, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.seeker_id)
        .bind(data.provider_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.amount)
        .bind(OrderStatus::PendingApproval)
        .bind(PaymentStatus::Unpaid)
        .bind(data.scheduled_for)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Order created with id {}", order.order_id);
        Ok(order)
    }
}

impl Read<Order, i64> for OrderRepository {
    async fn read(&self, id: &i64) -> Result<Option<Order>, Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
