use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreatePaymentRecord, Payment, PaymentPatch},
};

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn create(&self, input: CreatePaymentRecord) -> DbResult<Payment>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Payment>>;
    /// Payments matching any of the given parent or students, earliest due
    /// date first with undated payments last. Both filters empty lists all.
    async fn list(&self, parent_id: Option<Uuid>, student_ids: &[Uuid]) -> DbResult<Vec<Payment>>;
    async fn update(&self, id: Uuid, patch: PaymentPatch) -> DbResult<Payment>;
}
