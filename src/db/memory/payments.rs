use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::PaymentRepo,
    },
    models::{CreatePaymentRecord, Payment, PaymentPatch},
};

#[derive(Default)]
pub struct MemoryPaymentRepo {
    payments: DashMap<Uuid, Payment>,
}

impl MemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_due_date(a: &Payment, b: &Payment) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.created_at.cmp(&b.created_at))
}

#[async_trait]
impl PaymentRepo for MemoryPaymentRepo {
    async fn create(&self, input: CreatePaymentRecord) -> DbResult<Payment> {
        let payment = Payment {
            id: Uuid::new_v4(),
            student_id: input.student_id,
            parent_id: input.parent_id,
            amount: input.amount,
            description: input.description,
            due_date: input.due_date,
            status: input.status,
            receipt_url: input.receipt_url,
            created_at: Utc::now(),
        };
        self.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Payment>> {
        Ok(self.payments.get(&id).map(|e| e.value().clone()))
    }

    async fn list(&self, parent_id: Option<Uuid>, student_ids: &[Uuid]) -> DbResult<Vec<Payment>> {
        let unfiltered = parent_id.is_none() && student_ids.is_empty();
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .map(|e| e.value().clone())
            .filter(|p| {
                unfiltered
                    || (parent_id.is_some() && p.parent_id == parent_id)
                    || student_ids.contains(&p.student_id)
            })
            .collect();
        payments.sort_by(by_due_date);
        Ok(payments)
    }

    async fn update(&self, id: Uuid, patch: PaymentPatch) -> DbResult<Payment> {
        let mut entry = self.payments.get_mut(&id).ok_or(DbError::NotFound)?;
        let payment = entry.value_mut();
        if let Some(status) = patch.status {
            payment.status = status;
        }
        if let Some(receipt_url) = patch.receipt_url {
            payment.receipt_url = receipt_url;
        }
        Ok(payment.clone())
    }
}
