use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    lookup::{user_index, user_with_role},
};
use crate::{
    db::Repos,
    models::{CreatePaymentRecord, PayerRef, Payment, PaymentFilter, PaymentPatch, PaymentView, Role},
};

/// School fees and their receipts.
///
/// Administrators see and manage everything. A parent sees payments billed
/// to them or to a linked child, and may only attach a receipt.
#[derive(Clone)]
pub struct PaymentService {
    db: Repos,
}

impl PaymentService {
    pub fn new(db: Repos) -> Self {
        Self { db }
    }

    pub(crate) async fn views(&self, payments: Vec<Payment>) -> ServiceResult<Vec<PaymentView>> {
        let users = user_index(self.db.users.as_ref()).await?;
        Ok(payments
            .into_iter()
            .map(|payment| PaymentView {
                student: users.get(&payment.student_id).map(PayerRef::from),
                parent: payment
                    .parent_id
                    .and_then(|id| users.get(&id))
                    .map(PayerRef::from),
                payment,
            })
            .collect())
    }

    /// Payments visible to a parent: billed to them or to a linked child.
    pub(crate) async fn for_parent(&self, parent_id: Uuid) -> ServiceResult<Vec<Payment>> {
        let children = self.db.parent_links.children_of(parent_id).await?;
        Ok(self.db.payments.list(Some(parent_id), &children).await?)
    }

    async fn owns(&self, payment: &Payment, parent_id: Uuid) -> ServiceResult<bool> {
        if payment.parent_id == Some(parent_id) {
            return Ok(true);
        }
        let children = self.db.parent_links.children_of(parent_id).await?;
        Ok(children.contains(&payment.student_id))
    }

    /// Earliest due first. A parent's listing is always scoped to their own
    /// payments; asking for someone else's is refused.
    pub async fn list(
        &self,
        filter: PaymentFilter,
        caller_id: Uuid,
        caller_role: Role,
    ) -> ServiceResult<Vec<PaymentView>> {
        let payments = if caller_role == Role::Admin {
            let students: Vec<Uuid> = filter.student_id.into_iter().collect();
            self.db.payments.list(filter.parent_id, &students).await?
        } else {
            if filter.parent_id.is_some_and(|p| p != caller_id) {
                return Err(ServiceError::Forbidden(
                    "You can only view your own payments".to_string(),
                ));
            }
            let mut own = self.for_parent(caller_id).await?;
            if let Some(student_id) = filter.student_id {
                own.retain(|p| p.student_id == student_id);
            }
            own
        };
        self.views(payments).await
    }

    pub async fn create(&self, input: CreatePaymentRecord) -> ServiceResult<PaymentView> {
        user_with_role(self.db.users.as_ref(), input.student_id, Role::Student, "Student not found")
            .await?;
        if let Some(parent_id) = input.parent_id {
            user_with_role(self.db.users.as_ref(), parent_id, Role::Parent, "Parent not found").await?;
        }
        let payment = self.db.payments.create(input).await?;
        tracing::info!(payment_id = %payment.id, student_id = %payment.student_id, amount = payment.amount, "Payment created");
        let mut views = self.views(vec![payment]).await?;
        views.pop().ok_or(ServiceError::NotFound("Payment not found"))
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: PaymentPatch,
        caller_id: Uuid,
        caller_role: Role,
    ) -> ServiceResult<PaymentView> {
        let payment = self
            .db
            .payments
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Payment not found"))?;

        if caller_role != Role::Admin {
            if !self.owns(&payment, caller_id).await? {
                return Err(ServiceError::Forbidden(
                    "You can only update your own payments".to_string(),
                ));
            }
            if patch.status.is_some() {
                return Err(ServiceError::Forbidden(
                    "Only administrators can change payment status".to_string(),
                ));
            }
        }

        let updated = self
            .db
            .payments
            .update(id, patch)
            .await
            .map_err(ServiceError::missing("Payment not found"))?;
        let mut views = self.views(vec![updated]).await?;
        views.pop().ok_or(ServiceError::NotFound("Payment not found"))
    }
}
