use crate::gateway::{mock_order_id, receipt, GatewayOrderClient, OrderPayload};
use crate::models::Workshop;
use crate::payments::models::{new_payment_token, to_minor_units};
use crate::payments::{NewPayment, PaymentTarget, PaymentType, PaymentsRepository};
use crate::workshops::{
    CreateWorkshopOrder, FreeRegistration, WorkshopApplicationsRepository, WorkshopError,
    WorkshopOrderCreated, WorkshopOrderResponse, WorkshopsRepository,
};

/// Service for the workshop order workflow
#[derive(Clone)]
pub struct WorkshopOrderService {
    workshops: WorkshopsRepository,
    applications: WorkshopApplicationsRepository,
    payments: PaymentsRepository,
    gateway: GatewayOrderClient,
}

impl WorkshopOrderService {
    /// Create a new WorkshopOrderService
    pub fn new(
        workshops: WorkshopsRepository,
        applications: WorkshopApplicationsRepository,
        payments: PaymentsRepository,
        gateway: GatewayOrderClient,
    ) -> Self {
        Self {
            workshops,
            applications,
            payments,
            gateway,
        }
    }

    /// Create a workshop order
    ///
    /// # Validation
    /// - Workshop must exist and be active
    /// - Workshop must not be at capacity (free and paid alike)
    /// - One application per (workshop, email), enforced by the unique index
    ///
    /// # Behavior
    /// - Paid workshops: a pending application, a best-effort gateway order
    ///   (mock fallback when unreachable) and a pending Payment record.
    ///   Amount and currency always come from the catalog row, never from
    ///   the gateway echo.
    /// - Free workshops: an approved application and a taken seat, no
    ///   Payment record.
    pub async fn create_order(
        &self,
        request: CreateWorkshopOrder,
    ) -> Result<WorkshopOrderResponse, WorkshopError> {
        let workshop = self
            .workshops
            .find_active(request.workshop_id)
            .await?
            .ok_or(WorkshopError::NotFound)?;

        if workshop.is_full() {
            return Err(WorkshopError::WorkshopFull);
        }

        if workshop.is_paid {
            self.create_paid_order(&workshop, &request).await
        } else {
            self.register_free(&request).await
        }
    }

    async fn create_paid_order(
        &self,
        workshop: &Workshop,
        request: &CreateWorkshopOrder,
    ) -> Result<WorkshopOrderResponse, WorkshopError> {
        let amount_minor = to_minor_units(workshop.price).ok_or_else(|| {
            WorkshopError::InvalidAmount(format!("price {} out of range", workshop.price))
        })?;

        let application = self.applications.create_pending(request).await?;

        let payload = OrderPayload {
            amount: amount_minor,
            currency: workshop.currency.clone(),
            receipt: receipt("workshop", workshop.id),
            notes: serde_json::json!({
                "application_id": application.id,
                "workshop_id": workshop.id,
                "email": request.email,
            }),
        };

        let (order_id, gateway_response, mock) = match self.gateway.create_order(&payload).await {
            Some(order) => (order.id, Some(order.raw), false),
            None => (mock_order_id(), None, true),
        };

        let payment = self
            .payments
            .create(NewPayment {
                payment_id: new_payment_token(),
                gateway_order_id: order_id.clone(),
                amount: workshop.price,
                currency: workshop.currency.clone(),
                payment_type: PaymentType::Workshop,
                customer_name: request.user_name.clone(),
                customer_email: request.email.clone(),
                customer_phone: request.user_phone.clone(),
                target: PaymentTarget::Workshop(application.id),
                gateway_response,
            })
            .await?;

        tracing::info!(
            "Created workshop order {} for application {} (mock: {})",
            order_id,
            application.id,
            mock
        );

        Ok(WorkshopOrderResponse::Order(WorkshopOrderCreated {
            order_id,
            amount: amount_minor,
            currency: workshop.currency.clone(),
            payment_id: payment.payment_id,
            item_title: workshop.title.clone(),
            item_price: workshop.price,
            item_type: "workshop".to_string(),
            application_id: application.id,
            mock,
        }))
    }

    async fn register_free(
        &self,
        request: &CreateWorkshopOrder,
    ) -> Result<WorkshopOrderResponse, WorkshopError> {
        let application = self.applications.register_free(request).await?;

        tracing::info!(
            "Confirmed free registration {} for workshop {}",
            application.id,
            application.workshop_id
        );

        Ok(WorkshopOrderResponse::Free(FreeRegistration {
            message: "Registration confirmed".to_string(),
            application_id: application.id,
            requires_payment: false,
        }))
    }
}

