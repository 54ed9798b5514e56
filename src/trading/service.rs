use crate::gateway::{mock_order_id, receipt, GatewayOrderClient, OrderPayload};
use crate::payments::models::{new_payment_token, to_minor_units};
use crate::payments::{NewPayment, PaymentTarget, PaymentType, PaymentsRepository};
use crate::trading::{
    BookingError, CreateServiceOrder, ServiceBookingsRepository, ServiceOrderCreated,
    TradingServicesRepository,
};

/// Service for the trading-service booking workflow
///
/// Every booking produces a payment order; there is no free path and no
/// capacity or duplicate rule.
#[derive(Clone)]
pub struct ServiceOrderService {
    services: TradingServicesRepository,
    bookings: ServiceBookingsRepository,
    payments: PaymentsRepository,
    gateway: GatewayOrderClient,
}

impl ServiceOrderService {
    /// Create a new ServiceOrderService
    pub fn new(
        services: TradingServicesRepository,
        bookings: ServiceBookingsRepository,
        payments: PaymentsRepository,
        gateway: GatewayOrderClient,
    ) -> Self {
        Self {
            services,
            bookings,
            payments,
            gateway,
        }
    }

    /// Create a service order
    ///
    /// Fails with `NotFound` if the service is missing or inactive.
    /// Otherwise: a pending booking, a best-effort gateway order (mock
    /// fallback when unreachable) and a pending Payment record. Amount and
    /// currency always come from the catalog row, never from the gateway
    /// echo.
    pub async fn create_order(
        &self,
        request: CreateServiceOrder,
    ) -> Result<ServiceOrderCreated, BookingError> {
        let service = self
            .services
            .find_active(request.service_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let amount_minor = to_minor_units(service.price).ok_or_else(|| {
            BookingError::InvalidAmount(format!("price {} out of range", service.price))
        })?;

        let booking = self.bookings.create(&request).await?;

        let payload = OrderPayload {
            amount: amount_minor,
            currency: service.currency.clone(),
            receipt: receipt("service", service.id),
            notes: serde_json::json!({
                "booking_id": booking.id,
                "service_id": service.id,
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
                amount: service.price,
                currency: service.currency.clone(),
                payment_type: PaymentType::Service,
                customer_name: request.user_name.clone(),
                customer_email: request.email.clone(),
                customer_phone: request.user_phone.clone(),
                target: PaymentTarget::Service(booking.id),
                gateway_response,
            })
            .await?;

        tracing::info!(
            "Created service order {} for booking {} (mock: {})",
            order_id,
            booking.id,
            mock
        );

        Ok(ServiceOrderCreated {
            order_id,
            amount: amount_minor,
            currency: service.currency,
            payment_id: payment.payment_id,
            item_title: service.title,
            item_price: service.price,
            item_type: "service".to_string(),
            booking_id: booking.id,
            mock,
        })
    }
}
