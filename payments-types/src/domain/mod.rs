//! Domain models for the payment service.

pub mod card;
pub mod charge;
pub mod event;
pub mod money;
pub mod payment;

pub use card::CardDetails;
pub use charge::{ChargeRequest, GatewayOutcome};
pub use event::{PaymentEvent, PaymentEventKind};
pub use money::Currency;
pub use payment::{NewPayment, Payment, PaymentReference, PaymentStatus};
