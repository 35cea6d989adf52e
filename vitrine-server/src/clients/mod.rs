//! Outbound JSON clients: payment gateway and transactional email

pub mod email;
pub mod payments;

pub use email::{EmailClient, EmailError};
pub use payments::{CheckoutSession, PaymentClient, PaymentError, SessionStatus};
