//! ClauseGuard Services
//!
//! Clients for everything outside the process: PDF text extraction, the
//! Anthropic Messages API, Google sign-in, Stripe and SMTP.

pub mod ai;
pub mod billing;
pub mod email;
pub mod extract;
pub mod oauth;

pub use ai::{AiError, AnthropicContractAi, ContractAi};
pub use billing::{
    BillingError, CheckoutRequest, CheckoutSession, PaymentProvider, StripeClient, StripeEvent,
};
pub use email::EmailService;
pub use extract::{ExtractionError, PdfTextExtractor, TextExtractor};
pub use oauth::{GoogleOAuthClient, IdentityProvider, OAuthError};
