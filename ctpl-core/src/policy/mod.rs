//! Insurance policy records
//!
//! - [`PolicyPayload`] - loosely typed request body
//! - [`PolicyFields`] - normalized values written to the store
//! - [`Policy`] - stored record as returned to clients
//! - [`PolicyService`] - the create/read/update/soft-delete/restore operations

mod dates;
mod error;
mod model;
mod normalize;
mod premium;
mod service;

pub use dates::{format_calendar_date, format_date, format_timestamp, validate_date};
pub use error::PolicyError;
pub use model::{Policy, PolicyFields, PolicyId, PolicyPayload};
pub use normalize::{current_year, normalize_text, parse_decimal, parse_integer, parse_money, parse_year};
pub use premium::{DEFAULT_AUTH_FEE, DOC_STAMPS_RATE, E_VAT_RATE, LGT_RATE, PremiumBreakdown};
pub use service::{POLICIES_TABLE, PolicyService};
