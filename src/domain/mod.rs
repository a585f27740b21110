//! Exchange-agnostic domain types: quotes, normalized updates, opportunities.

mod opportunity;
mod quote;

pub use opportunity::Opportunity;
pub use quote::{Quote, QuoteUpdate};
