//! Quotes module - quote lifecycle, premium recalculation, and expiry.

mod quotes_model;
mod quotes_service;
mod quotes_traits;


pub use quotes_model::{
    NewQuote, Quote, QuoteCreation, QuoteLookup, QuoteRecord, QuoteSource, QuoteStatus,
    QuoteUpdate,
};
pub use quotes_service::QuoteService;
pub use quotes_traits::{QuoteRepositoryTrait, QuoteServiceTrait};
