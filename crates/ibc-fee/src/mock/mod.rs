//! A mock host and a mock application, for exercising the fee middleware end to end.

pub mod app;
pub mod context;
