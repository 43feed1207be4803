//! Various packet encoding semantics which underpin the various types of transactions.

pub mod ics29_fee;
