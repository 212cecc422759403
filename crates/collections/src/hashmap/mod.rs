//! The two table variants: open addressing and separate chaining.

mod chained;
mod open_table;

pub use chained::{ChainedTable, Iter as ChainedIter};
pub use open_table::{Iter as OpenIter, OpenTable};
