//! Hash tables with two collision resolution strategies and
//! text/binary persistence.
//!
//! - [`OpenTable`] stores its entries directly in the slot array and
//!   probes linearly on collisions.
//! - [`ChainedTable`] keeps a singly-linked [`List`](linked_list::List) per
//!   bucket.
//!
//! Both keep the first value written for a key and grow by doubling once
//! they get too dense.

mod macros;

pub mod hash;
pub mod hashmap;
pub mod linked_list;
pub mod persist;

pub use hash::{BucketHash, ByDisplay};
pub use hashmap::{ChainedTable, OpenTable};
pub use persist::{BinaryScalar, PersistError};
