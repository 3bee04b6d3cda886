//! In-memory reference implementations of the capability traits, plus
//! small harness helpers, for this crate's own tests. Mirrors the
//! antecedent's separate `test_utils` crate: its own package with a path
//! dependency back on the parent, not a production backend.

pub mod fakes;
pub mod harness;
