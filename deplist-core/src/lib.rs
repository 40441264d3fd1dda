// deplist-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod ledger;
pub mod limiter;
pub mod report;
pub mod resolve;
pub mod traverse;

// Re-export key types for easier use by the CLI crate
pub use ledger::{Ledger, Rule, Snapshot};
pub use limiter::{Limiter, DEFAULT_MAX_INFLIGHT};
pub use report::{render_rules, write_rules};
pub use resolve::{GoListResolver, IndexResolver};
pub use traverse::Traversal;
