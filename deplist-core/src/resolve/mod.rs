// deplist-core/src/resolve/mod.rs
// Resolver implementations shipped with deplist.

pub mod golist;
pub mod index;

pub use golist::GoListResolver;
pub use index::IndexResolver;
