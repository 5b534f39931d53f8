//! Group Module
//!
//! Named read-through cache groups and the registry that owns them.
//!
//! # Flow
//! `Group::get` -> LRU lookup -> on miss, single-flight loader call -> store -> return

mod cache_group;
mod flight;
mod loader;
mod registry;

pub use cache_group::Group;
pub use flight::Flight;
pub use loader::{Loader, LoaderFn};
pub use registry::{GroupBuilder, GroupRegistry};
