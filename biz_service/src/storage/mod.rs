pub mod group_store;
pub mod object_store;

#[cfg(test)]
pub(crate) mod mem_store;

pub use group_store::GroupStore;
pub use object_store::{ObjectStore, RedisObjectStore};
