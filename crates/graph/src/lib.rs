pub mod memory;
pub mod neo4j;
pub mod store;

pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;
pub use store::{EdgeAttrs, GraphStore, NodeAttrs, NodeFilter, NodeKey, NodeRef};
