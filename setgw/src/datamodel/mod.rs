pub mod keyspace;

pub use keyspace::{DataPrefix, Keyspace};
