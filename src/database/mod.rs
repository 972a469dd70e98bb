pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod resource;
pub mod seed;
pub mod service;
pub mod value;

pub use manager::{DatabaseError, DatabaseManager, ErrorKind};
pub use repository::{Repository, RepositoryOptions};
pub use resource::{Actor, Record, Resource, WriteOp};
pub use value::SqlValue;
