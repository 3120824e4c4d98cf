#![forbid(unsafe_code)]

pub mod catalog_dir;
pub mod repository;
pub mod sqlite;

pub use repository::{
    ExerciseRepository, InMemoryRepository, SessionRepository, Storage, StorageError,
};
