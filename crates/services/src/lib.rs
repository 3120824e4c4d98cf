#![forbid(unsafe_code)]

pub mod app_services;
pub mod bootstrap;
pub mod error;
pub mod gateway;
pub mod store;

pub use playground_core::Clock;

pub use app_services::{AppServices, AppServicesConfig};
pub use bootstrap::{AppBootstrap, BootstrapState};
pub use error::{AppServicesError, GatewayError, ReconcileError, StoreError};
pub use gateway::{BackendGateway, LocalGateway};
pub use store::{ExerciseStore, InFlight, Operation, StoreSnapshot, StoreStatus};
