pub mod aws;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod location;
pub mod poller;
pub mod result;
pub mod service;
pub mod submit;

pub use client::{AthenaClient, ExecuteOptions, NOT_FAILED};
pub use config::AthenaConfig;
pub use error::AthenaError;
pub use location::ResultLocation;
pub use poller::{backoff_delay, PollOutcome, PollPolicy};
pub use result::ResultTable;
pub use service::{
    CatalogPage, CatalogService, ExecutionBatch, ExecutionDetails, ExecutionState,
    IdentityService, ObjectStore, QueryService, Services, BATCH_LOOKUP_LIMIT,
};
