//! # AgentPay Executor
//!
//! Task execution and certificate minting collaborators.

pub mod executor;
pub mod http;
pub mod local;
pub mod minter;

pub use executor::TaskExecutor;
pub use http::HttpTaskExecutor;
pub use local::LocalTaskExecutor;
pub use minter::{CertificateMinter, MockCertificateMinter, MOCK_POLICY_ID};
