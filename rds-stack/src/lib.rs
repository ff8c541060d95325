//! RDS MySQL stack synthesizer
//!
//! Declares a MySQL instance, its subnet group, parameter group and
//! generated credentials inside an existing VPC, and renders the result as
//! a CloudFormation template with four exported outputs.

pub mod config;
pub mod credentials;
pub mod diff;
pub mod engine;
pub mod error;
pub mod instance;
pub mod network;
pub mod outputs;
pub mod parameter_group;
pub mod stack;
pub mod subnet_group;
pub mod synth;
pub mod tags;
pub mod template;

pub use error::{StackError, StackResult};
pub use network::{ContextFile, NetworkContext};
pub use stack::{Materialized, RdsStack};
