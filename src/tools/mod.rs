//! Tool dispatch and response normalization.
//!
//! A `tools/call` is handled in stages, each in its own module:
//!
//! - [`registry`]: tool names, descriptions, schemas and required fields
//! - [`request`]: typed per-tool arguments ([`ToolRequest`])
//! - [`validate`]: required-field and cross-field checks
//! - [`mapper`]: caller arguments to Graph parameters, money to minor units
//! - [`normalize`]: Graph responses to uniform records, money to major units
//! - [`error`]: failure taxonomy and classification
//! - [`dispatch`]: runs the stages and yields one outcome per call

pub mod dispatch;
pub mod error;
pub mod mapper;
pub mod money;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod validate;

pub use dispatch::Dispatcher;
pub use error::{ErrorClassification, ErrorKind, ToolError, ToolResult};
pub use normalize::ResponseEnvelope;
pub use registry::{Tool, ToolDefinition};
pub use request::ToolRequest;
pub use validate::ValidationResult;
