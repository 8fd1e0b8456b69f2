//! Tool discovery and dispatch
//!
//! ```text
//!   planner ──► ToolRegistry ──► LocalToolProvider   (ExecuteDeviceAction, GetMcpStatus)
//!                    │
//!                    └─────────► ConnectionSet ──► RemoteToolProvider (MCP, mocks)
//!                                                        │
//!                                  normalize(RawResult) ◄┘
//! ```
//!
//! The registry merges tools by name, routes each call to its owner and
//! turns whatever comes back into plain text.

mod connections;
mod local;
mod mock;
mod normalize;
mod registry;
mod remote;

pub use connections::ConnectionSet;
pub use local::{LocalToolProvider, EXECUTE_DEVICE_ACTION, GET_MCP_STATUS};
pub use mock::{MockRemoteProvider, MockResponse};
pub use normalize::{normalize, RawResult, GENERIC_TOOL_ERROR, NO_CONTENT};
pub use registry::{ToolRegistry, DEFAULT_CALL_TIMEOUT};
pub use remote::RemoteToolProvider;
