//! Types shared by the docdelta error and logging facilities
//!
//! - **Correlation**: `RequestId`, `TraceId`, `RequestContext`
//! - **Sensitive data**: `Sensitive<T>` redacts passwords in Debug/Display
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId, TraceId};
pub use sensitive::Sensitive;
