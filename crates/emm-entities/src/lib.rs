//! Entities built on top of the core types: the UE EMM Context, the Context Store, and the
//! Attach procedure itself.

pub mod attach;
pub mod context;
pub mod store;

pub use attach::coordinator::AttachCoordinator;
pub use attach::{AttachParams, DecodeStatus, ResumeEvent};
pub use context::{AttachRetransmissionRecord, AuthVector, UeEmmContext};
pub use store::{ContextStore, StoreError};
