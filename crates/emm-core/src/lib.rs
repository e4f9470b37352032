//! Core types for the EMM Attach procedure
//!
//! This crate provides the leaf types shared by the configuration, SAP primitive and entity
//! crates above it: UE/timer identifiers, identity types (IMSI/IMEI/GUTI/GUMMEI), security
//! material, the EMM cause register, and the logging bootstrap.

pub mod attach_type;
pub mod cause;
pub mod debug;
pub mod fsm;
pub mod identity;
pub mod ids;
pub mod security;

pub use attach_type::AttachType;
pub use cause::EmmCause;
pub use fsm::{EmmFsmState, PendingProcedure};
pub use identity::{Guti, Gummei, Imei, Imsi, Plmn};
pub use ids::{TimerId, UeId};
pub use security::{Eea, Eia, Gea, KsiType, SecurityContext, Uea, Uia};

/// Default T3450 duration (Attach Accept retransmission timer), in seconds.
pub const T3450_DEFAULT_SECS: u64 = 6;

/// Maximum number of T3450-triggered Attach Accept retransmissions before abort.
pub const ATTACH_COUNTER_MAX: u8 = 5;
