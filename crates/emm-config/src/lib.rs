//! MME configuration: immutable `MmeConfig`, mutable `MmeState`, the `SharedConfig` handle that
//! pairs them, and a TOML loader.

pub mod mme_config;
pub mod shared;
pub mod toml_config;

pub use mme_config::{GummeiConfig, MmeConfig, MmeState};
pub use shared::SharedConfig;
