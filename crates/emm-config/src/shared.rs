//! `SharedConfig`: immutable `MmeConfig` + mutable `MmeState`, shared across the Coordinator and
//! its collaborators the way the reference stack shares `StackConfig`/`StackState`.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::mme_config::{MmeConfig, MmeState};

#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<MmeConfig>,
    state: Arc<RwLock<MmeState>>,
}

impl SharedConfig {
    pub fn new(cfg: MmeConfig) -> Self {
        Self::from_parts(cfg, MmeState::default())
    }

    pub fn from_parts(cfg: MmeConfig, state: MmeState) -> Self {
        if let Err(e) = cfg.validate() {
            panic!("invalid MME configuration: {e}");
        }
        Self { cfg: Arc::new(cfg), state: Arc::new(RwLock::new(state)) }
    }

    pub fn config(&self) -> Arc<MmeConfig> {
        Arc::clone(&self.cfg)
    }

    pub fn state_read(&self) -> RwLockReadGuard<'_, MmeState> {
        self.state.read().expect("MmeState RwLock poisoned")
    }

    pub fn state_write(&self) -> RwLockWriteGuard<'_, MmeState> {
        self.state.write().expect("MmeState RwLock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emm_core::identity::{Gummei, Plmn};

    fn test_config() -> MmeConfig {
        MmeConfig::new(crate::mme_config::GummeiConfig {
            gummei: Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 },
            tac_list: vec![1],
        })
    }

    #[test]
    fn state_write_is_visible_to_subsequent_read() {
        let shared = SharedConfig::new(test_config());
        let m_tmsi = shared.state_write().allocate_m_tmsi();
        assert_eq!(shared.state_read().next_m_tmsi, m_tmsi + 1);
    }

    #[test]
    #[should_panic(expected = "invalid MME configuration")]
    fn from_parts_panics_on_invalid_config() {
        let mut cfg = test_config();
        cfg.gummei.tac_list.clear();
        SharedConfig::new(cfg);
    }
}
