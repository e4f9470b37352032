//! Immutable MME configuration (`MmeConfig`) and mutable running state (`MmeState`).

use emm_core::identity::{Gummei, Plmn};

/// The single configured GUMMEI block this MME serves, plus the list of Tracking Area Codes it
/// broadcasts. Modelled as one GUMMEI rather than the full `plmn_tac[]/mmec[]/mme_gid[]` arrays,
/// since the Attach core addresses exactly one serving TAI list.
#[derive(Debug, Clone)]
pub struct GummeiConfig {
    pub gummei: Gummei,
    pub tac_list: Vec<u16>,
}

/// Immutable MME configuration, analogous to the reference stack's `StackConfig`.
#[derive(Debug, Clone)]
pub struct MmeConfig {
    pub gummei: GummeiConfig,

    /// Whether emergency attach (`AttachType::Emergency`) is supported.
    pub emergency_attach: bool,
    /// Whether an unauthenticated IMSI (no Security Context installed) may still be accepted.
    pub unauthenticated_imsi: bool,

    /// Duration of T3450 (Attach Accept retransmission timer), in seconds.
    pub t3450_secs: u64,
    /// Maximum number of T3450-triggered retransmissions before abort.
    pub attach_counter_max: u8,

    /// Upper bound on the number of simultaneously tracked UE contexts. Used to validate `ueid`
    /// in guard 1 of `attach_request`.
    pub max_contexts: usize,
}

impl MmeConfig {
    /// Builds a configuration with the mandatory GUMMEI block and every other field at its
    /// documented default. There is no `Default` impl: a GUMMEI is required, matching the
    /// reference stack's `net: CfgNetInfo` being a required, defaultless field of `StackConfig`.
    pub fn new(gummei: GummeiConfig) -> Self {
        Self {
            gummei,
            emergency_attach: false,
            unauthenticated_imsi: false,
            t3450_secs: emm_core::T3450_DEFAULT_SECS,
            attach_counter_max: emm_core::ATTACH_COUNTER_MAX,
            max_contexts: 1024,
        }
    }

    pub fn plmn(&self) -> Plmn {
        self.gummei.gummei.plmn
    }

    /// Validates cross-field invariants that cannot be expressed per-field. Mirrors
    /// `StackConfig::validate`'s role: a config that parses is not automatically a config that
    /// makes sense.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.gummei.tac_list.is_empty() {
            return Err("gummei.tac_list must contain at least one TAC");
        }
        if self.t3450_secs == 0 {
            return Err("t3450_secs must be nonzero");
        }
        if self.max_contexts == 0 {
            return Err("max_contexts must be nonzero");
        }
        Ok(())
    }
}

/// Mutable, shared-state-protected runtime data: the running m-TMSI allocation counter consumed
/// by `MmeApi::new_guti`. Analogous to the reference stack's `StackState`.
#[derive(Debug, Clone)]
pub struct MmeState {
    pub next_m_tmsi: u32,
}

impl Default for MmeState {
    fn default() -> Self {
        Self { next_m_tmsi: 1 }
    }
}

impl MmeState {
    /// Allocates and advances the m-TMSI counter, wrapping on overflow rather than panicking —
    /// exhausting a 32-bit counter is a long-running-process concern, not a per-call invariant.
    pub fn allocate_m_tmsi(&mut self) -> u32 {
        let m_tmsi = self.next_m_tmsi;
        self.next_m_tmsi = self.next_m_tmsi.wrapping_add(1);
        m_tmsi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emm_core::identity::Plmn;

    fn test_gummei() -> GummeiConfig {
        GummeiConfig {
            gummei: Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 },
            tac_list: vec![1, 2, 3],
        }
    }

    #[test]
    fn rejects_empty_tac_list() {
        let mut cfg = MmeConfig::new(test_gummei());
        cfg.gummei.tac_list.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn allocate_m_tmsi_increments() {
        let mut state = MmeState::default();
        let a = state.allocate_m_tmsi();
        let b = state.allocate_m_tmsi();
        assert_eq!(b, a + 1);
    }
}
