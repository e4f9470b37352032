//! Context Store: primary `ueid -> context` map plus a secondary `guti -> ueid` index.
//!
//! Grounded on the reference stack's `MmClientMgr` (`tetra-entities::mm::components::client_state`):
//! a `HashMap` keyed on a per-client handle, with `try_register_client`/`remove_client`-style
//! entry points and a plain error enum rather than `anyhow`/`thiserror`. The secondary GUTI index
//! and the rekey operation are this core's own addition, generalizing the single-index pattern
//! to the two-index invariant the Attach procedure's duplicate/rekey handling needs.

use std::collections::HashMap;
use std::fmt;

use emm_core::identity::Guti;
use emm_core::ids::UeId;

use crate::context::UeEmmContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    AlreadyExists,
    NotFound,
    GutiConflict,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreError::AlreadyExists => "a context already exists for this ueid",
            StoreError::NotFound => "no context exists for this ueid",
            StoreError::GutiConflict => "guti already maps to a different ueid",
        };
        write!(f, "{s}")
    }
}

#[derive(Default)]
pub struct ContextStore {
    contexts: HashMap<UeId, UeEmmContext>,
    guti_index: HashMap<Guti, UeId>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn get(&self, ueid: UeId) -> Option<&UeEmmContext> {
        self.contexts.get(&ueid)
    }

    pub fn get_mut(&mut self, ueid: UeId) -> Option<&mut UeEmmContext> {
        self.contexts.get_mut(&ueid)
    }

    pub fn lookup_by_guti(&self, guti: &Guti) -> Option<UeId> {
        self.guti_index.get(guti).copied()
    }

    /// Inserts a freshly created dynamic context. Guard 5 of `attach_request` is the only caller.
    pub fn insert(&mut self, ctx: UeEmmContext) -> Result<(), StoreError> {
        if self.contexts.contains_key(&ctx.ueid) {
            return Err(StoreError::AlreadyExists);
        }
        self.contexts.insert(ctx.ueid, ctx);
        Ok(())
    }

    /// Installs (or clears) `context.guti`, keeping the secondary index in lockstep. This and
    /// [`ContextStore::rekey`] are the only ways `context.guti` may change, per the design notes.
    pub fn set_guti(&mut self, ueid: UeId, guti: Option<Guti>) -> Result<(), StoreError> {
        let old_guti = {
            let ctx = self.contexts.get(&ueid).ok_or(StoreError::NotFound)?;
            ctx.guti()
        };

        if let Some(new_guti) = guti {
            if let Some(&holder) = self.guti_index.get(&new_guti) {
                if holder != ueid {
                    return Err(StoreError::GutiConflict);
                }
            }
        }

        if let Some(old) = old_guti {
            self.guti_index.remove(&old);
        }
        if let Some(new_guti) = guti {
            self.guti_index.insert(new_guti, ueid);
        }

        self.contexts.get_mut(&ueid).expect("checked above").set_guti_field(guti);
        Ok(())
    }

    /// Moves the context currently keyed by `old_ueid` to `new_ueid`, e.g. when an Attach Request
    /// carrying a previously-assigned GUTI arrives under a different lower-layer UE identifier.
    /// The GUTI index is untouched: the GUTI value itself hasn't changed, only which `ueid`
    /// it resolves to, and the index still points at the same context via the primary map.
    pub fn rekey(&mut self, old_ueid: UeId, new_ueid: UeId) -> Result<(), StoreError> {
        if self.contexts.contains_key(&new_ueid) {
            return Err(StoreError::AlreadyExists);
        }
        let mut ctx = self.contexts.remove(&old_ueid).ok_or(StoreError::NotFound)?;
        ctx.ueid = new_ueid;
        if let Some(guti) = ctx.guti() {
            self.guti_index.insert(guti, new_ueid);
        }
        self.contexts.insert(new_ueid, ctx);
        Ok(())
    }

    /// Removes and returns the context, clearing its secondary-index entry if any. Called by
    /// `release`.
    pub fn remove(&mut self, ueid: UeId) -> Option<UeEmmContext> {
        let ctx = self.contexts.remove(&ueid)?;
        if let Some(guti) = ctx.guti() {
            self.guti_index.remove(&guti);
        }
        Some(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emm_core::identity::{Gummei, Plmn};

    fn test_guti(m_tmsi: u32) -> Guti {
        Guti {
            gummei: Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 },
            m_tmsi,
        }
    }

    #[test]
    fn set_guti_updates_secondary_index() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        let guti = test_guti(42);
        store.set_guti(UeId(1), Some(guti)).unwrap();
        assert_eq!(store.lookup_by_guti(&guti), Some(UeId(1)));
    }

    #[test]
    fn rekey_moves_primary_entry_keeps_guti_index() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(42))).unwrap();
        let guti = test_guti(7);
        store.set_guti(UeId(42), Some(guti)).unwrap();

        store.rekey(UeId(42), UeId(99)).unwrap();

        assert!(store.get(UeId(42)).is_none());
        assert!(store.get(UeId(99)).is_some());
        assert_eq!(store.lookup_by_guti(&guti), Some(UeId(99)));
    }

    #[test]
    fn remove_clears_secondary_index() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        let guti = test_guti(1);
        store.set_guti(UeId(1), Some(guti)).unwrap();

        store.remove(UeId(1));

        assert!(store.lookup_by_guti(&guti).is_none());
    }

    #[test]
    fn set_guti_rejects_conflicting_owner() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        store.insert(UeEmmContext::new(UeId(2))).unwrap();
        let guti = test_guti(1);
        store.set_guti(UeId(1), Some(guti)).unwrap();
        assert_eq!(store.set_guti(UeId(2), Some(guti)), Err(StoreError::GutiConflict));
    }
}
