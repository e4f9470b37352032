//! Security algorithm suites and the UE's installed Security Context.

use core::fmt;

/// EPS Encryption Algorithm, as a 4-bit identifier (EEA0..EEA3 standardized; others reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eea(pub u8);

/// EPS Integrity Algorithm identifier (EIA0..EIA3 standardized; others reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eia(pub u8);

/// UMTS Encryption Algorithm identifier, present only when the UE reports UMTS capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uea(pub u8);

/// UMTS Integrity Algorithm identifier, present only when the UE reports UMTS capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uia(pub u8);

/// GPRS Encryption Algorithm identifier, present only when the UE reports GPRS capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gea(pub u8);

/// Null ciphering/integrity (EEA0/EIA0), used to seed a freshly allocated Security Context
/// before Security Mode Control has negotiated the real algorithms.
pub const EEA0: Eea = Eea(0);
pub const EIA0: Eia = Eia(0);

/// Whether the key set identifier carried by a Security Context was supplied by the UE
/// ("native") or is a placeholder pending Security Mode Control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsiType {
    Native(u8),
    KsiNotAvailable,
}

impl fmt::Display for KsiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KsiType::Native(ksi) => write!(f, "native({ksi})"),
            KsiType::KsiNotAvailable => write!(f, "KSI_NOT_AVAILABLE"),
        }
    }
}

/// A key, stored as a plain byte buffer ("length-prefixed byte string" in the spec's terms —
/// the length is simply `Vec::len`). `wipe` overwrites the contents with zero before the buffer
/// is dropped, satisfying the "sensitive material must be explicitly wiped" design note.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn wipe(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({} bytes, redacted)", self.0.len())
    }
}

/// The installed Security Context for a UE: the negotiated KSI, the selected ciphering and
/// integrity algorithms, and the three NAS keys. Security keys exist iff a `SecurityContext`
/// has been installed (never partial) — enforced structurally by keeping all three keys
/// non-`Option` fields of the one struct rather than three independent optionals.
#[derive(Clone)]
pub struct SecurityContext {
    pub ksi_type: KsiType,
    pub selected_eea: Eea,
    pub selected_eia: Eia,
    pub kasme: SecretKey,
    pub knas_enc: SecretKey,
    pub knas_int: SecretKey,
}

impl fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityContext")
            .field("ksi_type", &self.ksi_type)
            .field("selected_eea", &self.selected_eea)
            .field("selected_eia", &self.selected_eia)
            .finish_non_exhaustive()
    }
}

impl SecurityContext {
    /// Allocates a fresh, unauthenticated Security Context: `KSI_NOT_AVAILABLE`, null
    /// algorithms, empty keys. This is what `attach_security` installs before Security Mode
    /// Control has negotiated the real algorithms.
    pub fn new_unauthenticated() -> Self {
        Self {
            ksi_type: KsiType::KsiNotAvailable,
            selected_eea: EEA0,
            selected_eia: EIA0,
            kasme: SecretKey::new(Vec::new()),
            knas_enc: SecretKey::new(Vec::new()),
            knas_int: SecretKey::new(Vec::new()),
        }
    }

    /// Zeroes all key material in place. Called by `release` before the context (and this
    /// Security Context with it) is dropped.
    pub fn wipe(&mut self) {
        self.kasme.wipe();
        self.knas_enc.wipe();
        self.knas_int.wipe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wipe_zeroes_key_material() {
        let mut sctx = SecurityContext {
            ksi_type: KsiType::Native(3),
            selected_eea: Eea(1),
            selected_eia: Eia(2),
            kasme: SecretKey::new(vec![0xAA; 32]),
            knas_enc: SecretKey::new(vec![0xBB; 16]),
            knas_int: SecretKey::new(vec![0xCC; 16]),
        };
        sctx.wipe();
        assert!(sctx.kasme.as_bytes().iter().all(|&b| b == 0));
        assert!(sctx.knas_enc.as_bytes().iter().all(|&b| b == 0));
        assert!(sctx.knas_int.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn new_unauthenticated_uses_null_algorithms() {
        let sctx = SecurityContext::new_unauthenticated();
        assert_eq!(sctx.ksi_type, KsiType::KsiNotAvailable);
        assert_eq!(sctx.selected_eea, EEA0);
        assert_eq!(sctx.selected_eia, EIA0);
    }
}
