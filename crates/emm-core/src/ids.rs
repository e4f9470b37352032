use core::fmt;

/// Stable UE lower-layer identifier used to key the Context Store.
///
/// In a pre-allocated deployment this corresponds to an index into a fixed context array; here
/// it is just an opaque handle, mirroring how `tetra_core::MleHandle` is used as an opaque
/// cross-layer id rather than a meaningful number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UeId(pub u32);

impl fmt::Display for UeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ueid:{}", self.0)
    }
}

/// Handle returned by the timer service for an armed timer. `None` is used where the source
/// uses the sentinel value `INACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer:{}", self.0)
    }
}
