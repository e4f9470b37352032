use core::fmt;

/// EMM finite-state label, per 3GPP TS 24.301's EMM-registered/EMM-deregistered state machine.
/// The Attach Coordinator only ever transitions through the subset relevant to attach; variants
/// are declared in ascending "progress" order so that `state > EmmFsmState::Deregistered` (the
/// Attach Coordinator's in-flight-vs-not guard) can be expressed with `PartialOrd`/`Ord` directly,
/// matching the reference C state machine's use of an ordinal status value for the same comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EmmFsmState {
    Invalid,
    Deregistered,
    DeregisteredInitiated,
    CommonProcedureInitiated,
    Registered,
}

impl fmt::Display for EmmFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmmFsmState::Invalid => "INVALID",
            EmmFsmState::Deregistered => "DEREGISTERED",
            EmmFsmState::DeregisteredInitiated => "DEREGISTERED_INIT",
            EmmFsmState::CommonProcedureInitiated => "COMMON_PROCEDURE_INIT",
            EmmFsmState::Registered => "REGISTERED",
        };
        write!(f, "{s}")
    }
}

/// Which common procedure (or out-of-band notification) a context is currently suspended on,
/// and therefore which resume entry point `AttachCoordinator::on_procedure_outcome` should
/// dispatch to. This is the systems-language rendition of the reference source's `{success,
/// failure, abort}` continuation triple: an explicit state label on the context rather than
/// stored function pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingProcedure {
    /// Waiting on the out-of-band authentication-info request (IMSI path, no security context
    /// yet). Resumes into `identify` on success.
    AuthInfoRequest,
    /// Waiting on the Identification common procedure (GUTI path, always started regardless of
    /// whether `identify_guti` itself succeeded — see the forced-identification open question).
    /// Resumes into `identify` on success, `release` on failure or abort.
    Identification,
    /// Waiting on the Authentication common procedure. Resumes into `attach_security` on
    /// success, `release` on failure or abort.
    Authentication,
    /// Waiting on the Security Mode Control common procedure. Resumes into `attach` on success,
    /// `release` on failure or abort.
    SecurityModeControl,
}

impl fmt::Display for PendingProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PendingProcedure::AuthInfoRequest => "AuthInfoRequest",
            PendingProcedure::Identification => "Identification",
            PendingProcedure::Authentication => "Authentication",
            PendingProcedure::SecurityModeControl => "SecurityModeControl",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsm_state_ordering_matches_progress() {
        assert!(EmmFsmState::Deregistered > EmmFsmState::Invalid);
        assert!(EmmFsmState::CommonProcedureInitiated > EmmFsmState::Deregistered);
        assert!(EmmFsmState::Registered > EmmFsmState::CommonProcedureInitiated);
    }
}
