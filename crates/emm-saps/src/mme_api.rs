//! MME API: the subscriber-database/HSS-facing collaborator. Full authentication-vector
//! generation and the HSS interface itself are out of scope; this trait models only the call
//! boundary the Attach Coordinator crosses.

use emm_core::cause::EmmCause;
use emm_core::identity::{Guti, Imei, Imsi};
use emm_core::ids::UeId;

pub trait MmeApi {
    /// Validates a presented IMSI and associates it with `ueid`. Returns `ILLEGAL_UE` if the
    /// IMSI is unknown or barred.
    fn identify_imsi(&mut self, ueid: UeId, imsi: &Imsi) -> Result<(), EmmCause>;

    /// Resolves a presented GUTI back to its IMSI. `Err` means the GUTI is unknown to this MME
    /// (e.g. context relocated away, or GUTI never allocated here) and the core must fall back
    /// to explicit identification.
    fn identify_guti(&mut self, ueid: UeId, guti: &Guti) -> Result<Imsi, EmmCause>;

    /// Validates a presented IMEI (emergency-attach / IMEI-only path). Returns
    /// `IMEI_NOT_ACCEPTED` if the equipment is blacklisted.
    fn identify_imei(&mut self, ueid: UeId, imei: &Imei) -> Result<(), EmmCause>;

    /// Allocates a fresh GUTI for `imsi`, returning it together with the TAC list to advertise
    /// alongside it in the Attach Accept.
    fn new_guti(&mut self, imsi: &Imsi) -> (Guti, Vec<u16>);

    /// Notifies the API that a context moved from `old` to `new` (rekey).
    fn notify_ue_id_changed(&mut self, old: UeId, new: UeId);

    /// Notifies the API that a fresh GUTI was assigned to `ueid`.
    fn notify_new_guti(&mut self, ueid: UeId, guti: &Guti);

    /// Determines the MNC length (2 or 3 digits) for the PLMN implied by the first six IMSI
    /// digits, consulting the locally configured PLMN list.
    fn find_mnc_length(&self, digits: &[u8]) -> u8;

    /// Starts the asynchronous authentication-info request (built-in-EPC mode): requests
    /// `num_vectors` authentication vectors for `imsi`. The reply arrives later and resumes the
    /// suspended context via `AttachCoordinator::on_procedure_outcome`.
    fn request_authentication_info(&mut self, ueid: UeId, imsi: &Imsi, num_vectors: u8);
}
