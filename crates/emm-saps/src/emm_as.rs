//! EMM-AS SAP: the boundary toward the access stratum. `EMMAS_ESTABLISH_CNF` carries the Attach
//! Accept; `EMMAS_ESTABLISH_REJ` carries the Attach Reject.

use emm_core::cause::EmmCause;
use emm_core::identity::Guti;
use emm_core::ids::UeId;
use emm_core::security::{Eea, Eia};

#[derive(Debug, Clone)]
pub struct EmmAsEstablishCnf {
    pub ueid: UeId,
    /// The GUTI the UE is still addressed by: `old_guti` when a new GUTI has just replaced one the
    /// UE was already using, otherwise the (possibly freshly assigned) current GUTI.
    pub guti: Guti,
    /// The newly assigned GUTI, if this Attach Accept is assigning or reallocating one.
    pub new_guti: Option<Guti>,
    pub tac_list: Vec<u16>,
    /// Opaque ESM container (the `PDN Connectivity Accept` bytes ESM returned).
    pub nas_msg: Vec<u8>,
    pub selected_eea: Eea,
    pub selected_eia: Eia,
}

#[derive(Debug, Clone)]
pub struct EmmAsEstablishRej {
    pub ueid: UeId,
    pub cause: EmmCause,
    /// Empty, or the buffered ESM reply when the reject is carrying an ESM failure.
    pub nas_msg: Vec<u8>,
}

pub trait EmmAsSap {
    fn establish_cnf(&mut self, cnf: EmmAsEstablishCnf);
    fn establish_rej(&mut self, rej: EmmAsEstablishRej);
}
