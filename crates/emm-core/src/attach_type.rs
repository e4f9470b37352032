use core::fmt;

/// EPS attach type, carried in the Attach Request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachType {
    Eps,
    Imsi,
    Emergency,
    Reserved,
}

impl fmt::Display for AttachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttachType::Eps => "EPS",
            AttachType::Imsi => "IMSI",
            AttachType::Emergency => "EMERGENCY",
            AttachType::Reserved => "RESERVED",
        };
        write!(f, "{s}")
    }
}
