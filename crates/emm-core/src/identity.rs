//! Identity types: IMSI, IMEI, PLMN/MCC-MNC, GUMMEI and GUTI.

use core::fmt;

/// "Unused" MNC digit value used to pad the third MNC digit when the MNC is actually two
/// digits long. Matches 3GPP TS 24.301's convention (and `_emm_attach_update`'s use of the
/// same sentinel) of filling the unused nibble with `0xF`.
pub const MNC_UNUSED_DIGIT: u8 = 0xF;

/// International Mobile Subscriber Identity, stored as a sequence of BCD digits (0-9), 6-15
/// digits long. Compared byte-for-byte wherever the spec calls for IMSI equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Imsi {
    pub digits: Vec<u8>,
}

impl Imsi {
    pub fn new(digits: impl IntoIterator<Item = u8>) -> Self {
        Self { digits: digits.into_iter().collect() }
    }

    /// Parses an IMSI out of its usual decimal string representation (e.g. "208930000000001").
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let digits: Vec<u8> = s
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()?;
        if digits.len() < 6 || digits.len() > 15 {
            return None;
        }
        Some(Self { digits })
    }

    /// Splits the IMSI into its PLMN (MCC/MNC) component, given the MNC length (2 or 3) as
    /// determined by `MmeApi::find_mnc_length`.
    pub fn plmn(&self, mnc_length: u8) -> Option<Plmn> {
        if self.digits.len() < 5 {
            return None;
        }
        let mcc = (self.digits[0] as u16) * 100 + (self.digits[1] as u16) * 10 + (self.digits[2] as u16);
        let mnc = match mnc_length {
            2 => (self.digits[3] as u16) * 10 + (self.digits[4] as u16),
            3 => {
                if self.digits.len() < 6 {
                    return None;
                }
                (self.digits[3] as u16) * 100 + (self.digits[4] as u16) * 10 + (self.digits[5] as u16)
            }
            _ => return None,
        };
        Some(Plmn { mcc, mnc, mnc_length })
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// International Mobile Equipment Identity, stored the same way as [`Imsi`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Imei {
    pub digits: Vec<u8>,
}

impl Imei {
    pub fn new(digits: impl IntoIterator<Item = u8>) -> Self {
        Self { digits: digits.into_iter().collect() }
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Mobile Country/Network Code pair, with the MNC digit count that disambiguates how many of
/// the MNC's digits are significant (2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plmn {
    pub mcc: u16,
    pub mnc: u16,
    pub mnc_length: u8,
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}-{:0width$}", self.mcc, self.mnc, width = self.mnc_length as usize)
    }
}

/// Globally Unique MME Identifier: PLMN + MME group id + MME code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gummei {
    pub plmn: Plmn,
    pub mme_gid: u16,
    pub mme_code: u8,
}

impl fmt::Display for Gummei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/gid{}/mmec{}", self.plmn, self.mme_gid, self.mme_code)
    }
}

/// Globally Unique Temporary Identity: GUMMEI + m-TMSI. The secondary index in the Context
/// Store is keyed on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guti {
    pub gummei: Gummei,
    pub m_tmsi: u32,
}

impl fmt::Display for Guti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:08x}", self.gummei, self.m_tmsi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imsi_plmn_two_digit_mnc() {
        let imsi = Imsi::from_decimal_str("208930000000001").unwrap();
        let plmn = imsi.plmn(2).unwrap();
        assert_eq!(plmn.mcc, 208);
        assert_eq!(plmn.mnc, 93);
        assert_eq!(plmn.mnc_length, 2);
    }

    #[test]
    fn imsi_plmn_three_digit_mnc() {
        let imsi = Imsi::from_decimal_str("310410123456789").unwrap();
        let plmn = imsi.plmn(3).unwrap();
        assert_eq!(plmn.mcc, 310);
        assert_eq!(plmn.mnc, 410);
        assert_eq!(plmn.mnc_length, 3);
    }

    #[test]
    fn imsi_rejects_out_of_range_length() {
        assert!(Imsi::from_decimal_str("123").is_none());
        assert!(Imsi::from_decimal_str("1234567890123456").is_none());
    }

    #[test]
    fn plmn_display_pads_two_digit_mnc() {
        let plmn = Plmn { mcc: 208, mnc: 93, mnc_length: 2 };
        assert_eq!(plmn.to_string(), "208-93");
    }
}
