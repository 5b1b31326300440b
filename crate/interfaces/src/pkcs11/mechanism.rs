//! PKCS#11 mechanisms used with GOST tokens.
//!
//! The GOST R 34.10-2012 signature mechanisms are not part of the base PKCS#11 headers; they
//! are defined in the vendor range registered by the TC 26 technical committee.

use std::fmt::{self, Display, Formatter};

/// Base of the TC 26 vendor-defined mechanism range
pub const CK_VENDOR_PKCS11_RU_TEAM_TC26: u64 = 0xD432_1000;

pub const CKM_GOSTR3410_KEY_PAIR_GEN: MechanismType = MechanismType(0x0000_1200);
pub const CKM_GOSTR3410_WITH_GOSTR3411_12_256: MechanismType =
    MechanismType(CK_VENDOR_PKCS11_RU_TEAM_TC26 | 0x008);

/// A `CK_MECHANISM_TYPE` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MechanismType(pub u64);

impl Display for MechanismType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            CKM_GOSTR3410_KEY_PAIR_GEN => f.write_str("CKM_GOSTR3410_KEY_PAIR_GEN"),
            CKM_GOSTR3410_WITH_GOSTR3411_12_256 => {
                f.write_str("CKM_GOSTR3410_WITH_GOSTR3411_12_256")
            }
            Self(other) => write!(f, "0x{other:08X}"),
        }
    }
}

/// A mechanism selector; the GOST mechanisms used here carry no parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanism {
    pub mechanism_type: MechanismType,
}

impl Mechanism {
    #[must_use]
    pub const fn new(mechanism_type: MechanismType) -> Self {
        Self { mechanism_type }
    }
}

impl Display for Mechanism {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.mechanism_type, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CKM_GOSTR3410_KEY_PAIR_GEN, CKM_GOSTR3410_WITH_GOSTR3411_12_256, Mechanism,
        MechanismType,
    };

    #[test]
    fn test_tc26_mechanism_value() {
        assert_eq!(CKM_GOSTR3410_WITH_GOSTR3411_12_256.0, 0xD432_1008);
    }

    #[test]
    fn test_display_mechanism() {
        assert_eq!(MechanismType(0x1).to_string(), "0x00000001");
        assert_eq!(
            Mechanism::new(CKM_GOSTR3410_KEY_PAIR_GEN).to_string(),
            "CKM_GOSTR3410_KEY_PAIR_GEN"
        );
        assert_eq!(
            CKM_GOSTR3410_WITH_GOSTR3411_12_256.to_string(),
            "CKM_GOSTR3410_WITH_GOSTR3411_12_256"
        );
    }
}
