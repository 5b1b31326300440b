use std::ptr;

use jacarta_interfaces::{Attribute, AttributeValue, Mechanism};
use pkcs11_sys::{
    CK_ATTRIBUTE, CK_ATTRIBUTE_TYPE, CK_FALSE, CK_MECHANISM, CK_MECHANISM_TYPE, CK_TRUE, CK_ULONG,
};

/// Native encoding of an attribute template.
///
/// The encoded values are owned by this struct: the `CK_ATTRIBUTE` array returned by
/// [`NativeTemplate::attributes`] points into them and must not outlive it.
pub(crate) struct NativeTemplate {
    entries: Vec<(CK_ATTRIBUTE_TYPE, Vec<u8>)>,
}

impl NativeTemplate {
    pub(crate) fn new(template: &[Attribute]) -> Self {
        let entries = template
            .iter()
            .map(|attribute| {
                let value = match attribute.value() {
                    AttributeValue::Bool(b) => vec![if b { CK_TRUE } else { CK_FALSE }],
                    AttributeValue::Ulong(v) => (v as CK_ULONG).to_ne_bytes().to_vec(),
                    AttributeValue::Bytes(bytes) => bytes.to_vec(),
                };
                (attribute.attribute_type() as CK_ATTRIBUTE_TYPE, value)
            })
            .collect();
        Self { entries }
    }

    pub(crate) fn attributes(&mut self) -> Vec<CK_ATTRIBUTE> {
        self.entries
            .iter_mut()
            .map(|(type_, value)| CK_ATTRIBUTE {
                type_: *type_,
                pValue: value.as_mut_ptr().cast::<std::ffi::c_void>(),
                ulValueLen: value.len() as CK_ULONG,
            })
            .collect()
    }
}

/// The GOST mechanisms take no parameter block
pub(crate) const fn ck_mechanism(mechanism: &Mechanism) -> CK_MECHANISM {
    CK_MECHANISM {
        mechanism: mechanism.mechanism_type.0 as CK_MECHANISM_TYPE,
        pParameter: ptr::null_mut(),
        ulParameterLen: 0,
    }
}

#[cfg(test)]
mod tests {
    use jacarta_interfaces::{
        Attribute, Mechanism,
        attribute::{CKA_CLASS, CKA_TOKEN, CKO_PUBLIC_KEY},
        mechanism::CKM_GOSTR3410_KEY_PAIR_GEN,
    };
    use pkcs11_sys::{CK_TRUE, CK_ULONG};

    use super::{NativeTemplate, ck_mechanism};

    #[test]
    fn test_native_template() {
        let mut template = NativeTemplate::new(&[
            Attribute::Class(CKO_PUBLIC_KEY),
            Attribute::Token(true),
            Attribute::Label("pk".to_owned()),
        ]);
        let attributes = template.attributes();
        assert_eq!(attributes.len(), 3);

        assert_eq!(u64::from(attributes[0].type_), CKA_CLASS);
        assert_eq!(attributes[0].ulValueLen as usize, size_of::<CK_ULONG>());
        #[allow(unsafe_code)]
        let class = unsafe { attributes[0].pValue.cast::<CK_ULONG>().read_unaligned() };
        assert_eq!(u64::from(class), CKO_PUBLIC_KEY);

        assert_eq!(u64::from(attributes[1].type_), CKA_TOKEN);
        #[allow(unsafe_code)]
        let token = unsafe { *attributes[1].pValue.cast::<u8>() };
        assert_eq!(token, CK_TRUE);

        assert_eq!(attributes[2].ulValueLen, 2);
    }

    #[test]
    fn test_native_mechanism_without_parameter() {
        let native = ck_mechanism(&Mechanism::new(CKM_GOSTR3410_KEY_PAIR_GEN));
        assert_eq!(u64::from(native.mechanism), 0x1200);
        assert!(native.pParameter.is_null());
        assert_eq!(native.ulParameterLen, 0);
    }
}
