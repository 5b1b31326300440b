use std::ptr;

use jacarta_interfaces::{Pkcs11Result, ReturnValue, SlotId, TokenFlags, TokenInfo};
use jacarta_logger::debug;
use pkcs11_sys::{CK_BBOOL, CK_FALSE, CK_SLOT_ID, CK_TOKEN_INFO, CK_TRUE, CK_ULONG};

use crate::{HsmLib, hsm_call};

/// Label length expected by `C_InitToken`
const TOKEN_LABEL_LENGTH: usize = 32;

/// Decode a blank padded `CK_UTF8CHAR` field
pub(crate) fn padded_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_owned()
}

/// Blank pad a token label to the 32 bytes required by `C_InitToken`
pub(crate) fn padded_label(label: &str) -> Pkcs11Result<[u8; TOKEN_LABEL_LENGTH]> {
    let bytes = label.as_bytes();
    if bytes.len() > TOKEN_LABEL_LENGTH {
        return Err(ReturnValue::ARGUMENTS_BAD);
    }
    let mut padded = [b' '; TOKEN_LABEL_LENGTH];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

fn token_info_from(info: &CK_TOKEN_INFO) -> TokenInfo {
    TokenInfo {
        label: padded_string(&info.label),
        manufacturer_id: padded_string(&info.manufacturerID),
        model: padded_string(&info.model),
        serial_number: padded_string(&info.serialNumber),
        flags: TokenFlags::from_bits_retain(u64::from(info.flags)),
    }
}

impl HsmLib {
    /// `C_GetSlotList` in two passes: the count first, then the list.
    ///
    /// The number of slots may grow between the two calls when a reader is plugged in;
    /// the second call then fails with `CKR_BUFFER_TOO_SMALL` and both passes are retried.
    pub(crate) fn slot_list(&self, token_present: bool) -> Pkcs11Result<Vec<SlotId>> {
        let token_present: CK_BBOOL = if token_present { CK_TRUE } else { CK_FALSE };
        loop {
            let mut count: CK_ULONG = 0;
            hsm_call!(
                self,
                C_GetSlotList,
                token_present,
                ptr::null_mut(),
                &raw mut count
            )?;
            if count == 0 {
                return Ok(Vec::new());
            }
            let capacity = usize::try_from(count).map_err(|_| ReturnValue::HOST_MEMORY)?;
            let mut slots: Vec<CK_SLOT_ID> = vec![0; capacity];
            match hsm_call!(
                self,
                C_GetSlotList,
                token_present,
                slots.as_mut_ptr(),
                &raw mut count
            ) {
                Ok(()) => {
                    let listed = usize::try_from(count).map_err(|_| ReturnValue::HOST_MEMORY)?;
                    slots.truncate(listed);
                    debug!("Found {} slot(s): {slots:?}", slots.len());
                    return Ok(slots.into_iter().map(|s| SlotId(u64::from(s))).collect());
                }
                Err(ReturnValue::BUFFER_TOO_SMALL) => {
                    debug!("Slot list grew while listing, retrying");
                }
                Err(rv) => return Err(rv),
            }
        }
    }

    pub(crate) fn token_info(&self, slot_id: SlotId) -> Pkcs11Result<TokenInfo> {
        let mut info = CK_TOKEN_INFO::default();
        hsm_call!(
            self,
            C_GetTokenInfo,
            slot_id.0 as CK_SLOT_ID,
            &raw mut info
        )?;
        Ok(token_info_from(&info))
    }
}
