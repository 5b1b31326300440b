use jacarta_interfaces::{Pkcs11Api, SlotId, TokenInfo};
use jacarta_logger::debug;

use crate::DiscoveryError;

/// Resolves the slot holding the wanted token.
///
/// Token descriptors are read on every call and never cached.
pub struct TokenDirectory<'a> {
    api: &'a dyn Pkcs11Api,
}

impl<'a> TokenDirectory<'a> {
    #[must_use]
    pub const fn new(api: &'a dyn Pkcs11Api) -> Self {
        Self { api }
    }

    /// The first slot, in runtime order, whose token model contains `required`.
    ///
    /// The comparison is case sensitive. Token information is fetched one slot at a time
    /// and the search stops at the first match.
    pub fn find_slot_by_model_substring(&self, required: &str) -> Result<SlotId, DiscoveryError> {
        for slot in self.present_slots()? {
            let info = self.token_info(slot)?;
            debug!("slot {slot}: model {:?}", info.model);
            if info.model.contains(required) {
                return Ok(slot);
            }
        }
        Err(DiscoveryError::TokenNotPresent)
    }

    /// Every slot with a token, with its descriptor, in runtime order
    pub fn list_tokens(&self) -> Result<Vec<(SlotId, TokenInfo)>, DiscoveryError> {
        self.present_slots()?
            .into_iter()
            .map(|slot| self.token_info(slot).map(|info| (slot, info)))
            .collect()
    }

    fn present_slots(&self) -> Result<Vec<SlotId>, DiscoveryError> {
        let slots = self
            .api
            .list_slots(true)
            .map_err(|code| DiscoveryError::Directory {
                operation: "C_GetSlotList",
                slot: None,
                code,
            })?;
        if slots.is_empty() {
            return Err(DiscoveryError::NoSlots);
        }
        Ok(slots)
    }

    fn token_info(&self, slot: SlotId) -> Result<TokenInfo, DiscoveryError> {
        self.api
            .get_token_info(slot)
            .map_err(|code| DiscoveryError::Directory {
                operation: "C_GetTokenInfo",
                slot: Some(slot),
                code,
            })
    }
}
