//! Per-city parameter persistence on top of the generic attribute-blob
//! store. A city is "under governor control" exactly when an active blob
//! decodes; clearing is a zero-length write.

use std::collections::HashMap;

use gov_schema::{decode_parameter, encode_parameter, CmParameter};

use crate::city::CityId;

/// Which stored parameter a blob holds for a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamPurpose {
    /// The parameter actively driving the governor.
    Active,
    /// The last parameter the user configured in the dialog, remembered
    /// even for cities not currently governed.
    FrontEnd,
}

/// Object-scoped byte-blob store, the persistence seam owned by the
/// excluded save/options layer.
pub trait AttributeStore {
    fn read(&self, purpose: ParamPurpose, city: CityId) -> Option<&[u8]>;
    fn write(&mut self, purpose: ParamPurpose, city: CityId, bytes: &[u8]);
}

/// Map-backed attribute store used by tests and by sessions without a
/// persistence layer attached.
#[derive(Debug, Default)]
pub struct MemoryAttributes {
    blobs: HashMap<(ParamPurpose, CityId), Vec<u8>>,
}

impl MemoryAttributes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttributeStore for MemoryAttributes {
    fn read(&self, purpose: ParamPurpose, city: CityId) -> Option<&[u8]> {
        self.blobs.get(&(purpose, city)).map(Vec::as_slice)
    }

    fn write(&mut self, purpose: ParamPurpose, city: CityId, bytes: &[u8]) {
        self.blobs.insert((purpose, city), bytes.to_vec());
    }
}

/// Codec-aware view over the attribute store.
pub struct ParameterStore {
    attributes: Box<dyn AttributeStore>,
}

impl ParameterStore {
    pub fn new(attributes: Box<dyn AttributeStore>) -> Self {
        Self { attributes }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryAttributes::new()))
    }

    /// Decode-or-absent: a missing blob, a zero-length blob, and a foreign
    /// version byte all read as "no parameter stored".
    pub fn get(&self, purpose: ParamPurpose, city: CityId) -> Option<CmParameter> {
        self.attributes
            .read(purpose, city)
            .and_then(decode_parameter)
    }

    /// `None` clears the slot by writing a zero-length blob.
    pub fn set(&mut self, purpose: ParamPurpose, city: CityId, parameter: Option<&CmParameter>) {
        match parameter {
            Some(parameter) => {
                self.attributes
                    .write(purpose, city, &encode_parameter(parameter));
            }
            None => self.attributes.write(purpose, city, &[]),
        }
    }

    pub fn active(&self, city: CityId) -> Option<CmParameter> {
        self.get(ParamPurpose::Active, city)
    }

    pub fn set_active(&mut self, city: CityId, parameter: &CmParameter) {
        self.set(ParamPurpose::Active, city, Some(parameter));
    }

    pub fn clear_active(&mut self, city: CityId) {
        log::debug!("clearing active governor parameter for city {city}");
        self.set(ParamPurpose::Active, city, None);
    }

    pub fn is_governed(&self, city: CityId) -> bool {
        self.active(city).is_some()
    }

    /// The dialog-shown parameter, defaulting the first time a city is seen.
    pub fn front_end(&self, city: CityId) -> CmParameter {
        self.get(ParamPurpose::FrontEnd, city).unwrap_or_default()
    }

    pub fn set_front_end(&mut self, city: CityId, parameter: &CmParameter) {
        self.set(ParamPurpose::FrontEnd, city, Some(parameter));
    }
}
