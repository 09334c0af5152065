//! Data contracts shared between the governor engine and its clients.
//!
//! Everything here is a plain value type: the optimization parameter a city
//! is governed by, the optimizer's proposed assignment, and the fixed
//! 32-byte attribute-blob codec used to persist parameters across sessions.

use serde::{Deserialize, Serialize};

/// City output categories, in the fixed enumeration order the codec and the
/// optimizer both rely on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutputKind {
    Food = 0,
    Shield = 1,
    Trade = 2,
    Gold = 3,
    Luxury = 4,
    Science = 5,
}

pub const OUTPUT_KIND_COUNT: usize = 6;

impl OutputKind {
    pub const ALL: [OutputKind; OUTPUT_KIND_COUNT] = [
        OutputKind::Food,
        OutputKind::Shield,
        OutputKind::Trade,
        OutputKind::Gold,
        OutputKind::Luxury,
        OutputKind::Science,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Specialist roles a citizen can be assigned to instead of working a tile.
///
/// [`SpecialistKind::DEFAULT`] is the role freed citizens fall back to; the
/// reconciliation diff only ever converts to or from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpecialistKind {
    Entertainer = 0,
    Taxman = 1,
    Scientist = 2,
}

pub const SPECIALIST_KIND_COUNT: usize = 3;

impl SpecialistKind {
    pub const ALL: [SpecialistKind; SPECIALIST_KIND_COUNT] = [
        SpecialistKind::Entertainer,
        SpecialistKind::Taxman,
        SpecialistKind::Scientist,
    ];

    pub const DEFAULT: SpecialistKind = SpecialistKind::Entertainer;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

/// Index of the city-center tile in every worker-position vector.
///
/// The center is always worked and never optional, so structural result
/// comparison skips it.
pub const CITY_CENTER: usize = 0;

/// Number of workable tile slots for a city of the given squared radius,
/// city center included at index [`CITY_CENTER`].
pub fn city_map_tiles(radius_sq: i32) -> usize {
    let bound = (radius_sq.max(0) as f64).sqrt() as i32;
    let mut count = 0usize;
    for dx in -bound..=bound {
        for dy in -bound..=bound {
            if dx * dx + dy * dy <= radius_sq {
                count += 1;
            }
        }
    }
    count
}

/// User-configurable description of what a governed city should optimize for.
///
/// Equality is structural over every field; it backs both preset matching
/// and the "nothing to do" short-circuit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CmParameter {
    pub minimal_surplus: [i16; OUTPUT_KIND_COUNT],
    pub factor: [i16; OUTPUT_KIND_COUNT],
    pub happy_factor: i16,
    pub require_happy: bool,
    pub allow_disorder: bool,
    pub allow_specialists: bool,
    pub max_growth: bool,
}

impl Default for CmParameter {
    fn default() -> Self {
        Self {
            minimal_surplus: [0; OUTPUT_KIND_COUNT],
            factor: [1; OUTPUT_KIND_COUNT],
            happy_factor: 1,
            require_happy: false,
            allow_disorder: false,
            allow_specialists: true,
            max_growth: false,
        }
    }
}

/// Worker/specialist assignment proposed by the external optimizer, or the
/// actual assignment derived from live city state.
///
/// When `found_a_valid` is false every other field is meaningless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmResult {
    pub found_a_valid: bool,
    pub disorder: bool,
    pub happy: bool,
    pub worker_positions: Vec<bool>,
    pub specialists: [u16; SPECIALIST_KIND_COUNT],
    pub surplus: [i32; OUTPUT_KIND_COUNT],
    pub city_radius_sq: i32,
}

impl CmResult {
    /// Empty valid result sized for a city of the given radius, with only
    /// the center tile worked.
    pub fn for_radius(radius_sq: i32) -> Self {
        let mut worker_positions = vec![false; city_map_tiles(radius_sq)];
        worker_positions[CITY_CENTER] = true;
        Self {
            found_a_valid: true,
            disorder: false,
            happy: false,
            worker_positions,
            specialists: [0; SPECIALIST_KIND_COUNT],
            surplus: [0; OUTPUT_KIND_COUNT],
            city_radius_sq: radius_sq,
        }
    }

    /// Citizens accounted for: workers on non-center tiles plus specialists.
    pub fn citizen_count(&self) -> u32 {
        let workers = self
            .worker_positions
            .iter()
            .enumerate()
            .filter(|(index, worked)| *index != CITY_CENTER && **worked)
            .count() as u32;
        let specialists: u32 = self.specialists.iter().map(|count| u32::from(*count)).sum();
        workers + specialists
    }

    /// Structural comparison: disorder, happiness, every specialist count,
    /// every surplus, and every worked tile except the city center.
    ///
    /// Comparing results for differently sized city maps is a programming
    /// fault, not a legitimate "different" outcome.
    pub fn agrees_with(&self, other: &CmResult) -> bool {
        debug_assert_eq!(
            self.city_radius_sq, other.city_radius_sq,
            "results compared across different city radii"
        );
        if self.city_radius_sq != other.city_radius_sq {
            return false;
        }
        if self.disorder != other.disorder || self.happy != other.happy {
            return false;
        }
        if self.specialists != other.specialists || self.surplus != other.surplus {
            return false;
        }
        self.worker_positions
            .iter()
            .zip(other.worker_positions.iter())
            .enumerate()
            .all(|(index, (mine, theirs))| index == CITY_CENTER || mine == theirs)
    }
}

/// Fixed capacity of the persisted parameter blob.
pub const PARAM_BLOB_LEN: usize = 32;

/// Format version written as the blob's leading byte. Any change to field
/// order or width needs a new version and an explicit migration; old saves
/// decode by this byte alone.
pub const PARAM_BLOB_VERSION: u8 = 2;

struct BlobWriter {
    buf: [u8; PARAM_BLOB_LEN],
    pos: usize,
}

impl BlobWriter {
    fn new() -> Self {
        Self {
            buf: [0; PARAM_BLOB_LEN],
            pos: 0,
        }
    }

    fn put_u8(&mut self, value: u8) {
        self.buf[self.pos] = value;
        self.pos += 1;
    }

    fn put_i16(&mut self, value: i16) {
        // Network byte order, matching the original attribute blobs.
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_be_bytes());
        self.pos += 2;
    }

    fn put_bool(&mut self, value: bool) {
        self.put_u8(u8::from(value));
    }
}

struct BlobReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BlobReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn get_u8(&mut self) -> Option<u8> {
        let value = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn get_i16(&mut self) -> Option<i16> {
        let slice = self.bytes.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(i16::from_be_bytes([slice[0], slice[1]]))
    }

    fn get_bool(&mut self) -> Option<bool> {
        self.get_u8().map(|value| value != 0)
    }
}

/// Serialize a parameter into the fixed 32-byte attribute blob.
pub fn encode_parameter(param: &CmParameter) -> [u8; PARAM_BLOB_LEN] {
    let mut out = BlobWriter::new();
    out.put_u8(PARAM_BLOB_VERSION);
    for kind in OutputKind::ALL {
        out.put_i16(param.minimal_surplus[kind.index()]);
        out.put_i16(param.factor[kind.index()]);
    }
    out.put_i16(param.happy_factor);
    // Reserved byte once holding "factor_target"; kept zero for layout
    // compatibility with existing saved blobs.
    out.put_u8(0);
    out.put_bool(param.require_happy);
    out.put_bool(param.max_growth);
    out.put_bool(param.allow_disorder);
    out.put_bool(param.allow_specialists);
    out.buf
}

/// Deserialize a parameter blob.
///
/// Returns `None` for a zero-length blob or a foreign version byte; callers
/// treat that as "city not governed", never as an error. The three trailing
/// booleans are independently optional so blobs written before those fields
/// existed still decode.
pub fn decode_parameter(bytes: &[u8]) -> Option<CmParameter> {
    let mut input = BlobReader::new(bytes);
    if input.get_u8()? != PARAM_BLOB_VERSION {
        return None;
    }

    let mut param = CmParameter::default();
    for kind in OutputKind::ALL {
        param.minimal_surplus[kind.index()] = input.get_i16()?;
        param.factor[kind.index()] = input.get_i16()?;
    }
    param.happy_factor = input.get_i16()?;
    let _reserved = input.get_u8()?;
    param.require_happy = input.get_bool()?;

    param.max_growth = input.get_bool().unwrap_or(false);
    param.allow_disorder = input.get_bool().unwrap_or(false);
    param.allow_specialists = input.get_bool().unwrap_or(true);

    Some(param)
}
