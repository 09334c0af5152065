use std::collections::BTreeMap;
use std::fmt;

use gov_schema::{city_map_tiles, CmResult, CITY_CENTER, OUTPUT_KIND_COUNT, SPECIALIST_KIND_COUNT};

/// Stable identifier for a city, valid across capture and recapture.
///
/// The engine never caches a `&City`; it re-resolves the id against the
/// registry at every step, so a recycled slot can never be mistaken for the
/// city that used to live there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a player connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live city state as last confirmed by the server.
///
/// `worked` and `workable` are indexed by city-map tile, center at
/// [`CITY_CENTER`]; the center is always worked.
#[derive(Debug, Clone)]
pub struct City {
    pub id: CityId,
    pub owner: PlayerId,
    pub name: String,
    pub radius_sq: i32,
    pub worked: Vec<bool>,
    pub workable: Vec<bool>,
    pub specialists: [u16; SPECIALIST_KIND_COUNT],
    pub disorder: bool,
    pub happy: bool,
    pub surplus: [i32; OUTPUT_KIND_COUNT],
}

impl City {
    pub fn new(id: CityId, owner: PlayerId, name: impl Into<String>, radius_sq: i32) -> Self {
        let tiles = city_map_tiles(radius_sq);
        let mut worked = vec![false; tiles];
        worked[CITY_CENTER] = true;
        Self {
            id,
            owner,
            name: name.into(),
            radius_sq,
            worked,
            workable: vec![true; tiles],
            specialists: [0; SPECIALIST_KIND_COUNT],
            disorder: false,
            happy: false,
            surplus: [0; OUTPUT_KIND_COUNT],
        }
    }

    /// Citizens: workers on non-center tiles plus all specialists.
    pub fn citizen_count(&self) -> u32 {
        let workers = self
            .worked
            .iter()
            .enumerate()
            .filter(|(index, worked)| *index != CITY_CENTER && **worked)
            .count() as u32;
        let specialists: u32 = self.specialists.iter().map(|count| u32::from(*count)).sum();
        workers + specialists
    }

    /// Derive the current server-confirmed assignment as an optimizer result,
    /// for diffing against a computed target.
    pub fn as_result(&self) -> CmResult {
        CmResult {
            found_a_valid: true,
            disorder: self.disorder,
            happy: self.happy,
            worker_positions: self.worked.clone(),
            specialists: self.specialists,
            surplus: self.surplus,
            city_radius_sq: self.radius_sq,
        }
    }
}

/// Id-keyed arena of live cities plus the locally attached player.
///
/// Stands in for the game-state layer; the governor only ever asks it "is
/// this id still one of the local player's live cities" and "give me the
/// current object for this id".
#[derive(Debug, Default)]
pub struct CityRegistry {
    cities: BTreeMap<CityId, City>,
    local_player: Option<PlayerId>,
}

impl CityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_player(&self) -> Option<PlayerId> {
        self.local_player
    }

    pub fn set_local_player(&mut self, player: Option<PlayerId>) {
        self.local_player = player;
    }

    pub fn insert(&mut self, city: City) {
        self.cities.insert(city.id, city);
    }

    pub fn remove(&mut self, id: CityId) -> Option<City> {
        self.cities.remove(&id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(&id)
    }

    /// True iff the id resolves to a live city owned by the local player.
    pub fn is_local_city(&self, id: CityId) -> bool {
        match (self.local_player, self.cities.get(&id)) {
            (Some(player), Some(city)) => city.owner == player,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
