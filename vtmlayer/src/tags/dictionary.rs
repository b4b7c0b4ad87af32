//! Fixed tag dictionary shared by server and client.
//!
//! The tables are read-only and indexed by position, so their order is part of
//! the wire format. New entries may only be appended.

use std::sync::{Arc, OnceLock};

/// Tag references at or above this index address the per-tile tables.
pub const ATTRIB_OFFSET: u32 = 256;

/// Common keys, indexed `0..=MAX_KEY`.
pub const KEYS: &[&str] = &[
    "access",
    "addr:housename",
    "addr:housenumber",
    "addr:interpolation",
    "admin_level",
    "aerialway",
    "aeroway",
    "amenity",
    "area",
    "barrier",
    "bicycle",
    "brand",
    "bridge",
    "boundary",
    "building",
    "construction",
    "covered",
    "culvert",
    "cutting",
    "denomination",
    "disused",
    "embankment",
    "foot",
    "generator:source",
    "harbour",
    "highway",
    "historic",
    "horse",
    "intermittent",
    "junction",
    "landuse",
    "layer",
    "leisure",
    "lock",
    "man_made",
    "military",
    "motorcar",
    "name",
    "natural",
    "oneway",
    "operator",
    "population",
    "power",
    "power_source",
    "place",
    "railway",
    "ref",
    "religion",
    "route",
    "service",
    "shop",
    "sport",
    "surface",
    "toll",
    "tourism",
    "tracktype",
    "tunnel",
    "water",
    "waterway",
    "wetland",
    "width",
    "wood",
    "height",
    "min_height",
    "roof:shape",
    "roof:height",
    "rank",
];

/// Common values, indexed `0..=MAX_VALUE`.
pub const VALUES: &[&str] = &[
    "yes",
    "residential",
    "service",
    "unclassified",
    "stream",
    "track",
    "water",
    "footway",
    "tertiary",
    "private",
    "tree",
    "path",
    "forest",
    "secondary",
    "house",
    "no",
    "asphalt",
    "wood",
    "grass",
    "paved",
    "primary",
    "unpaved",
    "bus_stop",
    "parking",
    "parking_aisle",
    "rail",
    "driveway",
    "8",
    "administrative",
    "locality",
    "turning_circle",
    "crossing",
    "village",
    "fence",
    "grade2",
    "coastline",
    "grade3",
    "farmland",
    "hamlet",
    "hut",
    "meadow",
    "wetland",
    "cycleway",
    "river",
    "school",
    "trunk",
    "gravel",
    "place_of_worship",
    "farm",
    "grade1",
    "traffic_signals",
    "wall",
    "garage",
    "gate",
    "motorway",
    "living_street",
    "pitch",
    "grade4",
    "industrial",
    "road",
    "ground",
    "scrub",
    "motorway_link",
    "steps",
    "ditch",
    "swimming_pool",
    "grade5",
    "park",
    "apartments",
    "restaurant",
    "designated",
    "bench",
    "survey_point",
    "pedestrian",
    "hedge",
    "reservoir",
    "riverbank",
    "alley",
    "farmyard",
    "peak",
    "level_crossing",
    "roof",
    "dirt",
    "drain",
    "garages",
    "entrance",
    "street_lamp",
    "deciduous",
    "fuel",
    "trunk_link",
    "information",
    "playground",
    "supermarket",
    "primary_link",
    "concrete",
    "mixed",
    "permissive",
    "orchard",
    "grave_yard",
    "canal",
    "garden",
    "spur",
    "paving_stones",
    "rock",
    "bollard",
    "convenience",
    "cemetery",
    "post_box",
    "commercial",
    "pier",
    "bank",
    "hotel",
    "cliff",
    "retail",
    "construction",
    "-1",
    "fast_food",
    "coniferous",
    "cafe",
    "6",
    "kindergarten",
    "tower",
    "hospital",
    "yard",
    "sand",
    "public_building",
    "cobblestone",
    "destination",
    "island",
    "abandoned",
    "vineyard",
    "recycling",
    "agricultural",
    "isolated_dwelling",
    "pharmacy",
    "post_office",
    "motorway_junction",
    "pub",
    "allotments",
    "dam",
    "secondary_link",
    "lift_gate",
    "siding",
    "stop",
    "main",
    "farm_auxiliary",
    "quarry",
    "10",
    "station",
    "platform",
    "taxiway",
    "limited",
    "sports_centre",
    "cutline",
    "detached",
    "storage_tank",
    "basin",
    "bicycle_parking",
    "telephone",
    "terrace",
    "town",
    "suburb",
    "bus",
    "compacted",
    "toilets",
    "heath",
    "works",
    "tram",
    "beach",
    "culvert",
    "fire_station",
    "recreation_ground",
    "bakery",
    "police",
    "atm",
    "clothes",
    "tertiary_link",
    "waste_basket",
    "attraction",
    "viewpoint",
    "bicycle",
    "church",
    "shelter",
    "drinking_water",
    "marsh",
    "picnic_site",
    "hairdresser",
    "bridleway",
    "retaining_wall",
    "buffer_stop",
    "nature_reserve",
    "village_green",
    "university",
    "1",
    "bar",
    "townhall",
    "mini_roundabout",
    "camp_site",
    "aerodrome",
    "stile",
    "9",
    "car_repair",
    "parking_space",
    "library",
    "pipeline",
    "true",
    "cycle_barrier",
    "4",
    "museum",
    "spring",
    "hunting_stand",
    "disused",
    "car",
    "tram_stop",
    "land",
    "fountain",
    "hiking",
    "manufacture",
    "vending_machine",
    "kiosk",
    "swamp",
    "unknown",
    "7",
    "islet",
    "shed",
    "switch",
    "rapids",
    "office",
    "bay",
    "proposed",
    "common",
    "weir",
    "grassland",
    "customers",
    "social_facility",
    "hangar",
    "doctors",
    "stadium",
    "give_way",
    "greenhouse",
    "guest_house",
    "viaduct",
    "doityourself",
    "runway",
    "bus_station",
    "water_tower",
    "golf_course",
    "conservation",
    "block",
    "college",
];

/// Largest valid index into [`KEYS`].
pub const MAX_KEY: u32 = KEYS.len() as u32 - 1;

/// Largest valid index into [`VALUES`].
pub const MAX_VALUE: u32 = VALUES.len() as u32 - 1;

fn interned(table: &'static [&'static str]) -> Vec<Arc<str>> {
    table.iter().map(|s| Arc::from(*s)).collect()
}

fn interned_keys() -> &'static [Arc<str>] {
    static INTERNED: OnceLock<Vec<Arc<str>>> = OnceLock::new();
    INTERNED.get_or_init(|| interned(KEYS))
}

fn interned_values() -> &'static [Arc<str>] {
    static INTERNED: OnceLock<Vec<Arc<str>>> = OnceLock::new();
    INTERNED.get_or_init(|| interned(VALUES))
}

/// Look up a key in the fixed dictionary.
pub fn static_key(index: u32) -> Option<Arc<str>> {
    interned_keys().get(index as usize).cloned()
}

/// Look up a value in the fixed dictionary.
pub fn static_value(index: u32) -> Option<Arc<str>> {
    interned_values().get(index as usize).cloned()
}

/// Resolve a raw key reference against the fixed dictionary or the tile's
/// own key table.
///
/// Returns `None` when the index is outside the table it addresses.
pub fn resolve_key(index: u32, tile_keys: &[Arc<str>]) -> Option<Arc<str>> {
    resolve(index, MAX_KEY, static_key, tile_keys)
}

/// Resolve a raw value reference, see [`resolve_key`].
pub fn resolve_value(index: u32, tile_values: &[Arc<str>]) -> Option<Arc<str>> {
    resolve(index, MAX_VALUE, static_value, tile_values)
}

fn resolve(
    index: u32,
    max_static: u32,
    lookup: fn(u32) -> Option<Arc<str>>,
    dynamic: &[Arc<str>],
) -> Option<Arc<str>> {
    if index < ATTRIB_OFFSET {
        if index > max_static {
            return None;
        }
        lookup(index)
    } else {
        dynamic.get((index - ATTRIB_OFFSET) as usize).cloned()
    }
}
