//! Area name resolution
//!
//! Maps integer community-area codes to display names. Two sources are
//! supported and never merged by overwriting: names taken from boundary data
//! win when present, and the compiled-in table fills in everything else.

use crate::boundaries::BoundaryDocument;
use std::collections::BTreeMap;

/// The 77 community areas of Chicago, keyed by their official number.
pub const CHICAGO_COMMUNITY_AREAS: [(i64, &str); 77] = [
    (1, "Rogers Park"),
    (2, "West Ridge"),
    (3, "Uptown"),
    (4, "Lincoln Square"),
    (5, "North Center"),
    (6, "Lake View"),
    (7, "Lincoln Park"),
    (8, "Near North Side"),
    (9, "Edison Park"),
    (10, "Norwood Park"),
    (11, "Jefferson Park"),
    (12, "Forest Glen"),
    (13, "North Park"),
    (14, "Albany Park"),
    (15, "Portage Park"),
    (16, "Irving Park"),
    (17, "Dunning"),
    (18, "Montclare"),
    (19, "Belmont Cragin"),
    (20, "Hermosa"),
    (21, "Avondale"),
    (22, "Logan Square"),
    (23, "Humboldt Park"),
    (24, "West Town"),
    (25, "Austin"),
    (26, "West Garfield Park"),
    (27, "East Garfield Park"),
    (28, "Near West Side"),
    (29, "North Lawndale"),
    (30, "South Lawndale"),
    (31, "Lower West Side"),
    (32, "Loop"),
    (33, "Near South Side"),
    (34, "Armour Square"),
    (35, "Douglas"),
    (36, "Oakland"),
    (37, "Fuller Park"),
    (38, "Grand Boulevard"),
    (39, "Kenwood"),
    (40, "Washington Park"),
    (41, "Hyde Park"),
    (42, "Woodlawn"),
    (43, "South Shore"),
    (44, "Chatham"),
    (45, "Avalon Park"),
    (46, "South Chicago"),
    (47, "Burnside"),
    (48, "Calumet Heights"),
    (49, "Roseland"),
    (50, "Pullman"),
    (51, "South Deering"),
    (52, "East Side"),
    (53, "West Pullman"),
    (54, "Riverdale"),
    (55, "Hegewisch"),
    (56, "Garfield Ridge"),
    (57, "Archer Heights"),
    (58, "Brighton Park"),
    (59, "McKinley Park"),
    (60, "Bridgeport"),
    (61, "New City"),
    (62, "West Elsdon"),
    (63, "Gage Park"),
    (64, "Clearing"),
    (65, "West Lawn"),
    (66, "Chicago Lawn"),
    (67, "West Englewood"),
    (68, "Englewood"),
    (69, "Greater Grand Crossing"),
    (70, "Ashburn"),
    (71, "Auburn Gresham"),
    (72, "Beverly"),
    (73, "Washington Heights"),
    (74, "Mount Greenwood"),
    (75, "Morgan Park"),
    (76, "O'Hare"),
    (77, "Edgewater"),
];

/// Where a resolved name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrigin {
    /// Name property of a boundary feature
    Boundary,
    /// Compiled-in table
    Static,
}

/// Resolves area codes to display names with boundary data taking precedence
#[derive(Debug, Clone, Default)]
pub struct AreaNameResolver {
    boundary: BTreeMap<i64, String>,
    fallback: BTreeMap<i64, String>,
}

impl AreaNameResolver {
    /// Create a resolver backed only by the compiled-in Chicago table
    pub fn chicago() -> Self {
        Self::from_static(&CHICAGO_COMMUNITY_AREAS)
    }

    /// Create a resolver from an arbitrary static table
    pub fn from_static(entries: &[(i64, &str)]) -> Self {
        Self {
            boundary: BTreeMap::new(),
            fallback: entries
                .iter()
                .map(|(code, name)| (*code, name.to_string()))
                .collect(),
        }
    }

    /// Create a resolver backed only by boundary features
    pub fn from_boundaries(document: &BoundaryDocument) -> Self {
        Self::default().with_boundaries(document)
    }

    /// Layer boundary-derived names on top of the static table.
    ///
    /// The static table is kept intact; it is consulted only for codes the
    /// boundary document does not name.
    pub fn with_boundaries(mut self, document: &BoundaryDocument) -> Self {
        self.boundary = document
            .features()
            .iter()
            .map(|feature| (feature.code, feature.name.clone()))
            .collect();
        self
    }

    /// Display name for a code, or `None` when neither source knows it
    pub fn resolve(&self, code: i64) -> Option<&str> {
        self.resolve_with_origin(code).map(|(name, _)| name)
    }

    /// Display name for a code along with the source that supplied it
    pub fn resolve_with_origin(&self, code: i64) -> Option<(&str, NameOrigin)> {
        if let Some(name) = self.boundary.get(&code) {
            return Some((name.as_str(), NameOrigin::Boundary));
        }
        self.fallback
            .get(&code)
            .map(|name| (name.as_str(), NameOrigin::Static))
    }

    /// Whether any boundary-derived names are loaded
    pub fn has_boundaries(&self) -> bool {
        !self.boundary.is_empty()
    }

    /// Number of codes either source can resolve
    pub fn len(&self) -> usize {
        self.boundary
            .keys()
            .chain(self.fallback.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    /// Whether the resolver knows no codes at all
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty() && self.fallback.is_empty()
    }
}
