use std::collections::HashMap;

use shared::domain::{MarkerId, MarkerPurpose};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteConfigError {
    #[error("markers {} and {} both control {purpose:?}", first.0, second.0)]
    DuplicatePurpose {
        first: MarkerId,
        second: MarkerId,
        purpose: MarkerPurpose,
    },
}

/// Fixed dispatch table from physical marker id to the state field it
/// controls. Two markers steering the same mutable field would make their
/// writes race, so such tables are rejected at construction; `Reserved` may
/// repeat since it mutates nothing.
#[derive(Debug, Clone)]
pub struct MarkerRoutes {
    table: HashMap<MarkerId, MarkerPurpose>,
}

impl Default for MarkerRoutes {
    fn default() -> Self {
        let table = HashMap::from([
            (MarkerId(1), MarkerPurpose::XAxis),
            (MarkerId(2), MarkerPurpose::YAxis),
            (MarkerId(3), MarkerPurpose::SortColumn),
            (MarkerId(4), MarkerPurpose::SortOrder),
            (MarkerId(5), MarkerPurpose::FilterCategory),
            (MarkerId(6), MarkerPurpose::ChartType),
            (MarkerId(7), MarkerPurpose::Reserved),
        ]);
        Self { table }
    }
}

impl MarkerRoutes {
    pub fn with_table(
        entries: impl IntoIterator<Item = (MarkerId, MarkerPurpose)>,
    ) -> Result<Self, RouteConfigError> {
        let table: HashMap<MarkerId, MarkerPurpose> = entries.into_iter().collect();

        let mut by_purpose: HashMap<MarkerPurpose, MarkerId> = HashMap::new();
        let mut markers: Vec<&MarkerId> = table.keys().collect();
        markers.sort_by_key(|marker| marker.0);
        for marker in markers {
            let purpose = table[marker];
            if purpose == MarkerPurpose::Reserved {
                continue;
            }
            if let Some(first) = by_purpose.insert(purpose, *marker) {
                return Err(RouteConfigError::DuplicatePurpose {
                    first,
                    second: *marker,
                    purpose,
                });
            }
        }
        Ok(Self { table })
    }

    pub fn purpose_for(&self, marker: MarkerId) -> Option<MarkerPurpose> {
        self.table.get(&marker).copied()
    }
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
