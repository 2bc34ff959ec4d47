use crate::models::Listing;
use std::collections::{BTreeSet, HashSet};

/// Exact, case-sensitive city allow-list. No cities means no restriction.
#[derive(Debug, Clone, Default)]
pub struct CityFilter {
    allowed: Option<HashSet<String>>,
}

impl CityFilter {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = cities
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| !c.trim().is_empty())
            .collect();

        Self { allowed: if allowed.is_empty() { None } else { Some(allowed) } }
    }

    pub fn allows(&self, city: &str) -> bool {
        self.allowed.as_ref().is_none_or(|a| a.contains(city))
    }

    pub fn is_restricted(&self) -> bool {
        self.allowed.is_some()
    }
}

/// Listings whose id has not been seen before and whose city passes the filter.
///
/// Every unseen id is recorded, including ids the city filter rejects, so a
/// rejected listing is never evaluated again on a later run.
pub fn filter_new(
    listings: &[Listing],
    seen_ids: &mut BTreeSet<String>,
    cities: &CityFilter,
) -> Vec<Listing> {
    let mut fresh = Vec::new();

    for listing in listings {
        if !seen_ids.insert(listing.id.clone()) {
            continue;
        }
        if cities.allows(&listing.city) {
            fresh.push(listing.clone());
        }
    }

    fresh
}
