use serde::Serialize;

/// Placeholder for a numeric field that could not be read from the page.
pub const UNKNOWN: &str = "?";

// ── Listing ───────────────────────────────────────────────────────────────────

/// One rental unit scraped from the overview page. Rebuilt on every run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    pub id: String,
    pub city: String,
    pub street: String,
    pub price: String,                 // "1250.50" or "?"
    pub area: String,                  // m², "45", "45.5" or "?"
    pub room_type: Option<String>,     // Kamer, Appartement, Studio
    pub availability: Option<String>,  // "01-apr-2026"
    pub badges: Vec<String>,           // Gereserveerd, Short Stay, ...
    pub url: String,
}

impl Listing {
    /// "Kerkstraat 1, Nijmegen"
    pub fn display_name(&self) -> String {
        match (self.street.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{}, {}", self.street, self.city),
            (false, true) => self.street.clone(),
            (true, false) => self.city.clone(),
            (true, true) => self.id.clone(),
        }
    }
}

// ── Raw panel ─────────────────────────────────────────────────────────────────

/// Text pulled out of one listing panel before cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawListingPanel {
    pub href: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub price: Option<String>,
    pub availability: Option<String>,
    pub chips: Vec<String>,   // btn--light divs: area and room type
    pub badges: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(street: &str, city: &str) -> Listing {
        Listing {
            id: "abc".into(),
            city: city.into(),
            street: street.into(),
            price: UNKNOWN.into(),
            area: UNKNOWN.into(),
            room_type: None,
            availability: None,
            badges: vec![],
            url: "https://www.klikenhuur.nl/listings/abc/detail".into(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(listing("Kerkstraat 1", "Nijmegen").display_name(), "Kerkstraat 1, Nijmegen");
        assert_eq!(listing("", "Arnhem").display_name(), "Arnhem");
        assert_eq!(listing("", "").display_name(), "abc");
    }

    #[test]
    fn test_listing_json_shape() {
        let mut l = listing("Kerkstraat 1", "Nijmegen");
        l.price = "1250.50".into();
        l.badges = vec!["Gereserveerd".into()];

        let v = serde_json::to_value(&l).unwrap();
        assert_eq!(v["id"], "abc");
        assert_eq!(v["price"], "1250.50");
        assert_eq!(v["area"], "?");
        assert!(v["room_type"].is_null());
        assert_eq!(v["badges"], serde_json::json!(["Gereserveerd"]));
        assert_eq!(v["url"], "https://www.klikenhuur.nl/listings/abc/detail");
    }
}
