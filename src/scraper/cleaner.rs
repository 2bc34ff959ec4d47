use crate::models::{Listing, RawListingPanel, UNKNOWN};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RE_LISTING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/listings/([^/?#]+)/detail").unwrap());
static RE_PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"€\s*(\d[\d.,]*)").unwrap());
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d.,]*)").unwrap());

/// Chip labels that name the unit type.
pub const ROOM_TYPES: &[&str] = &["Kamer", "Appartement", "Studio"];

const AVAILABILITY_LABEL: &str = "Beschikbaarheid:";

// ── Text helpers ──────────────────────────────────────────────────────────────

/// Collapse runs of whitespace and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Dutch number formatting to a plain decimal string.
/// "1.250,50" → "1250.50" | "950" → "950" | "950,-" → "950"
pub fn normalize_decimal(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['-', '.', ',']);
    let out = trimmed.replace('.', "").replace(',', ".");
    if out.chars().any(|c| c.is_ascii_digit()) { Some(out) } else { None }
}

/// Surface areas carry no thousands separator, so a lone `.` is the decimal
/// point. "45.5" → "45.5" | "45,5" → "45.5" | "1.250,5" → "1250.5"
pub fn normalize_area(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['-', '.', ',']);
    if trimmed.contains('.') && trimmed.contains(',') {
        return normalize_decimal(trimmed);
    }
    let out = trimmed.replace(',', ".");
    if out.chars().any(|c| c.is_ascii_digit()) { Some(out) } else { None }
}

// ── Field parsers ─────────────────────────────────────────────────────────────

/// Id segment of a detail link: "/listings/abc-123/detail" → "abc-123"
pub fn parse_listing_id(href: &str) -> Option<String> {
    RE_LISTING_ID
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

/// "€ 1.250,50 per maand" → "1250.50", anything without a euro amount → "?"
pub fn parse_price(s: &str) -> String {
    RE_PRICE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| normalize_decimal(m.as_str()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// "45 m²" → "45" | "45.5 m²" → "45.5"
pub fn parse_area(s: &str) -> Option<String> {
    RE_NUMBER
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| normalize_area(m.as_str()))
}

/// "Beschikbaarheid: 01-apr-2026" → "01-apr-2026"
pub fn parse_availability(s: &str) -> Option<String> {
    let s = clean_text(&s.replace(AVAILABILITY_LABEL, ""));
    if s.is_empty() { None } else { Some(s) }
}

fn is_area_chip(s: &str) -> bool {
    s.contains('m') && (s.contains('2') || s.contains('²'))
}

/// Chips carry both the surface area and the unit type, in no fixed order.
fn parse_chips(chips: &[String]) -> (String, Option<String>) {
    let mut area = None;
    let mut room_type = None;

    for chip in chips {
        let chip = clean_text(chip);
        if is_area_chip(&chip) {
            if let Some(a) = parse_area(&chip) {
                area = Some(a);
            }
        } else if ROOM_TYPES.contains(&chip.as_str()) {
            room_type = Some(chip);
        }
    }

    (area.unwrap_or_else(|| UNKNOWN.to_string()), room_type)
}

// ── Raw panel → Listing ───────────────────────────────────────────────────────

/// `None` when the panel link carries no listing id.
pub fn panel_to_listing(raw: RawListingPanel, origin: &Url) -> Option<Listing> {
    let href = raw.href?;
    let id = parse_listing_id(&href)?;

    let url = origin
        .join(&href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{}{}", origin.as_str().trim_end_matches('/'), href));

    let (area, room_type) = parse_chips(&raw.chips);

    Some(Listing {
        id,
        city: raw.city.as_deref().map(clean_text).unwrap_or_default(),
        street: raw.street.as_deref().map(clean_text).unwrap_or_default(),
        price: raw.price.as_deref().map(parse_price).unwrap_or_else(|| UNKNOWN.to_string()),
        area,
        room_type,
        availability: raw.availability.as_deref().and_then(parse_availability),
        badges: raw
            .badges
            .iter()
            .map(|b| clean_text(b))
            .filter(|b| !b.is_empty())
            .collect(),
        url,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
