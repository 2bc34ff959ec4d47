use crate::models::RawListingPanel;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

// ── Overview page ─────────────────────────────────────────────────────────────

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("selector {:?}: {:?}", css, e))
}

/// Text of an element with each text node trimmed, joined by single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes concatenated as they appear, then whitespace-collapsed. Keeps
/// `€ 1.250<sup>,50</sup>` in one piece where `element_text` would split it.
fn inline_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(element_text)
}

/// Every listing panel on the overview page, in document order.
/// Fields are pulled independently; a missing element leaves its field empty.
pub fn parse_listing_panels(html: &str) -> Result<Vec<RawListingPanel>> {
    let doc = Html::parse_document(html);

    let panel_sel = selector(r#"a[class*="panel--listing"]"#)?;
    let city_sel = selector("h4")?;
    let street_sel = selector("h3")?;
    let price_sel = selector("p.no-margin")?;
    let availability_sel = selector("div.text--s")?;
    let chip_sel = selector("div.btn--light")?;
    let badge_wrapper_sel = selector("div.listing-item-badge-wrapper")?;
    let badge_sel = selector(r#"div[class*="badge-"]"#)?;

    let mut panels = Vec::new();

    for panel in doc.select(&panel_sel) {
        let badges = match panel.select(&badge_wrapper_sel).next() {
            Some(wrapper) => wrapper
                .select(&badge_sel)
                .filter(|b| *b != wrapper)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect(),
            None => vec![],
        };

        panels.push(RawListingPanel {
            href: panel.value().attr("href").map(|h| h.to_string()),
            city: first_text(panel, &city_sel),
            street: first_text(panel, &street_sel),
            price: panel.select(&price_sel).next().map(inline_text),
            availability: first_text(panel, &availability_sel),
            chips: panel.select(&chip_sel).map(element_text).collect(),
            badges,
        });
    }

    Ok(panels)
}
