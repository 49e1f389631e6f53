//! Detail-page menu extraction
//!
//! Given a restaurant's detail-page document, iterate its menu-category
//! panes, items, and serving variants in document order. An unparsable
//! price skips only that one serving; siblings, the item, and the
//! restaurant all survive.

use crate::crawler::{select_attr, select_first, select_text};
use crate::model::{Meal, Serving};
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

/// Everything extracted from one detail page
#[derive(Debug, Default)]
pub struct MenuOutcome {
    /// One meal per menu item, in document order
    pub meals: Vec<Meal>,

    /// Price extraction errors, in document order
    pub errors: Vec<CrawlError>,
}

/// Extracts the full menu from a detail-page document
///
/// `restaurant_url` is the detail path of the restaurant being parsed; it
/// only tags errors.
pub fn extract_menu(html: &str, restaurant_url: &str) -> MenuOutcome {
    let document = Html::parse_document(html);
    let mut outcome = MenuOutcome::default();

    let (Ok(pane_selector), Ok(item_selector)) = (
        Selector::parse(".tab-pane.mspan7-menu"),
        Selector::parse(".menu-item"),
    ) else {
        return outcome;
    };

    for pane in document.select(&pane_selector) {
        let category = select_text(pane, "h4").unwrap_or_default().trim().to_string();

        for item in pane.select(&item_selector) {
            let meal = extract_item(item, &category, restaurant_url, &mut outcome.errors);
            outcome.meals.push(meal);
        }
    }

    outcome
}

/// Extracts one menu item and its servings
fn extract_item(
    item: ElementRef,
    category: &str,
    restaurant_url: &str,
    errors: &mut Vec<CrawlError>,
) -> Meal {
    let mut meal = Meal {
        category: category.to_string(),
        name: item_name(item),
        description: select_text(item, ".menu-item-name > small")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        servings: Vec::new(),
    };

    if let Ok(serving_selector) = Selector::parse(".menu-subitems > .menu-subitem") {
        for serving in item.select(&serving_selector) {
            let kind = select_text(serving, ".subitem-name")
                .unwrap_or_default()
                .trim()
                .to_string();

            let raw = price_text(serving);
            match raw.trim().parse::<i64>() {
                Ok(price) => meal.servings.push(Serving { kind, price }),
                Err(source) => errors.push(CrawlError::PriceParse {
                    url: restaurant_url.to_string(),
                    value: raw,
                    source,
                }),
            }
        }
    }

    meal
}

/// Item name is the direct text of the name node, excluding the nested
/// description element
fn item_name(item: ElementRef) -> String {
    let Some(name) = select_first(item, ".menu-item-name") else {
        return String::new();
    };

    name.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Price is read preferentially from the hidden numeric field, falling back
/// to the second whitespace-separated token of the visible price string
/// (e.g. "Rs. 450")
fn price_text(serving: ElementRef) -> String {
    if let Some(value) = select_attr(serving, r#"input#ItemPrice[type="hidden"]"#, "value") {
        return value;
    }

    select_text(serving, ".subitem-price > span")
        .unwrap_or_default()
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string()
}
