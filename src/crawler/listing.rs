//! Listing-page extraction
//!
//! Given one listing-page document, locate each restaurant card and extract
//! its summary fields. Menus are not touched here; they come later from the
//! detail page.
//!
//! Field-level failures never discard a card: a rating or delivery-estimate
//! that fails to parse records a stage-tagged error and the card is still
//! forwarded with whatever fields were extracted. Missing optional markup
//! (image, rating, estimate) is a zero value, not an error.

use crate::crawler::{select_attr, select_first, select_text};
use crate::duration;
use crate::model::Restaurant;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

/// Everything extracted from one listing page
#[derive(Debug, Default)]
pub struct ListingOutcome {
    /// One partially-populated restaurant per discovered card
    pub cards: Vec<Restaurant>,

    /// Field-level extraction errors, in card order
    pub errors: Vec<CrawlError>,
}

/// Extracts all restaurant cards from a listing-page document
///
/// A page without any cards yields an empty outcome; the last page of a
/// pagination is expected to be short or empty.
pub fn extract_cards(html: &str) -> ListingOutcome {
    let document = Html::parse_document(html);
    let mut outcome = ListingOutcome::default();

    if let Ok(card_selector) = Selector::parse("section#listing-container > article") {
        for card in document.select(&card_selector) {
            let (restaurant, errors) = extract_card(card);
            outcome.cards.push(restaurant);
            outcome.errors.extend(errors);
        }
    }

    outcome
}

/// Extracts the summary fields of a single card
fn extract_card(card: ElementRef) -> (Restaurant, Vec<CrawlError>) {
    let mut errors = Vec::new();
    let mut restaurant = Restaurant::default();

    if let Some(src) = select_attr(card, ".item-pic > img", "src") {
        restaurant.image_url = src;
    }

    if let Some(href) = select_attr(card, ".item-pic > a", "href") {
        restaurant.url = href;
    }

    restaurant.title = select_text(card, ".item-title > a")
        .unwrap_or_default()
        .trim()
        .to_string();

    // Rating is only attempted when the attribute exists
    if let Some(raw) = select_attr(card, ".item-title > span.item-star-rating", "data-rating") {
        match raw.trim().parse::<u8>() {
            Ok(rating) => restaurant.rating = rating,
            Err(source) => errors.push(CrawlError::RatingParse {
                url: restaurant.url.clone(),
                value: raw,
                source,
            }),
        }
    }

    restaurant.cuisine = select_text(card, ".item-meta > .item-address")
        .unwrap_or_default()
        .trim()
        .to_string();

    if let Some(raw) = delivery_estimate_text(card) {
        match duration::parse_estimate(&raw) {
            Ok(estimate) => restaurant.delivery_estimate = estimate,
            Err(source) => errors.push(CrawlError::DurationParse {
                url: restaurant.url.clone(),
                value: raw,
                source,
            }),
        }
    }

    (restaurant, errors)
}

/// The delivery estimate sits in the last element child of the first info
/// cell of the card meta row
fn delivery_estimate_text(card: ElementRef) -> Option<String> {
    let cell = select_first(card, ".item-meta .row-fluid .span4")?;
    let last = cell.children().filter_map(ElementRef::wrap).last()?;
    let text = last.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
