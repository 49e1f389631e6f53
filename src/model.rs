//! Data model for crawled restaurants and their menus

use crate::CrawlError;
use serde::Serialize;
use std::time::Duration;

/// One restaurant discovered on a listing page
///
/// Summary fields (everything except `menu`) are populated from the listing
/// card; the menu is attached afterwards from the detail page. A value is
/// never mutated once it has been handed to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Restaurant {
    /// Detail-page path relative to the site base URL; identity of the record
    pub url: String,

    /// Cover image URL; empty if the card carried none
    pub image_url: String,

    /// Display name
    pub title: String,

    /// Cuisine / venue type string as shown on the card
    pub cuisine: String,

    /// Star rating 0-5; 0 if the card carried no rating attribute
    pub rating: u8,

    /// Estimated delivery duration; zero if the card carried no estimate
    pub delivery_estimate: Duration,

    /// Menu items in document order; empty when the detail fetch failed
    pub menu: Vec<Meal>,
}

/// One menu item within a category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Meal {
    /// Category label the item appeared under (e.g. "Starters")
    pub category: String,

    /// Item name, trimmed, excluding the nested description
    pub name: String,

    /// Optional description shown under the name
    pub description: Option<String>,

    /// Purchasable variants in document order
    pub servings: Vec<Serving>,
}

/// A purchasable variant of a meal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Serving {
    /// Variant label, typically a size ("Small", "Family")
    pub kind: String,

    /// Price in the smallest currency unit
    pub price: i64,
}

/// Terminal aggregate of one crawl run
///
/// Restaurants arrive in fetch-completion order; there is no ordering
/// guarantee across restaurants or pages. In stream mode both collections
/// are empty because everything was forwarded to the caller's channels.
#[derive(Debug, Default)]
pub struct CrawlResult {
    pub restaurants: Vec<Restaurant>,
    pub errors: Vec<CrawlError>,
}
