//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the delivery site and exercise
//! the full crawl cycle end-to-end: pagination fan-out, card fan-out,
//! detail fetches, and both output modes.

use grubmap::config::{Config, CrawlerConfig, SiteConfig};
use grubmap::crawler::CrawlerBuilder;
use grubmap::{CrawlError, Stage};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, max_pages: u32) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            city: "karachi".to_string(),
        },
        crawler: CrawlerConfig {
            max_pages,
            max_concurrent_fetches: 0,
            request_timeout_secs: 5,
            user_agent: "grubmap-test/1.0".to_string(),
        },
    }
}

fn listing_page(cards: &str) -> String {
    format!(
        r#"<html><body><section id="listing-container">{}</section></body></html>"#,
        cards
    )
}

fn card(detail_path: &str, title: &str, rating: &str) -> String {
    format!(
        r#"<article>
            <div class="item-pic">
                <img src="/img{detail_path}.jpg">
                <a href="{detail_path}"></a>
            </div>
            <div class="item-title">
                <a>{title}</a>
                <span class="item-star-rating" data-rating="{rating}"></span>
            </div>
            <div class="item-meta">
                <div class="item-address">BBQ, Seafood</div>
                <div class="row-fluid">
                    <div class="span4"><span>Delivery</span><span>30-40 min</span></div>
                </div>
            </div>
        </article>"#
    )
}

fn menu_item(name: &str, servings: &[(&str, i64)]) -> String {
    let servings: String = servings
        .iter()
        .map(|(kind, price)| {
            format!(
                r#"<div class="menu-subitem">
                    <span class="subitem-name">{kind}</span>
                    <input type="hidden" id="ItemPrice" value="{price}">
                </div>"#
            )
        })
        .collect();
    format!(
        r#"<div class="menu-item">
            <div class="menu-item-name">{name}</div>
            <div class="menu-subitems">{servings}</div>
        </div>"#
    )
}

fn menu_pane(category: &str, items: &str) -> String {
    format!(
        r#"<div class="tab-pane mspan7-menu"><h4>{}</h4>{}</div>"#,
        category, items
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/karachi/delivery"))
        .and(query_param("Search_PageNo", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, detail_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(detail_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn collect_mode_round_trip_preserves_menu_order() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        0,
        listing_page(&card("/restaurant/kolachi", "Kolachi", "4")),
    )
    .await;

    // 2 categories x 2 items x 2 servings, 8 distinct prices
    let detail = format!(
        "<html><body>{}{}</body></html>",
        menu_pane(
            "BBQ",
            &format!(
                "{}{}",
                menu_item("Tikka", &[("Half", 250), ("Full", 450)]),
                menu_item("Malai Boti", &[("Half", 300), ("Full", 550)]),
            ),
        ),
        menu_pane(
            "Karahi",
            &format!(
                "{}{}",
                menu_item("Chicken Karahi", &[("Half", 600), ("Full", 1100)]),
                menu_item("Mutton Karahi", &[("Half", 900), ("Full", 1700)]),
            ),
        ),
    );
    mount_detail(&server, "/restaurant/kolachi", detail).await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.restaurants.len(), 1);

    let restaurant = &result.restaurants[0];
    assert_eq!(restaurant.title, "Kolachi");
    assert_eq!(restaurant.rating, 4);
    assert_eq!(restaurant.delivery_estimate, Duration::from_secs(40 * 60));
    assert_eq!(restaurant.menu.len(), 4);

    let flattened: Vec<(String, String, i64)> = restaurant
        .menu
        .iter()
        .flat_map(|meal| {
            meal.servings
                .iter()
                .map(|s| (meal.name.clone(), s.kind.clone(), s.price))
        })
        .collect();
    assert_eq!(
        flattened,
        [
            ("Tikka".to_string(), "Half".to_string(), 250),
            ("Tikka".to_string(), "Full".to_string(), 450),
            ("Malai Boti".to_string(), "Half".to_string(), 300),
            ("Malai Boti".to_string(), "Full".to_string(), 550),
            ("Chicken Karahi".to_string(), "Half".to_string(), 600),
            ("Chicken Karahi".to_string(), "Full".to_string(), 1100),
            ("Mutton Karahi".to_string(), "Half".to_string(), 900),
            ("Mutton Karahi".to_string(), "Full".to_string(), 1700),
        ]
    );

    let categories: Vec<_> = restaurant.menu.iter().map(|m| m.category.as_str()).collect();
    assert_eq!(categories, ["BBQ", "BBQ", "Karahi", "Karahi"]);
}

#[tokio::test]
async fn missing_optional_card_fields_are_zero_values() {
    let server = MockServer::start().await;

    let bare_card = r#"<article>
        <div class="item-pic"><a href="/restaurant/plain"></a></div>
        <div class="item-title"><a>Plain Diner</a></div>
    </article>"#;
    mount_listing(&server, 0, listing_page(bare_card)).await;
    mount_detail(&server, "/restaurant/plain", "<html><body></body></html>".to_string()).await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert!(result.errors.is_empty());
    let restaurant = &result.restaurants[0];
    assert_eq!(restaurant.title, "Plain Diner");
    assert!(restaurant.image_url.is_empty());
    assert_eq!(restaurant.rating, 0);
    assert_eq!(restaurant.delivery_estimate, Duration::ZERO);
}

#[tokio::test]
async fn detail_fetch_failure_keeps_restaurant_with_empty_menu() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        0,
        listing_page(&card("/restaurant/gone", "Gone Fishing", "3")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/restaurant/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert_eq!(result.restaurants.len(), 1);
    let restaurant = &result.restaurants[0];
    assert_eq!(restaurant.title, "Gone Fishing");
    assert!(restaurant.menu.is_empty());

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage(), Stage::DetailFetch);
    assert!(matches!(
        &result.errors[0],
        CrawlError::DetailFetch { url, .. } if url == "/restaurant/gone"
    ));
}

#[tokio::test]
async fn unparsable_price_skips_only_that_serving() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        0,
        listing_page(&card("/restaurant/pizzeria", "Pizzeria", "5")),
    )
    .await;

    let detail = format!(
        "<html><body>{}</body></html>",
        menu_pane(
            "Pizza",
            r#"<div class="menu-item">
                <div class="menu-item-name">Margherita</div>
                <div class="menu-subitems">
                    <div class="menu-subitem">
                        <span class="subitem-name">Small</span>
                        <div class="subitem-price"><span>Rs. soon</span></div>
                    </div>
                    <div class="menu-subitem">
                        <span class="subitem-name">Large</span>
                        <input type="hidden" id="ItemPrice" value="1100">
                    </div>
                </div>
            </div>"#,
        ),
    );
    mount_detail(&server, "/restaurant/pizzeria", detail).await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage(), Stage::PriceParse);

    let meal = &result.restaurants[0].menu[0];
    assert_eq!(meal.servings.len(), 1);
    assert_eq!(meal.servings[0].kind, "Large");
    assert_eq!(meal.servings[0].price, 1100);
}

#[tokio::test]
async fn failed_listing_page_is_isolated_from_other_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/karachi/delivery"))
        .and(query_param("Search_PageNo", "0"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_listing(
        &server,
        1,
        listing_page(&card("/restaurant/survivor", "Survivor", "4")),
    )
    .await;
    mount_detail(
        &server,
        "/restaurant/survivor",
        "<html><body></body></html>".to_string(),
    )
    .await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 2))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert_eq!(result.restaurants.len(), 1);
    assert_eq!(result.restaurants[0].title, "Survivor");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        CrawlError::ListingFetch { page: 0, .. }
    ));
}

#[tokio::test]
async fn empty_listing_page_contributes_nothing() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page("")).await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert!(result.restaurants.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn stream_mode_delivers_everything_before_done() {
    use tokio::sync::{mpsc, oneshot};

    let server = MockServer::start().await;

    // Two cards; one carries an unparsable rating, so the run produces
    // exactly 2 restaurants and 1 error.
    let cards = format!(
        "{}{}",
        card("/restaurant/good", "Good", "4"),
        card("/restaurant/odd", "Odd", "many"),
    );
    mount_listing(&server, 0, listing_page(&cards)).await;
    mount_detail(&server, "/restaurant/good", "<html><body></body></html>".to_string()).await;
    mount_detail(&server, "/restaurant/odd", "<html><body></body></html>".to_string()).await;

    let (item_tx, mut item_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = oneshot::channel();

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 1))
        .stream()
        .item_channel(item_tx)
        .error_channel(error_tx)
        .done_channel(done_tx)
        .build()
        .unwrap();

    let run = tokio::spawn(crawler.run());

    // The completion signal must arrive, and strictly after all data
    done_rx.await.expect("done signal");

    let mut restaurants = Vec::new();
    while let Ok(restaurant) = item_rx.try_recv() {
        restaurants.push(restaurant);
    }
    let mut errors = Vec::new();
    while let Ok(error) = error_rx.try_recv() {
        errors.push(error);
    }

    assert_eq!(restaurants.len(), 2);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage(), Stage::RatingParse);

    // Nothing arrives after completion; the channels are closed.
    assert!(item_rx.try_recv().is_err());
    assert!(error_rx.try_recv().is_err());

    // The blocking contract still holds: run() has finished too, and in
    // stream mode its own collections are empty.
    let result = run.await.unwrap();
    assert!(result.restaurants.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn zero_pages_returns_immediately() {
    let server = MockServer::start().await;

    let crawler = CrawlerBuilder::new(test_config(&server.uri(), 0))
        .build()
        .unwrap();
    let result = crawler.run().await;

    assert!(result.restaurants.is_empty());
    assert!(result.errors.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
