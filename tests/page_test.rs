//! Page driver tests: front matter, page identity, status and review items.

#![allow(clippy::expect_used)]

use content_migrate::validate::BuiltinValidator;
use content_migrate::{migrate_page, migrate_page_with, Block, Options, Status};

fn migrate(path: &str, source: &str) -> content_migrate::MigrationResult {
    migrate_page(path, source, &Options::default())
}

#[test]
fn markdown_post_with_front_matter_is_converted() {
    let source = "---\nlayout: post\ntitle: Team news\ndate: 2021-03-04\ndescription: Latest updates\n---\nWelcome to the **team**.\n";
    let result = migrate("_posts/2021-03-04-team-news.md", source);

    assert_eq!(result.status, Status::Converted, "{:?}", result.review_items);
    assert_eq!(result.title, "Team news");
    assert_eq!(result.permalink, "/team-news/");
    assert!(result.review_items.is_empty());

    let page = result.content.expect("converted page has content");
    assert_eq!(page.version, "1.0.0");
    assert_eq!(page.layout, "content");
    let meta = page.meta.expect("meta from front matter");
    assert_eq!(meta.date.as_deref(), Some("2021-03-04"));
    assert_eq!(meta.description.as_deref(), Some("Latest updates"));
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].type_name(), "prose");
}

#[test]
fn front_matter_permalink_wins_over_file_name() {
    let source = "---\ntitle: About\npermalink: about-us/\n---\nHello\n";
    let result = migrate("about.md", source);
    assert_eq!(result.permalink, "/about-us/");
}

#[test]
fn html_page_takes_title_from_h1_and_date_from_file_name() {
    let result = migrate("2021-03-04-team-news.html", "<h1>Our team</h1><p>Hello</p>");
    assert_eq!(result.status, Status::Converted, "{:?}", result.review_items);
    assert_eq!(result.title, "Our team");
    assert_eq!(result.permalink, "/team-news/");
    let page = result.content.expect("content");
    assert_eq!(page.meta.and_then(|m| m.date).as_deref(), Some("2021-03-04"));
}

#[test]
fn index_page_maps_to_root() {
    let result = migrate("index.md", "Welcome\n");
    assert_eq!(result.permalink, "/");
    assert_eq!(result.title, "Index");
}

#[test]
fn unsupported_layout_is_not_converted() {
    let result = migrate("old-page.md", "---\nlayout: redirect\n---\nMoved.\n");
    assert_eq!(result.status, Status::NotConverted);
    assert_eq!(result.title, "Old page");
    assert_eq!(result.permalink, "/old-page/");
    assert_eq!(result.review_items, vec!["Unsupported layout: redirect".to_string()]);
    assert!(result.content.is_none());
}

#[test]
fn unsupported_format_is_not_converted() {
    let result = migrate("notes.txt", "Hello");
    assert_eq!(result.status, Status::NotConverted);
    assert!(result.review_items[0].starts_with("Unsupported source format"));
}

#[test]
fn broken_front_matter_is_not_converted() {
    let result = migrate("page.md", "---\ntitle: never closed\n");
    assert_eq!(result.status, Status::NotConverted);
    assert!(result.review_items[0].starts_with("Invalid front matter"));
}

#[test]
fn empty_body_is_not_converted() {
    let result = migrate("empty.md", "---\ntitle: Empty\n---\n\n");
    assert_eq!(result.status, Status::NotConverted);
    assert_eq!(result.review_items, vec!["No convertible content found".to_string()]);
}

#[test]
fn missing_alt_needs_manual_review() {
    let result = migrate("gallery.html", r#"<p>Photos</p><img src="a.png">"#);
    assert_eq!(result.status, Status::ManualReview);
    assert_eq!(result.review_items, vec!["1 image(s) need alt text".to_string()]);
    assert!(result.content.is_some());
}

#[test]
fn accordion_in_source_needs_manual_review() {
    let result = migrate(
        "faq.html",
        "<details><summary>Question</summary><p>Answer</p></details>",
    );
    assert_eq!(result.status, Status::ManualReview);
    assert_eq!(result.review_items, vec!["accordions were flattened into headings".to_string()]);
}

#[test]
fn alt_generator_fills_missing_alt() {
    let options = Options::default();
    let generator = |src: &str| Some(format!("Photo {src}"));
    let result = migrate_page_with(
        "a.html",
        r#"<img src="a.png">"#,
        &options,
        &generator,
        &BuiltinValidator::from_options(&options),
    );
    assert_eq!(result.status, Status::Converted, "{:?}", result.review_items);
    let page = result.content.expect("content");
    assert_eq!(
        page.content,
        vec![Block::Image { src: "a.png".to_string(), alt: "Photo a.png".to_string() }]
    );
}

#[test]
fn result_serializes_with_page_document() {
    let result = migrate("about.md", "---\ntitle: About\n---\nHello\n");
    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["status"], "converted");
    assert_eq!(json["content"]["page"]["title"], "About");
    assert_eq!(json["content"]["page"]["permalink"], "/about/");
    assert_eq!(json["content"]["content"][0]["type"], "prose");
    assert!(json.get("reviewItems").is_none());
}
