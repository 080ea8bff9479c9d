//! Review flags collected from converted pages.

use content_migrate::page::{PageDocument, PageInfo};
use content_migrate::review::review;
use content_migrate::validate::BuiltinValidator;
use content_migrate::{convert_html, Block, Flag, Options};

fn page(title: &str, content: Vec<Block>) -> PageDocument {
    PageDocument {
        version: "1.0.0".to_string(),
        layout: "content".to_string(),
        page: PageInfo {
            title: title.to_string(),
            permalink: "/p/".to_string(),
        },
        content,
        meta: None,
    }
}

fn flags_for(html: &str) -> Vec<Flag> {
    let options = Options::default();
    let page = page("Page", convert_html(html, &options));
    review(&page, html, &BuiltinValidator::default(), &options).flags
}

#[test]
fn table_images_and_tables_are_flagged() {
    let flags = flags_for(r#"<table><tr><th>Room</th></tr><tr><td><img src="/r.png"></td></tr></table>"#);
    assert_eq!(flags, vec![Flag::TableImages { count: 1 }, Flag::Tables { count: 1 }]);
}

#[test]
fn nested_headings_in_tables_pass_validation() {
    let flags = flags_for(r#"<table><tr><th>Head</th></tr><tr><td><h1>Big</h1><p class="lead">x</p></td></tr></table>"#);
    assert_eq!(flags, vec![Flag::Tables { count: 1 }]);
}

#[test]
fn slide_decks_are_flagged() {
    let flags = flags_for(r#"<iframe src="https://docs.google.com/presentation/d/1/embed"></iframe>"#);
    assert_eq!(flags, vec![Flag::Slides { count: 1 }]);
}

#[test]
fn overlong_alt_is_flagged() {
    let alt = "a".repeat(130);
    let flags = flags_for(&format!(r#"<img src="a.png" alt="{alt}">"#));
    assert_eq!(flags, vec![Flag::OverlongAlt { count: 1 }]);
}

#[test]
fn untrusted_iframes_are_flagged_and_form_hosts_are_not() {
    let flags = flags_for(
        r#"<iframe src="https://widgets.example.com/x"></iframe>
           <iframe src="https://forms.office.com/r/abc"></iframe>"#,
    );
    assert_eq!(flags, vec![Flag::UntrustedIframes { count: 1 }]);
}

#[test]
fn flags_keep_their_fixed_order() {
    let flags = flags_for(
        r#"<div class="accordion"><details><summary>Q</summary><p>A</p></details></div>
           <blockquote class="instagram-media" data-instgrm-permalink="https://instagram.com/p/1"></blockquote>
           <img src="a.png">"#,
    );
    assert_eq!(
        flags,
        vec![Flag::MissingAlt { count: 1 }, Flag::Accordions, Flag::Social { count: 1 }]
    );
}

#[test]
fn validation_errors_become_the_last_flag() {
    let options = Options::default();
    let page = page(" ", convert_html("<p>Hello</p>", &options));
    let result = review(&page, "<p>Hello</p>", &BuiltinValidator::default(), &options);
    assert!(!result.is_valid);
    assert_eq!(result.items(), vec!["schema validation failed: page.title: required".to_string()]);
}

#[test]
fn clean_page_needs_no_review() {
    let options = Options::default();
    let page = page("Page", convert_html("<h2>Hi</h2><p>Hello</p>", &options));
    let result = review(&page, "", &BuiltinValidator::default(), &options);
    assert!(result.is_valid);
    assert!(!result.needs_review());
}
