//! Simple CLI that reads a page from stdin and writes its migration result as
//! JSON to stdout. Used by batch drivers that list and persist pages.
//!
//! Usage: `migrate_stdin <source-path> < page.md`
//!
//! The path is only used for format detection and page identity. Set
//! `RUST_LOG=debug` for pipeline logging on stderr.

use content_migrate::{migrate_page, MigrationResult, Options};
use std::io::{self, Read};

fn main() {
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_default();

    let mut source = String::new();
    if io::stdin().read_to_string(&mut source).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let result: MigrationResult = migrate_page(&path, &source, &Options::default());

    println!("{}", serde_json::to_string(&result).unwrap_or_default());
}
