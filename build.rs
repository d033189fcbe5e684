//! Build script for conservation-audit
//!
//! `sqlx::migrate!` embeds the migration files at compile time, so the crate
//! must rebuild whenever one of them changes.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
