//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `fieldlist_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("fieldlist_core ping={}", fieldlist_core::ping());
    println!("fieldlist_core version={}", fieldlist_core::core_version());
    println!(
        "fieldlist_core max_agents_per_list={}",
        fieldlist_core::MAX_AGENTS_PER_LIST
    );
}
