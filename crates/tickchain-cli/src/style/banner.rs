//! Banner lines for tickchain.

use super::colors::SemanticStyle;

/// Prints the run banner.
pub fn print_banner(version: &str) {
    println!();
    println!(
        "  {} {} {}",
        "◷".info(),
        "tickchain".header(),
        format!("v{version}").muted()
    );
    println!("  {}", "Tamper-evident clock cadence sessions".muted());
    println!();
}
