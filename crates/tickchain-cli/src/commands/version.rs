//! Version command implementation.

use crate::style::banner::print_banner;
use crate::style::print_labeled;

/// Version information for the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

pub fn run() {
    print_banner(VERSION);
    print_labeled("Package", &format!("{NAME} {VERSION}"));
    print_labeled("Target", std::env::consts::ARCH);
    print_labeled("OS", std::env::consts::OS);
}
