//! Verify command - replays the stamp chain of an exported file.

use std::path::Path;

use anyhow::{Result, bail};
use tickchain::{ChainIntegrityError, Error};

use crate::style::colors::SemanticStyle;
use crate::style::{create_spinner, finish_and_clear, print_labeled, print_spacer};

pub fn run(path: &str) -> Result<()> {
    let file = Path::new(path);

    let sp = create_spinner(&format!("Verifying {}...", file.display()));
    let result = tickchain::verify_file(file);
    finish_and_clear(&sp);

    match result {
        Ok(count) => {
            print_passed(file, count);
            Ok(())
        }
        Err(Error::ChainIntegrity(mismatch)) => {
            print_failed(file, &mismatch);
            bail!("verification failed at tick_index {}", mismatch.tick_index)
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", file.display()))),
    }
}

fn print_passed(file: &Path, count: usize) {
    print_spacer();
    println!("{} {}", "✓".success(), "ALL CHECKS PASSED".success());
    print_labeled("File", &file.display().to_string());
    print_labeled("Total ticks verified", &count.to_string());
}

fn print_failed(file: &Path, mismatch: &ChainIntegrityError) {
    print_spacer();
    println!("{} {}", "✗".error(), "VERIFICATION FAILED".error());
    print_labeled("File", &file.display().to_string());
    print_labeled(
        "First mismatch at tick_index",
        &mismatch.tick_index.to_string(),
    );
    print_labeled("Stored", &mismatch.stored.to_hex());
    print_labeled("Expected", &mismatch.expected.to_hex());
}
