//! # Invariant Registry
//!
//! Runtime checks over the bytes we hand to the resource compiler. Every check that
//! passes is recorded, so tests can confirm the converter actually enforced it
//! instead of silently skipping it.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use lazy_static::lazy_static;
use log::{error, trace};

pub const STARTS_WITH_BOM: &str = "UTF-16LE output must start with the FF FE byte-order mark";
pub const LENGTH_MATCHES_CODE_UNITS: &str = "UTF-16LE output length must be 2 + 2 * code units";
pub const ROUND_TRIPS: &str = "UTF-16LE output must decode back to the source text";

lazy_static! {
    /// Descriptions of every invariant that has held at least once in this process.
    static ref CHECKED_INVARIANTS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

/// A panic elsewhere must not switch the registry off, so poisoning is ignored.
fn registry() -> MutexGuard<'static, HashSet<String>> {
    CHECKED_INVARIANTS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Asserts that an encoding invariant holds for the file being converted.
///
/// A violation panics in debug and test builds. Release builds log it at error level
/// and carry on, since the bytes are already on their way to disk.
///
/// # Arguments
/// * `condition` - The result of the check.
/// * `description` - Which invariant this is (use one of the constants above).
/// * `source` - The script being converted, named in the violation message.
pub fn assert_invariant(condition: bool, description: &str, source: &Path) {
    if condition {
        trace!("invariant held for {:?}: {}", source, description);
        registry().insert(description.to_string());
        return;
    }

    let msg = format!("encoding invariant broken while converting {}: {}", source.display(), description);
    error!("{}", msg);
    if cfg!(debug_assertions) || cfg!(test) {
        panic!("{}", msg);
    }
}

/// Panics unless every listed invariant was asserted (and held) at least once.
#[cfg(test)]
pub fn contract_test(context: &str, required_invariants: &[&str]) {
    let missing: Vec<&str> = {
        let checked = registry();
        required_invariants
            .iter()
            .copied()
            .filter(|req| !checked.contains(*req))
            .collect()
    };

    if !missing.is_empty() {
        panic!(
            "Contract test failed for '{}'. These invariants were never checked:\n{:#?}",
            context, missing
        );
    }
}
