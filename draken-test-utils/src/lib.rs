//! Tracing setup shared by the Draken test binaries.
//!
//! The vector bridge and the string builder emit `tracing` events on their
//! slow paths (import fallbacks, buffer growth, morsel assembly). This
//! crate turns those on for test runs without every suite carrying its own
//! subscriber boilerplate: by default the Draken crates log at `debug`
//! while dependencies stay at `warn`, and `RUST_LOG` overrides the whole
//! filter when set.

use std::sync::Once;

/// Filter used when `RUST_LOG` is absent: quiet dependencies, verbose
/// Draken crates.
const DEFAULT_FILTER: &str =
    "warn,draken=debug,draken_vector=debug,draken_morsel=debug,draken_ops=debug";

static INIT: Once = Once::new();

/// Install the test subscriber. Idempotent, so suites that also call it
/// directly coexist with the `auto-init` feature.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_test_writer()
            .init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    // Linking this crate is enough to get logging in a test binary; the
    // constructor runs before any #[test] does.
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}
