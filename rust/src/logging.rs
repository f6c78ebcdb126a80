//! Tracing setup for the command line tool. Progress is reported through
//! `info` events, so the subscriber prints bare messages without timestamps
//! or targets.

use tracing::Level;

/// Initialize the subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the subscriber with a specific maximum level.
///
/// A second call, or a call after a test harness installed its own
/// subscriber, leaves the existing subscriber in place.
pub fn init_with_level(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_level(level > Level::INFO)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::{init, init_with_level};
    use tracing::Level;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init();
        init_with_level(Level::DEBUG);
        tracing::info!("still logging");
    }
}
