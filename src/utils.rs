// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

pub fn setup_logging(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        // trace to stderr, stdout is left alone
        .with_writer(std::io::stderr)
        .finish();

    // Test modules each call this from their own ctor, only the first one wins
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Global tracing subscriber already set");
    }
}

/// Replaces characters that would break a quoted `Content-Disposition` filename.
///
/// Header values must be visible ASCII, so anything else is replaced too.
pub fn sanitize_filename(name: &str) -> String {
    let clean: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    if clean.is_empty() {
        "generated".to_string()
    } else {
        clean
    }
}
