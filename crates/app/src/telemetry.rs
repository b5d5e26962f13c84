//! Tracing setup for the binary.
//!
//! - `QUIZ_LOG` holds the filter (e.g. `debug` or `warn,services=debug`).
//! - `QUIZ_LOG_FORMAT=json` switches to structured JSON lines.
//!
//! Logs go to stderr so they never interleave with the quiz on stdout.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,services=info,storage=info";

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("QUIZ_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("QUIZ_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
