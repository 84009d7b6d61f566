use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Events go to stdout as bare messages.
///
/// `RUST_LOG` takes precedence; otherwise each `-v` raises the level one step
/// from `info`.
pub fn init(verbosity: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let format = fmt::format()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::Layer::default()
                .with_ansi(std::io::stdout().is_terminal())
                .with_writer(std::io::stdout)
                .event_format(format),
        )
        .try_init()?;

    Ok(())
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
