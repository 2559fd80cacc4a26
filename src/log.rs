// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs::File;
use std::io::{Stderr, stderr};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_tree::time::UtcDateTime;

/// Where the full, unfiltered log of this process goes.
pub fn log_path() -> PathBuf {
    PathBuf::from(format!("/tmp/duplex.{}.log", std::process::id()))
}

/// Installs the global subscriber.
///
/// Stderr gets a tree of spans filtered by `RUST_LOG` (warnings and up by
/// default). Everything is also written to [`log_path`].
pub fn init_logging() -> anyhow::Result<()> {
    let path = log_path();
    let logfile = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let (file_appender, file_appender_guard) = tracing_appender::non_blocking(logfile);
    let (err_appender, err_appender_guard) = tracing_appender::non_blocking(stderr());
    let original_hook = std::panic::take_hook();
    tracing_subscriber::registry()
        .with(tree_layer().with_writer(err_appender).with_filter(stderr_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(file_appender).with_ansi(false))
        .try_init()?;

    let appender_guards = Mutex::new(Some((file_appender_guard, err_appender_guard)));
    std::panic::set_hook(Box::new(move |info| {
        // Release builds abort on panic, so flush the appenders first.
        if let Ok(mut guards) = appender_guards.try_lock() {
            guards.take();
        }
        original_hook(info);
    }));
    Ok(())
}

fn stderr_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
}

pub fn tree_layer() -> tracing_tree::HierarchicalLayer<fn() -> Stderr, UtcDateTime> {
    tracing_tree::HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_deferred_spans(true)
        .with_span_retrace(true)
        .with_targets(true)
        .with_timer(UtcDateTime::default())
}
