#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the `accident_dash` binary.
//!
//! Reading a full accident export takes a while, so the CLI shows a row
//! counter through [`IndicatifProgress`]. [`init_logger`] routes log lines
//! around that counter so the two never interleave on screen.

use std::sync::Arc;
use std::time::Duration;

use accident_dash_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Draws a dataset load as a terminal row counter.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Used once a row cap gives the load a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// A spinner that counts rows read under `message`.
    ///
    /// Unlimited loads have no known end, so they stay a spinner. A load
    /// with a row cap reports it through [`ProgressCallback::set_total`],
    /// and the spinner turns into a bar that fills up to the cap.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {human_pos} rows")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {human_pos}/{human_len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger`, filtered by `RUST_LOG`, behind the
/// progress display.
///
/// Log lines are printed above any active row counter instead of through
/// it. Counters created with [`IndicatifProgress::rows_bar`] must be added
/// to the returned [`MultiProgress`] for this to hold.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // a logger may already be installed

    log::set_max_level(level);

    multi
}
