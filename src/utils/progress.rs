//! Build progress reporting. Without the `progress` feature every bar is a no-op.

use std::time::Duration;

#[cfg(feature = "progress")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progress"))]
pub use self::quiet::*;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Ticking spinner for phases of unknown length, `None` when silent
pub fn spinner(message: &'static str, silent: bool) -> Option<ProgressBar> {
    if silent {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}

/// Bar over `len` pages, `None` when silent
pub fn page_bar(len: u64, silent: bool) -> Option<ProgressBar> {
    if silent {
        return None;
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
    bar.set_message("Parsing pages...");
    Some(bar)
}

/// Stand-ins for the indicatif types used by [`spinner`] and [`page_bar`], so
/// the build pipeline calls the same methods whether or not bars are compiled in.
/// Only the methods the pipeline touches exist here.
#[cfg(not(feature = "progress"))]
mod quiet {
    use std::borrow::Cow;
    use std::time::Duration;

    /// Page counter that draws nothing
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_pages: u64) -> Self {
            ProgressBar
        }

        pub fn new_spinner() -> Self {
            ProgressBar
        }

        pub fn set_style(&self, _style: ProgressStyle) {}
        pub fn set_message(&self, _msg: impl Into<Cow<'static, str>>) {}
        pub fn enable_steady_tick(&self, _interval: Duration) {}
        pub fn inc(&self, _pages: u64) {}
        pub fn finish_with_message(&self, _msg: impl Into<Cow<'static, str>>) {}
        pub fn finish_and_clear(&self) {}
    }

    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_spinner() -> Self {
            ProgressStyle
        }

        pub fn default_bar() -> Self {
            ProgressStyle
        }

        /// Templates are never rendered, so any string is accepted
        pub fn template(self, _template: &str) -> Result<Self, std::convert::Infallible> {
            Ok(self)
        }

        pub fn progress_chars(self, _chars: &str) -> Self {
            self
        }
    }
}
