use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use lanroster_common::network::range::Ipv4Range;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

/// A span that renders as a spinner for as long as it is entered.
pub fn discovery_span(range: &Ipv4Range, timeout: Duration) -> Span {
    let span = info_span!(target: "lanroster::print", "discovery", indicatif.pb_show = true);
    span.pb_set_style(&style());
    span.pb_set_message(&format!(
        "Sweeping {} for {}...",
        range.to_string().green().bold(),
        format!("{:.1}s", timeout.as_secs_f64()).yellow()
    ));
    span
}
