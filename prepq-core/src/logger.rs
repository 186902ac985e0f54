use std::time::{Duration, Instant};

use crate::connection::LogSettings;

pub(crate) const TARGET: &str = "prepq::query";

// `tracing` doesn't support dynamic levels
// https://github.com/tokio-rs/tracing/issues/372
macro_rules! tracing_dynamic_enabled {
    (target: $target:expr, $level:expr) => {{
        use ::tracing::Level;

        match $level {
            Level::ERROR => ::tracing::enabled!(target: $target, Level::ERROR),
            Level::WARN => ::tracing::enabled!(target: $target, Level::WARN),
            Level::INFO => ::tracing::enabled!(target: $target, Level::INFO),
            Level::DEBUG => ::tracing::enabled!(target: $target, Level::DEBUG),
            Level::TRACE => ::tracing::enabled!(target: $target, Level::TRACE),
        }
    }};
}

macro_rules! tracing_dynamic_event {
    (target: $target:expr, $level:expr, $($args:tt)*) => {{
        use ::tracing::Level;

        match $level {
            Level::ERROR => ::tracing::event!(target: $target, Level::ERROR, $($args)*),
            Level::WARN => ::tracing::event!(target: $target, Level::WARN, $($args)*),
            Level::INFO => ::tracing::event!(target: $target, Level::INFO, $($args)*),
            Level::DEBUG => ::tracing::event!(target: $target, Level::DEBUG, $($args)*),
            Level::TRACE => ::tracing::event!(target: $target, Level::TRACE, $($args)*),
        }
    }};
}

fn level_filter_to_levels(filter: log::LevelFilter) -> Option<(tracing::Level, log::Level)> {
    let tracing_level = match filter {
        log::LevelFilter::Error => Some(tracing::Level::ERROR),
        log::LevelFilter::Warn => Some(tracing::Level::WARN),
        log::LevelFilter::Info => Some(tracing::Level::INFO),
        log::LevelFilter::Debug => Some(tracing::Level::DEBUG),
        log::LevelFilter::Trace => Some(tracing::Level::TRACE),
        log::LevelFilter::Off => None,
    };

    tracing_level.zip(filter.to_level())
}

/// Logs one execution of a statement when dropped.
pub struct QueryLogger<'q> {
    sql: &'q str,
    params: usize,
    rows_returned: u64,
    failed: bool,
    start: Instant,
    settings: &'q LogSettings,
}

impl<'q> QueryLogger<'q> {
    pub fn new(sql: &'q str, params: usize, settings: &'q LogSettings) -> Self {
        Self {
            sql,
            params,
            rows_returned: 0,
            failed: false,
            start: Instant::now(),
            settings,
        }
    }

    pub fn set_rows_returned(&mut self, n: usize) {
        self.rows_returned = u64::try_from(n).unwrap_or(u64::MAX);
    }

    pub fn set_failed(&mut self) {
        self.failed = true;
    }

    pub fn finish(&self) {
        let elapsed = self.start.elapsed();

        let (lvl, was_slow) = self.level(elapsed);

        let Some((tracing_level, log_level)) = level_filter_to_levels(lvl) else {
            return;
        };

        // The enabled level could be set from either tracing world or log world, so check both
        // to see if logging should be enabled for our level
        let log_is_enabled = log::log_enabled!(target: TARGET, log_level)
            || tracing_dynamic_enabled!(target: TARGET, tracing_level);

        if !log_is_enabled {
            return;
        }

        let mut summary = parse_query_summary(self.sql);

        let sql = if summary != self.sql {
            summary.push_str(" …");
            format!("\n\n{}\n", self.sql)
        } else {
            String::new()
        };

        if was_slow {
            tracing_dynamic_event!(
                target: TARGET,
                tracing_level,
                summary,
                db.statement = sql,
                params = self.params,
                rows_returned = self.rows_returned,
                failed = self.failed,
                ?elapsed,
                elapsed_secs = elapsed.as_secs_f64(),
                slow_threshold = ?self.settings.slow_statements_duration,
                "slow statement: execution time exceeded alert threshold"
            );
        } else {
            tracing_dynamic_event!(
                target: TARGET,
                tracing_level,
                summary,
                db.statement = sql,
                params = self.params,
                rows_returned = self.rows_returned,
                failed = self.failed,
                ?elapsed,
                elapsed_secs = elapsed.as_secs_f64(),
            );
        }
    }
}

impl QueryLogger<'_> {
    // an execution at or above the threshold is logged at the slow-statement level
    fn level(&self, elapsed: Duration) -> (log::LevelFilter, bool) {
        if elapsed >= self.settings.slow_statements_duration {
            (self.settings.slow_statements_level, true)
        } else {
            (self.settings.statements_level, false)
        }
    }
}

impl Drop for QueryLogger<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// The first four words of `sql`.
pub fn parse_query_summary(sql: &str) -> String {
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
