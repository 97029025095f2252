//! crates/logging/src/macros.rs
//! Emission macros targeting the process-wide instance.
//!
//! The unformatted macros accept any mix of [`Display`](std::fmt::Display)
//! values and [`Data`](crate::Data) tags; printable values are joined by
//! single spaces. The `f`-suffixed macros take a format literal followed by
//! its arguments, as [`format!`] does.

/// Emits an `INFO` line.
///
/// ```
/// logging::info!("served", 3, "requests", logging::data("client-7"));
/// ```
#[macro_export]
macro_rules! info {
    ($($arg:expr),* $(,)?) => {
        $crate::global().print($crate::Severity::Info, &[$($crate::IntoArg::into_arg(&$arg)),*])
    };
}

/// Emits a `WARNING` line.
#[macro_export]
macro_rules! warning {
    ($($arg:expr),* $(,)?) => {
        $crate::global().print($crate::Severity::Warning, &[$($crate::IntoArg::into_arg(&$arg)),*])
    };
}

/// Emits an `ERROR` line.
#[macro_export]
macro_rules! error {
    ($($arg:expr),* $(,)?) => {
        $crate::global().print($crate::Severity::Error, &[$($crate::IntoArg::into_arg(&$arg)),*])
    };
}

/// Emits a `FATAL` line with a backtrace and exits with status 255.
#[macro_export]
macro_rules! fatal {
    ($($arg:expr),* $(,)?) => {
        $crate::global().fatal(&[$($crate::IntoArg::into_arg(&$arg)),*])
    };
}

/// Emits a `FATAL` line without a backtrace and exits with status 1.
#[macro_export]
macro_rules! exit {
    ($($arg:expr),* $(,)?) => {
        $crate::global().exit(&[$($crate::IntoArg::into_arg(&$arg)),*])
    };
}

/// Emits a formatted `INFO` line.
///
/// ```
/// logging::infof!("copied {} of {} files", 3, 10);
/// ```
#[macro_export]
macro_rules! infof {
    ($fmt:literal $($arg:tt)*) => {
        $crate::global().printf(
            $crate::Severity::Info,
            $fmt,
            ::std::format_args!($fmt $($arg)*),
            &[],
        )
    };
}

/// Emits a formatted `WARNING` line.
#[macro_export]
macro_rules! warningf {
    ($fmt:literal $($arg:tt)*) => {
        $crate::global().printf(
            $crate::Severity::Warning,
            $fmt,
            ::std::format_args!($fmt $($arg)*),
            &[],
        )
    };
}

/// Emits a formatted `ERROR` line.
#[macro_export]
macro_rules! errorf {
    ($fmt:literal $($arg:tt)*) => {
        $crate::global().printf(
            $crate::Severity::Error,
            $fmt,
            ::std::format_args!($fmt $($arg)*),
            &[],
        )
    };
}

/// Emits a formatted `FATAL` line with a backtrace and exits with status 255.
#[macro_export]
macro_rules! fatalf {
    ($fmt:literal $($arg:tt)*) => {
        $crate::global().fatalf(::std::format_args!($fmt $($arg)*))
    };
}

/// Emits a formatted `FATAL` line without a backtrace and exits with status 1.
#[macro_export]
macro_rules! exitf {
    ($fmt:literal $($arg:tt)*) => {
        $crate::global().exitf(::std::format_args!($fmt $($arg)*))
    };
}

/// Emits an `INFO` line if verbosity `level` is enabled at this statement.
///
/// Arguments are not evaluated when the level is disabled.
///
/// ```
/// logging::vinfo!(2, "cache miss for", "user:42");
/// ```
#[macro_export]
macro_rules! vinfo {
    ($level:expr, $($arg:expr),* $(,)?) => {{
        let verbose = $crate::v($level);
        if verbose.enabled() {
            verbose.info(&[$($crate::IntoArg::into_arg(&$arg)),*]);
        }
    }};
}

/// Emits a formatted `INFO` line if verbosity `level` is enabled at this
/// statement.
///
/// ```
/// logging::vinfof!(1, "retrying in {}ms", 250);
/// ```
#[macro_export]
macro_rules! vinfof {
    ($level:expr, $fmt:literal $($arg:tt)*) => {{
        let verbose = $crate::v($level);
        if verbose.enabled() {
            verbose.infof($fmt, ::std::format_args!($fmt $($arg)*));
        }
    }};
}
