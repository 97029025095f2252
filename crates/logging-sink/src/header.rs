//! crates/logging-sink/src/header.rs
//! Fixed-format line prefix rendering.

use std::io::Write;

use time::OffsetDateTime;

use crate::Severity;

/// Appends the header for one log line to `buf`.
///
/// Lines have the form:
///
/// ```text
/// Lmmdd hh:mm:ss.uuuuuu file:line] msg...
/// ```
///
/// `L` is the severity character, the date and time fields are zero padded
/// and the fractional seconds carry microsecond precision. `file` is written
/// as given; callers pass the basename.
pub fn render_header(
    buf: &mut Vec<u8>,
    severity: Severity,
    now: OffsetDateTime,
    file: &str,
    line: u32,
) {
    // Writing into a Vec<u8> cannot fail.
    let _ = write!(
        buf,
        "{}{:02}{:02} {:02}:{:02}:{:02}.{:06} {}:{}] ",
        severity.as_char(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.microsecond(),
        file,
        line,
    );
}

/// Returns the final path component of `path`, accepting both separators.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn header(severity: Severity, now: OffsetDateTime, file: &str, line: u32) -> String {
        let mut buf = Vec::new();
        render_header(&mut buf, severity, now, file, line);
        String::from_utf8(buf).expect("header is ascii")
    }

    #[test]
    fn header_zero_pads_every_field() {
        let rendered = header(
            Severity::Info,
            datetime!(2023-01-02 03:04:05.000006 UTC),
            "a.rs",
            7,
        );
        assert_eq!(rendered, "I0102 03:04:05.000006 a.rs:7] ");
    }

    #[test]
    fn header_truncates_to_microseconds() {
        let rendered = header(
            Severity::Fatal,
            datetime!(2023-12-31 23:59:59.123456789 UTC),
            "main.rs",
            1234,
        );
        assert_eq!(rendered, "F1231 23:59:59.123456 main.rs:1234] ");
    }

    #[test]
    fn header_appends_to_existing_buffer() {
        let mut buf = b"prefix:".to_vec();
        render_header(
            &mut buf,
            Severity::Error,
            datetime!(2020-06-15 12:00:00 UTC),
            "x.rs",
            1,
        );
        assert!(buf.starts_with(b"prefix:E0615 12:00:00.000000 x.rs:1] "));
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!(basename("crates/logging/src/lib.rs"), "lib.rs");
        assert_eq!(basename(r"src\win\path.rs"), "path.rs");
        assert_eq!(basename("plain.rs"), "plain.rs");
        assert_eq!(basename(""), "");
    }
}
