//! crates/logging/src/arg.rs
//! Heterogeneous arguments accepted by the emission entry points.

use std::fmt::{self, Write as _};

use crate::event::Data;

/// One argument of an emission: printed text or a tagged value.
#[derive(Clone)]
pub enum Arg<'a> {
    /// Rendered into the message body.
    Text(&'a dyn fmt::Display),
    /// Attached to the event and omitted from the body.
    Data(Data),
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.to_string()).finish(),
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
        }
    }
}

/// Conversion used by the logging macros to accept any displayable value or
/// a [`Data`] tag in the same argument list.
pub trait IntoArg<'a> {
    /// Performs the conversion.
    fn into_arg(self) -> Arg<'a>;
}

impl<'a, T: fmt::Display> IntoArg<'a> for &'a T {
    fn into_arg(self) -> Arg<'a> {
        Arg::Text(self)
    }
}

impl<'a> IntoArg<'a> for &'a Data {
    fn into_arg(self) -> Arg<'a> {
        Arg::Data(self.clone())
    }
}

impl<'a> IntoArg<'a> for &Arg<'a> {
    fn into_arg(self) -> Arg<'a> {
        self.clone()
    }
}

impl<'a> IntoArg<'a> for Arg<'a> {
    fn into_arg(self) -> Arg<'a> {
        self
    }
}

/// Separates printable arguments from tagged values, preserving the order of
/// each.
#[must_use]
pub fn split_data<'a>(args: &[Arg<'a>]) -> (Vec<&'a dyn fmt::Display>, Vec<Data>) {
    let mut text = Vec::with_capacity(args.len());
    let mut data = Vec::new();
    for arg in args {
        match arg {
            Arg::Text(value) => text.push(*value),
            Arg::Data(value) => data.push(value.clone()),
        }
    }
    (text, data)
}

/// Renders printable arguments separated by single spaces.
pub(crate) fn render_text(text: &[&dyn fmt::Display]) -> String {
    let mut body = String::new();
    for (i, value) in text.iter().enumerate() {
        if i > 0 {
            body.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(body, "{value}");
    }
    body
}
