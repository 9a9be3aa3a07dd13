use std::{borrow::Cow, collections::VecDeque};

/// Compiles a literal regex once, on first use
macro_rules! regex {
    ($regex:literal) => {{
        const STR: &'static str = $regex;
        static REGEX: ::once_cell::sync::Lazy<::regex::Regex> =
            ::once_cell::sync::Lazy::new(|| ::regex::Regex::new(STR).expect("Should be a valid regex"));
        &*REGEX
    }};
}
pub(crate) use regex;

/// Normalizes generated text before it is split into lines.
///
/// - `\r\n` line endings become `\n`
/// - any run of 3 or more newlines collapses into exactly two (a single blank line)
///
/// Input is borrowed back if there was nothing to change. Applying this twice is the same as applying it once.
pub fn normalize(input: &str) -> Cow<'_, str> {
    let unix = regex!(r"\r\n").replace_all(input, "\n");
    match unix {
        Cow::Borrowed(unix) => regex!(r"\n{3,}").replace_all(unix, "\n\n"),
        Cow::Owned(unix) => Cow::Owned(regex!(r"\n{3,}").replace_all(&unix, "\n\n").into_owned()),
    }
}

/// Escapes text for use in html body or attribute values
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Adapts `std::io::Write` into `std::fmt::Write`, remembering io errors that `fmt` can't carry
#[derive(Debug)]
pub struct FmtToIo<W>(W, VecDeque<std::io::Error>);
impl<W> FmtToIo<W> {
    pub fn new(io: W) -> Self
    where
        W: std::io::Write,
    {
        Self(io, VecDeque::new())
    }

    pub fn get_error(&mut self) -> Option<std::io::Error> {
        self.1.pop_front()
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}
impl<W: std::io::Write> std::fmt::Write for FmtToIo<W> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        if let Err(err) = self.0.write_all(s.as_bytes()) {
            self.1.push_back(err);
            return Err(std::fmt::Error);
        }
        Ok(())
    }
}
