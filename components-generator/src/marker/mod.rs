//! Insertion marker lexer
//!
//! Theme sources mark the spots where a component should be pulled in with an
//! HTML comment:
//!
//! ```text
//! <!-- components/header/site-branding.php -->
//! ```
//!
//! The opening must be exactly `<!-- components/`, followed by a path of one
//! or more non-whitespace characters, at least one whitespace character and
//! `-->`. Whitespace means ASCII whitespace (space, tab, CR, LF, FF, VT), the
//! `\s` class of a byte-oriented regex. Anything else (for example `<!-- components/ -->`) is plain text.
//!
//! [`rewrite`] walks the source once, replacing every marker either with the
//! include directive returned by the caller or, when the caller declines, by
//! stripping the marker together with the whitespace around it.

use std::fmt;

const OPEN: &str = "<!-- components/";
const CLOSE: &str = "-->";
const COMPONENT_EXT: &str = ".php";

/// A marker found in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Full marker text, `<!--` through `-->`
    pub text: &'a str,
    /// Referenced path, relative to `components/`
    pub path: &'a str,
}

impl Marker<'_> {
    /// The referenced path with repeated slashes collapsed
    ///
    /// Slashes directly after `components/` are dropped, so
    /// `<!-- components//header.php -->` refers to `header.php`.
    #[must_use]
    pub fn normalized_path(&self) -> String {
        normalize_path(self.path.trim_start_matches('/'))
    }

    /// Include directive that the marker stands for
    #[must_use]
    pub fn directive(&self) -> IncludeDirective {
        IncludeDirective::for_component(&self.normalized_path())
    }
}

/// A lexed span of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text copied through unchanged
    Literal(&'a str),
    /// An insertion marker
    Marker(Marker<'a>),
}

/// Single-pass tokenizer over source text
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    pending: Option<Marker<'a>>,
}

impl<'a> Lexer<'a> {
    /// Start lexing `source`
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            pending: None,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(marker) = self.pending.take() {
            self.pos += marker.text.len();
            return Some(Token::Marker(marker));
        }
        if self.pos >= self.source.len() {
            return None;
        }

        let start = self.pos;
        let mut search = start;
        while let Some(offset) = self.source[search..].find(OPEN) {
            let candidate = search + offset;
            if let Some(marker) = match_marker(&self.source[candidate..]) {
                if candidate == start {
                    self.pos += marker.text.len();
                    return Some(Token::Marker(marker));
                }
                self.pending = Some(marker);
                self.pos = candidate;
                return Some(Token::Literal(&self.source[start..candidate]));
            }
            search = candidate + 1;
        }

        self.pos = self.source.len();
        Some(Token::Literal(&self.source[start..]))
    }
}

/// Match a marker at the very start of `input`
fn match_marker(input: &str) -> Option<Marker<'_>> {
    let rest = input.strip_prefix(OPEN)?;

    let path_len = rest.find(is_space).unwrap_or(rest.len());
    if path_len == 0 {
        return None;
    }
    let after_path = &rest[path_len..];

    let gap = after_path.len() - after_path.trim_start_matches(is_space).len();
    if gap == 0 || !after_path[gap..].starts_with(CLOSE) {
        return None;
    }

    let len = OPEN.len() + path_len + gap + CLOSE.len();
    Some(Marker {
        text: &input[..len],
        path: &rest[..path_len],
    })
}

/// A generated `get_template_part()` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Slug below `components/`, empty for the root
    pub namespace: String,
    /// Part name
    pub name: String,
}

impl IncludeDirective {
    /// Directive for a component path relative to `components/`
    ///
    /// The file stem is split on its first hyphen: `buttons/button-primary.php`
    /// becomes namespace `buttons/button`, name `primary`, while a hyphen-free
    /// stem such as `header.php` keeps its directory as the namespace.
    #[must_use]
    pub fn for_component(path: &str) -> Self {
        let (dir, file) = path.rsplit_once('/').unwrap_or(("", path));
        let stem = file.strip_suffix(COMPONENT_EXT).unwrap_or(file);

        match stem.split_once('-') {
            None => Self {
                namespace: dir.to_string(),
                name: stem.to_string(),
            },
            Some((head, tail)) => Self {
                namespace: if dir.is_empty() {
                    head.to_string()
                } else {
                    format!("{dir}/{head}")
                },
                name: tail.to_string(),
            },
        }
    }

    /// Template slug passed as the first argument
    #[must_use]
    pub fn slug(&self) -> String {
        if self.namespace.is_empty() {
            "components".to_string()
        } else {
            format!("components/{}", self.namespace)
        }
    }
}

impl fmt::Display for IncludeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<?php get_template_part( '{}', '{}' ); ?>",
            self.slug(),
            self.name
        )
    }
}

/// Result of rewriting one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten<T = String> {
    /// New source text
    pub text: T,
    /// Markers replaced with a directive
    pub resolved: usize,
    /// Markers removed
    pub stripped: usize,
}

/// Rewrite every marker in `source`
///
/// `resolve` returns the replacement for a marker, or `None` to strip it.
/// A stripped marker takes the whitespace before it with it. If the
/// whitespace after it contains a newline, that run is consumed through its
/// last newline and a single `\n` is left in place. Otherwise only the
/// spaces and tabs before the marker on the same line go.
///
/// Stripped markers on consecutive lines share that single `\n`:
/// `"a\n<!-- components/x.php -->\n<!-- components/y.php -->\nb"` becomes
/// `"a\nb"`, where a regex substitution run per marker would leave `"a\n\nb"`.
pub fn rewrite<F>(source: &str, mut resolve: F) -> Rewritten
where
    F: FnMut(&Marker<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(source.len());
    let mut resolved = 0;
    let mut stripped = 0;
    let mut cursor = 0;
    let mut skip_leading_ws = false;

    for token in Lexer::new(source) {
        match token {
            Token::Literal(text) => {
                cursor += text.len();
                if skip_leading_ws {
                    skip_leading_ws = false;
                    out.push_str(&consume_through_newline(text));
                } else {
                    out.push_str(text);
                }
            }
            Token::Marker(marker) => {
                cursor += marker.text.len();
                if let Some(replacement) = resolve(&marker) {
                    out.push_str(&replacement);
                    resolved += 1;
                    continue;
                }

                stripped += 1;
                let newline_follows = source[cursor..]
                    .chars()
                    .take_while(|c| is_space(*c))
                    .any(|c| c == '\n');
                if newline_follows {
                    out.truncate(out.trim_end_matches(is_space).len());
                    skip_leading_ws = true;
                } else {
                    out.truncate(out.trim_end_matches([' ', '\t']).len());
                }
            }
        }
    }

    Rewritten {
        text: out,
        resolved,
        stripped,
    }
}

/// Rewrite a source that is not necessarily UTF-8
///
/// UTF-8 input goes through [`rewrite`]. Anything else is read as one
/// character per byte, so every byte outside a rewritten marker is written
/// back unchanged.
pub fn rewrite_bytes<F>(source: &[u8], resolve: F) -> Rewritten<Vec<u8>>
where
    F: FnMut(&Marker<'_>) -> Option<String>,
{
    if let Ok(text) = std::str::from_utf8(source) {
        let out = rewrite(text, resolve);
        return Rewritten {
            text: out.text.into_bytes(),
            resolved: out.resolved,
            stripped: out.stripped,
        };
    }

    let widened: String = source.iter().copied().map(char::from).collect();
    let out = rewrite(&widened, resolve);

    Rewritten {
        text: out.text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect(),
        resolved: out.resolved,
        stripped: out.stripped,
    }
}

const fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

/// Drop the leading whitespace of `text` through its last newline and put
/// one `\n` back
fn consume_through_newline(text: &str) -> String {
    let ws_len = text.len() - text.trim_start_matches(is_space).len();
    let leading = &text[..ws_len];
    match leading.rfind('\n') {
        Some(idx) => format!("\n{}", &text[idx + 1..]),
        None => text.to_string(),
    }
}

/// Collapse runs of `/` into one
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}
