#![forbid(unsafe_code)]

//! Command-line token model, lexer and option cursor
//!
//! Raw arguments are lexed once into an [`ArgList`]. Consumers pull tokens
//! through an [`OptionCursor`], which rewrites one-character unix flags into
//! their long names on demand using a [`UnixTable`].

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while consuming command-line tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// A flag that is not in the unix table or not understood by the command
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// An option value was expected but a flag was found
    #[error("expected {token} to be a positional value, got {kind} option")]
    ExpectedPositional { token: String, kind: &'static str },

    /// The argument list ended where a value was required
    #[error("missing value for {0}")]
    MissingValue(String),

    /// A non-repeatable option or the input was given twice
    #[error("duplicated {0}")]
    Duplicated(&'static str),

    /// A required option or the input was not given
    #[error("missing {0}")]
    Missing(&'static str),
}

/// Shape of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// One character taken from a `-abc` cluster
    Unix,
    /// The name of a `--name` flag
    Gnu,
    /// A positional or literal value
    Normal,
}

/// A single lexed command-line token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgToken {
    text: String,
    kind: ArgKind,
}

impl ArgToken {
    pub fn unix(c: char) -> Self {
        ArgToken {
            text: c.to_string(),
            kind: ArgKind::Unix,
        }
    }

    pub fn gnu(name: impl Into<String>) -> Self {
        ArgToken {
            text: name.into(),
            kind: ArgKind::Gnu,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        ArgToken {
            text: text.into(),
            kind: ArgKind::Normal,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_normal(&self) -> bool {
        self.kind == ArgKind::Normal
    }

    /// Returns the value text, or an error describing the flag shape
    pub fn into_normal_text(self) -> Result<String, ArgError> {
        match self.kind {
            ArgKind::Normal => Ok(self.text),
            ArgKind::Unix => Err(ArgError::ExpectedPositional {
                token: self.to_string(),
                kind: "unix",
            }),
            ArgKind::Gnu => Err(ArgError::ExpectedPositional {
                token: self.to_string(),
                kind: "gnu",
            }),
        }
    }
}

impl fmt::Display for ArgToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArgKind::Gnu => write!(f, "--{}", self.text),
            ArgKind::Unix => write!(f, "-{}", self.text),
            ArgKind::Normal => f.write_str(&self.text),
        }
    }
}

/// Mapping from short flag characters to long option names
#[derive(Debug, Clone, Default)]
pub struct UnixTable {
    entries: HashMap<char, &'static str>,
}

impl UnixTable {
    pub fn new(entries: &[(char, &'static str)]) -> Self {
        UnixTable {
            entries: entries.iter().copied().collect(),
        }
    }

    pub fn get(&self, c: char) -> Option<&'static str> {
        self.entries.get(&c).copied()
    }
}

/// Lexed argument sequence, immutable after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    tokens: Vec<ArgToken>,
}

impl ArgList {
    /// Lexes raw arguments into tokens
    ///
    /// Blank arguments are dropped. `-abc` yields one unix token per
    /// character, `--name` yields a gnu token, a lone `-` is a normal value
    /// and a bare `--` turns every later argument into a normal value.
    pub fn lex<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = Vec::new();
        let mut literal = false;

        for arg in raw {
            let arg = arg.as_ref();
            if arg.trim().is_empty() {
                continue;
            }

            let Some(rest) = arg.strip_prefix('-').filter(|_| !literal) else {
                tokens.push(ArgToken::normal(arg));
                continue;
            };

            if rest.is_empty() {
                tokens.push(ArgToken::normal("-"));
            } else if let Some(name) = rest.strip_prefix('-') {
                if name.is_empty() {
                    literal = true;
                } else {
                    tokens.push(ArgToken::gnu(name));
                }
            } else {
                tokens.extend(rest.chars().map(ArgToken::unix));
            }
        }

        ArgList { tokens }
    }

    #[cfg(test)]
    fn tokens(&self) -> &[ArgToken] {
        &self.tokens
    }

    pub fn cursor<'a>(&'a self, table: &'a UnixTable) -> OptionCursor<'a> {
        OptionCursor {
            inner: self.tokens.iter(),
            table,
        }
    }
}

/// Pull-based cursor over an [`ArgList`]
///
/// Unix tokens are expanded into gnu tokens only when pulled, so an unmapped
/// flag fails the run only if the consumer actually reaches it.
pub struct OptionCursor<'a> {
    inner: std::slice::Iter<'a, ArgToken>,
    table: &'a UnixTable,
}

impl OptionCursor<'_> {
    pub fn has_next(&self) -> bool {
        self.inner.len() > 0
    }

    /// Takes the next raw token and requires it to be a value
    pub fn next_positional(&mut self) -> Result<String, ArgError> {
        match self.inner.next() {
            Some(token) => token.clone().into_normal_text(),
            None => Err(ArgError::MissingValue("option".to_string())),
        }
    }
}

impl Iterator for OptionCursor<'_> {
    type Item = Result<ArgToken, ArgError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        if token.kind != ArgKind::Unix {
            return Some(Ok(token.clone()));
        }

        let expanded = token
            .text
            .chars()
            .next()
            .and_then(|c| self.table.get(c))
            .map(ArgToken::gnu)
            .ok_or_else(|| ArgError::UnknownOption(token.to_string()));
        Some(expanded)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
