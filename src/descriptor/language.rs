//! BCP47 language tags (RFC 5646).
//!
//! Parsing keeps the subtags as written; [`LanguageTag`]'s `Display`
//! reassembles them. Grandfathered tags are recognized whole and kept
//! verbatim.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Irregular grandfathered tags, which do not follow the tag grammar.
const IRREGULAR: &[&str] = &[
    "en-GB-oed",
    "i-ami",
    "i-bnn",
    "i-default",
    "i-enochian",
    "i-hak",
    "i-klingon",
    "i-lux",
    "i-mingo",
    "i-navajo",
    "i-pwn",
    "i-tao",
    "i-tay",
    "i-tsu",
    "sgn-BE-FR",
    "sgn-BE-NL",
    "sgn-CH-DE",
];

/// Regular grandfathered tags, which match the grammar but are registered whole.
const REGULAR: &[&str] = &[
    "art-lojban",
    "cel-gaulish",
    "no-bok",
    "no-nyn",
    "zh-guoyu",
    "zh-hakka",
    "zh-min",
    "zh-min-nan",
    "zh-xiang",
];

/// A malformed language tag, with the character offset where parsing stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at position {offset}")]
pub struct LanguageTagError {
    pub reason: String,
    pub offset: usize,
}

impl LanguageTagError {
    fn new(reason: impl Into<String>, offset: usize) -> Self {
        Self {
            reason: reason.into(),
            offset,
        }
    }
}

/// An extension sequence such as `u-co-phonebk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub singleton: char,
    pub subtags: Vec<String>,
}

/// A parsed BCP47 language tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTag {
    /// Primary language subtag; absent for private-use-only tags.
    pub language: Option<String>,
    pub extended_language_subtags: Vec<String>,
    pub script: Option<String>,
    pub region: Option<String>,
    pub variants: Vec<String>,
    pub extensions: Vec<Extension>,
    pub private_use: Vec<String>,
    /// Set to the whole tag when it is a legacy grandfathered tag.
    pub grandfathered: Option<String>,
}

/// A subtag and the character offset it starts at.
type Subtag<'a> = (usize, &'a str);

impl LanguageTag {
    pub fn parse(input: &str) -> Result<Self, LanguageTagError> {
        if let Some(tag) = IRREGULAR
            .iter()
            .chain(REGULAR)
            .find(|tag| tag.eq_ignore_ascii_case(input))
        {
            return Ok(Self {
                grandfathered: Some((*tag).to_string()),
                ..Self::default()
            });
        }

        let subtags = split_subtags(input)?;
        let mut parser = TagParser {
            subtags: &subtags,
            pos: 0,
            end: input.chars().count(),
        };
        parser.parse()
    }

    pub fn is_grandfathered(&self) -> bool {
        self.grandfathered.is_some()
    }
}

impl FromStr for LanguageTag {
    type Err = LanguageTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref tag) = self.grandfathered {
            return f.write_str(tag);
        }

        let singletons: Vec<String> = self.extensions.iter().map(|e| e.singleton.to_string()).collect();

        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.language.as_deref());
        parts.extend(self.extended_language_subtags.iter().map(String::as_str));
        parts.extend(self.script.as_deref());
        parts.extend(self.region.as_deref());
        parts.extend(self.variants.iter().map(String::as_str));
        for (extension, singleton) in self.extensions.iter().zip(&singletons) {
            parts.push(singleton);
            parts.extend(extension.subtags.iter().map(String::as_str));
        }

        if !self.private_use.is_empty() {
            parts.push("x");
            parts.extend(self.private_use.iter().map(String::as_str));
        }

        f.write_str(&parts.join("-"))
    }
}

/// Split on `-`, rejecting empty subtags, non-alphanumerics, and subtags
/// longer than eight characters.
fn split_subtags(input: &str) -> Result<Vec<Subtag<'_>>, LanguageTagError> {
    if input.is_empty() {
        return Err(LanguageTagError::new("Expected a language subtag", 0));
    }

    let mut subtags = Vec::new();
    let mut offset = 0;
    for subtag in input.split('-') {
        if subtag.is_empty() {
            return Err(LanguageTagError::new("Empty subtag", offset));
        }
        if let Some((i, c)) = subtag.chars().enumerate().find(|(_, c)| !c.is_ascii_alphanumeric()) {
            return Err(LanguageTagError::new(format!("Invalid character `{c}`"), offset + i));
        }
        if subtag.len() > 8 {
            return Err(LanguageTagError::new(
                "Too long subtag, expected at most 8 characters",
                offset,
            ));
        }
        subtags.push((offset, subtag));
        offset += subtag.len() + 1;
    }
    Ok(subtags)
}

fn is_alpha(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_digit(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

struct TagParser<'a> {
    subtags: &'a [Subtag<'a>],
    pos: usize,
    /// Offset reported when input runs out.
    end: usize,
}

impl<'a> TagParser<'a> {
    fn peek(&self) -> Option<Subtag<'a>> {
        self.subtags.get(self.pos).copied()
    }

    /// Consume the next subtag if `accept` matches it.
    fn next_if(&mut self, accept: impl Fn(&str) -> bool) -> Option<String> {
        let (_, subtag) = self.peek()?;
        if accept(subtag) {
            self.pos += 1;
            Some(subtag.to_string())
        } else {
            None
        }
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |(offset, _)| offset)
    }

    fn parse(&mut self) -> Result<LanguageTag, LanguageTagError> {
        let mut tag = LanguageTag::default();

        let Some((offset, first)) = self.peek() else {
            return Err(LanguageTagError::new("Expected a language subtag", self.end));
        };

        if first.eq_ignore_ascii_case("x") {
            tag.private_use = self.private_use()?;
            return self.finish(tag);
        }

        if !is_alpha(first) || first.len() < 2 {
            return Err(LanguageTagError::new(
                "Expected 2 or 3 letter language, 4 letter reserved, or 5 to 8 letter registered language subtag",
                offset,
            ));
        }
        self.pos += 1;
        let short_language = first.len() <= 3;
        tag.language = Some(first.to_string());

        if short_language {
            while tag.extended_language_subtags.len() < 3 {
                match self.next_if(|s| s.len() == 3 && is_alpha(s)) {
                    Some(extlang) => tag.extended_language_subtags.push(extlang),
                    None => break,
                }
            }
        }

        tag.script = self.next_if(|s| s.len() == 4 && is_alpha(s));
        tag.region = self.next_if(|s| (s.len() == 2 && is_alpha(s)) || (s.len() == 3 && is_digit(s)));

        while let Some(variant) = self.next_if(|s| {
            (5..=8).contains(&s.len()) || (s.len() == 4 && s.as_bytes()[0].is_ascii_digit())
        }) {
            tag.variants.push(variant);
        }

        while let Some((offset, singleton)) = self.peek() {
            if singleton.len() != 1 || singleton.eq_ignore_ascii_case("x") {
                break;
            }
            self.pos += 1;

            let singleton = singleton.chars().next().unwrap_or_default();
            if tag
                .extensions
                .iter()
                .any(|e| e.singleton.eq_ignore_ascii_case(&singleton))
            {
                return Err(LanguageTagError::new(
                    format!("Duplicate extension singleton `{singleton}`"),
                    offset,
                ));
            }

            let mut subtags = Vec::new();
            while let Some(subtag) = self.next_if(|s| s.len() >= 2) {
                subtags.push(subtag);
            }
            if subtags.is_empty() {
                return Err(LanguageTagError::new(
                    "Empty extension, expected at least one subtag of 2 to 8 characters",
                    self.offset(),
                ));
            }
            tag.extensions.push(Extension { singleton, subtags });
        }

        if let Some((_, subtag)) = self.peek()
            && subtag.eq_ignore_ascii_case("x")
        {
            tag.private_use = self.private_use()?;
        }

        self.finish(tag)
    }

    /// Parse `x-…` starting at the current `x` singleton.
    fn private_use(&mut self) -> Result<Vec<String>, LanguageTagError> {
        self.pos += 1;
        let mut subtags = Vec::new();
        while let Some(subtag) = self.next_if(|_| true) {
            subtags.push(subtag);
        }
        if subtags.is_empty() {
            return Err(LanguageTagError::new(
                "Empty private-use subtag, expected at least one subtag of 1 to 8 characters",
                self.end,
            ));
        }
        Ok(subtags)
    }

    fn finish(&self, tag: LanguageTag) -> Result<LanguageTag, LanguageTagError> {
        match self.peek() {
            None => Ok(tag),
            Some((offset, subtag)) => Err(LanguageTagError::new(
                format!("Unexpected subtag `{subtag}`"),
                offset,
            )),
        }
    }
}
