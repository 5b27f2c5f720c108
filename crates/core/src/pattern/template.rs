//! Template compilation and rendering.

use chrono::NaiveDate;
use regex_lite::Regex;

use super::PatternError;

/// Recognized placeholder tokens, ordered longest / most specific first
/// so that no token is consumed inside another (`nn` inside `<nnnnn>`,
/// `MMDD` inside `YYMMDD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `<nnnnn>` - five-digit sequence number.
    Sequence,
    /// `YYMMDD` - two-digit year, month, day.
    DateYymmdd,
    /// `hhmm` - four-digit time of day.
    TimeHhmm,
    /// `MMDD` - month and day.
    DateMmdd,
    /// `nn` - any two digits.
    TwoDigits,
}

impl Token {
    const ALL: [(&'static str, Token); 5] = [
        ("<nnnnn>", Token::Sequence),
        ("YYMMDD", Token::DateYymmdd),
        ("hhmm", Token::TimeHhmm),
        ("MMDD", Token::DateMmdd),
        ("nn", Token::TwoDigits),
    ];

    /// Digit-class fragment used when matching candidate filenames.
    fn digit_class(&self) -> &'static str {
        match self {
            Token::Sequence => r"\d{5}",
            Token::DateYymmdd => r"\d{6}",
            Token::TimeHhmm => r"\d{4}",
            Token::DateMmdd => r"\d{4}",
            Token::TwoDigits => r"\d{2}",
        }
    }
}

/// One segment of a parsed template: either a placeholder or a literal
/// run of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Placeholder(Token),
    Literal(String),
}

/// A compiled filename template.
///
/// Placeholders are substituted by scanning the template left to right,
/// trying the longest token first at every position. Anything that is
/// not a recognized token stays literal, so an unknown placeholder
/// simply has to appear verbatim in matched filenames.
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    template: String,
    segments: Vec<Segment>,
    matcher: Regex,
}

impl FileNamePattern {
    /// Compile a template into a matcher/generator pair.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::EmptyTemplate);
        }

        let segments = parse(template);

        let mut pattern = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Placeholder(token) => pattern.push_str(token.digit_class()),
                Segment::Literal(text) => pattern.push_str(&regex_lite::escape(text)),
            }
        }
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|e| PatternError::Compile {
            template: template.to_string(),
            detail: e.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            segments,
            matcher,
        })
    }

    /// The original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether `filename` matches the template: literal characters equal,
    /// placeholder positions all ASCII digits of the required width.
    pub fn matches(&self, filename: &str) -> bool {
        self.matcher.is_match(filename)
    }

    /// The fixed leading characters preceding the first placeholder.
    pub fn prefix(&self) -> &str {
        match self.segments.first() {
            Some(Segment::Literal(text)) => text,
            _ => "",
        }
    }

    /// Whether the template carries the `<nnnnn>` sequence token.
    pub fn has_sequence_token(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(Token::Sequence)))
    }

    /// Render a final filename from the template, a date and an
    /// allocated sequence number. Pure substitution: `YYMMDD` and
    /// `MMDD` are formatted from `date`, `<nnnnn>` becomes the
    /// zero-padded sequence. Time and free-digit placeholders have no
    /// generator and stay verbatim.
    pub fn render(&self, date: NaiveDate, sequence: u32) -> String {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Placeholder(Token::Sequence) => {
                    out.push_str(&format!("{:05}", sequence));
                }
                Segment::Placeholder(Token::DateYymmdd) => {
                    out.push_str(&date.format("%y%m%d").to_string());
                }
                Segment::Placeholder(Token::DateMmdd) => {
                    out.push_str(&date.format("%m%d").to_string());
                }
                Segment::Placeholder(token @ (Token::TimeHhmm | Token::TwoDigits)) => {
                    out.push_str(token_text(*token));
                }
                Segment::Literal(text) => out.push_str(text),
            }
        }
        out
    }

    /// Build the regex used for sequence allocation on a given day:
    /// date tokens become that day's literal digits, the sequence token
    /// becomes a five-digit capture group, the remaining template
    /// structure stays as-is.
    pub fn sequence_regex(&self, date: NaiveDate) -> Result<Regex, PatternError> {
        if !self.has_sequence_token() {
            return Err(PatternError::MissingSequenceToken {
                template: self.template.clone(),
            });
        }

        let mut pattern = String::from("^");
        for segment in &self.segments {
            match segment {
                Segment::Placeholder(Token::Sequence) => pattern.push_str(r"(\d{5})"),
                Segment::Placeholder(Token::DateYymmdd) => {
                    pattern.push_str(&date.format("%y%m%d").to_string());
                }
                Segment::Placeholder(Token::DateMmdd) => {
                    pattern.push_str(&date.format("%m%d").to_string());
                }
                Segment::Placeholder(token) => pattern.push_str(token.digit_class()),
                Segment::Literal(text) => pattern.push_str(&regex_lite::escape(text)),
            }
        }
        pattern.push('$');

        Regex::new(&pattern).map_err(|e| PatternError::Compile {
            template: self.template.clone(),
            detail: e.to_string(),
        })
    }
}

fn token_text(token: Token) -> &'static str {
    Token::ALL
        .iter()
        .find(|(_, t)| *t == token)
        .map(|(text, _)| *text)
        .unwrap_or_default()
}

/// Split a template into placeholder and literal segments, longest
/// token first at each position.
fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    'outer: while !rest.is_empty() {
        for (text, token) in Token::ALL {
            if rest.starts_with(text) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(token));
                rest = &rest[text.len()..];
                continue 'outer;
            }
        }
        let ch = rest.chars().next().unwrap();
        literal.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}
