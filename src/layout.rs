//! Layouts render a `LogEvent` into the line handed to a sink
//!
//! Supported pattern converters:
//! - `%d` / `%date` with an optional `{chrono format}`
//! - `%p` / `%level`, `%m` / `%msg` / `%message`
//! - `%c` / `%logger` / `%target`, with `{N}` keeping the last N path segments
//! - `%t` / `%thread`, `%M` / `%module`, `%F` / `%file`, `%L` / `%line`
//! - `%X{key}` / `%mdc{key}` for context values, `%X` for the whole context
//! - `%n` for a newline and `%%` for a literal percent sign
//!
//! A converter may carry a format modifier between `%` and its name:
//! `%5p` pads to five characters on the left, `%-5p` pads on the right and
//! `%.10c` keeps the last ten characters.

use chrono::SecondsFormat;
use chrono::format::{Item, StrftimeItems};
use indexmap::IndexMap;
use lazy_regex::regex;
use serde::Serialize;
use std::fmt::Write;

use crate::error::ConfigurationError;
use crate::event::LogEvent;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Renders an event to a string
///
/// Implementations must be deterministic: the same event always renders
/// to the same string.
pub trait Layout: Send + Sync {
    fn render(&self, event: &LogEvent) -> String;
}

impl<F> Layout for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn render(&self, event: &LogEvent) -> String {
        self(event)
    }
}

/// Padding and truncation for one converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Modifier {
    left_align: bool,
    min_width: usize,
    max_width: Option<usize>,
}

impl Modifier {
    fn is_plain(&self) -> bool {
        self.min_width == 0 && self.max_width.is_none()
    }

    /// Truncation drops characters from the front
    fn apply(&self, value: &str, out: &mut String) {
        let count = value.chars().count();
        let value = match self.max_width {
            Some(max) if count > max => value
                .char_indices()
                .nth(count - max)
                .map_or("", |(i, _)| &value[i..]),
            _ => value,
        };

        let pad = self.min_width.saturating_sub(value.chars().count());
        if !self.left_align {
            out.extend(std::iter::repeat_n(' ', pad));
        }
        out.push_str(value);
        if self.left_align {
            out.extend(std::iter::repeat_n(' ', pad));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Converter {
    Date(String),
    Level,
    Logger(Option<usize>),
    Message,
    Thread,
    Module,
    File,
    Line,
    Context(Option<String>),
}

impl Converter {
    fn render(&self, event: &LogEvent, out: &mut String) {
        match self {
            Converter::Date(format) => {
                let _ = write!(out, "{}", event.timestamp.format(format));
            }
            Converter::Level => out.push_str(event.level.as_str()),
            Converter::Logger(None) => out.push_str(&event.target),
            Converter::Logger(Some(keep)) => out.push_str(last_segments(&event.target, *keep)),
            Converter::Message => out.push_str(&event.message),
            Converter::Thread => out.push_str(event.thread.as_deref().unwrap_or("")),
            Converter::Module => out.push_str(event.module_path.as_deref().unwrap_or("")),
            Converter::File => out.push_str(event.file.as_deref().unwrap_or("")),
            Converter::Line => {
                if let Some(line) = event.line {
                    let _ = write!(out, "{}", line);
                }
            }
            Converter::Context(Some(key)) => {
                if let Some(value) = event.context.get(key) {
                    out.push_str(value);
                }
            }
            Converter::Context(None) => {
                let entries: Vec<String> = event.context.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                let _ = write!(out, "{{{}}}", entries.join(", "));
            }
        }
    }
}

/// Last `keep` segments of a `::` or `.` separated path
fn last_segments(target: &str, keep: usize) -> &str {
    let separator = if target.contains("::") { "::" } else { "." };
    match target.rmatch_indices(separator).nth(keep.saturating_sub(1)) {
        Some((index, _)) => &target[index + separator.len()..],
        None => target,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Newline,
    Convert(Converter, Modifier),
}

/// Conversion-pattern layout, e.g. `"%d [%-5p] %c - %m"`
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternLayout {
    /// Parse a conversion pattern
    pub fn new(pattern: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        // The trailing empty group catches a '%' that starts no converter
        let tokens = regex!(r"%(?:(%)|(-)?(\d+)?(?:\.(\d+))?([A-Za-z]+)(?:\{([^}]*)\})?|())");

        for caps in tokens.captures_iter(pattern) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            literal.push_str(&pattern[last..whole.start]);
            last = whole.end;

            if caps.get(1).is_some() {
                literal.push('%');
                continue;
            }
            if caps.get(7).is_some() {
                return Err(invalid(format!("expected a converter after '%' at offset {}", whole.start)));
            }

            let width = |group: usize| -> Result<Option<usize>, ConfigurationError> {
                caps.get(group)
                    .map(|m| m.as_str().parse::<usize>())
                    .transpose()
                    .map_err(|e| invalid(format!("bad width: {}", e)))
            };
            let modifier = Modifier {
                left_align: caps.get(2).is_some(),
                min_width: width(3)?.unwrap_or(0),
                max_width: width(4)?,
            };

            let name = caps.get(5).map(|m| m.as_str()).unwrap_or("");
            let option = caps.get(6).map(|m| m.as_str().to_string());
            let plain = |segment: Segment| match &option {
                Some(opt) => Err(invalid(format!("converter '%{}' takes no option, got '{{{}}}'", name, opt))),
                None => Ok(segment),
            };

            let segment = match name {
                "d" | "date" => {
                    let format = option.clone().unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
                    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
                        return Err(invalid(format!("bad date format '{}'", format)));
                    }
                    Segment::Convert(Converter::Date(format), modifier)
                }
                "c" | "logger" | "target" => {
                    let keep = match &option {
                        None => None,
                        Some(opt) => match opt.trim().parse::<usize>() {
                            Ok(n) if n > 0 => Some(n),
                            _ => {
                                return Err(invalid(format!(
                                    "logger precision must be a positive integer, got '{}'",
                                    opt
                                )));
                            }
                        },
                    };
                    Segment::Convert(Converter::Logger(keep), modifier)
                }
                "X" | "mdc" => Segment::Convert(Converter::Context(option.clone()), modifier),
                "p" | "level" => plain(Segment::Convert(Converter::Level, modifier))?,
                "m" | "msg" | "message" => plain(Segment::Convert(Converter::Message, modifier))?,
                "t" | "thread" => plain(Segment::Convert(Converter::Thread, modifier))?,
                "M" | "module" => plain(Segment::Convert(Converter::Module, modifier))?,
                "F" | "file" => plain(Segment::Convert(Converter::File, modifier))?,
                "L" | "line" => plain(Segment::Convert(Converter::Line, modifier))?,
                "n" => plain(Segment::Newline)?,
                other => return Err(invalid(format!("unknown converter '%{}'", other))),
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }

        literal.push_str(&pattern[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Layout for PatternLayout {
    fn render(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(self.pattern.len() + event.message.len());
        let mut scratch = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Newline => out.push('\n'),
                Segment::Convert(converter, modifier) if modifier.is_plain() => converter.render(event, &mut out),
                Segment::Convert(converter, modifier) => {
                    scratch.clear();
                    converter.render(event, &mut scratch);
                    modifier.apply(&scratch, &mut out);
                }
            }
        }

        out
    }
}


/// One JSON object per event
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayout;

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'a str,
    target: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty")]
    context: &'a IndexMap<String, String>,
}

fn is_empty(map: &&IndexMap<String, String>) -> bool {
    map.is_empty()
}

impl Layout for JsonLayout {
    fn render(&self, event: &LogEvent) -> String {
        let record = JsonRecord {
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: event.level.as_str(),
            target: &event.target,
            message: &event.message,
            thread: event.thread.as_deref(),
            context: &event.context,
        };
        serde_json::to_string(&record).unwrap_or_default()
    }
}
