use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;

use super::error::ParsedNameOrBytes;

use std::fmt;

/// Owned description of an xml event, used when reporting where parsing went wrong
#[derive(Debug)]
pub(crate) struct EventSummary {
    name: Option<ParsedNameOrBytes>,
    e_type: &'static str,
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "element {name} with type {}", self.e_type),
            None => write!(f, "unnamed element with type {}", self.e_type),
        }
    }
}

impl EventSummary {
    pub(crate) fn new(e: &Event) -> Self {
        Self {
            name: e.event_name(),
            e_type: event_type(e),
        }
    }

    pub(crate) fn eof() -> Self {
        Self {
            name: None,
            e_type: "eof",
        }
    }

    pub(crate) fn end(bytes: &BytesEnd<'_>) -> Self {
        Self {
            name: bytes.event_name(),
            e_type: "end",
        }
    }
}

pub(crate) trait ElementName {
    fn event_name(&self) -> Option<ParsedNameOrBytes> {
        self.byte_name().map(ParsedNameOrBytes::from)
    }

    fn byte_name(&self) -> Option<QName<'_>>;
}

impl ElementName for BytesStart<'_> {
    fn byte_name(&self) -> Option<QName<'_>> {
        Some(self.name())
    }
}

impl ElementName for BytesEnd<'_> {
    fn byte_name(&self) -> Option<QName<'_>> {
        Some(self.name())
    }
}

impl ElementName for Event<'_> {
    fn byte_name(&self) -> Option<QName<'_>> {
        match &self {
            Event::Start(s) => s.byte_name(),
            Event::End(e) => e.byte_name(),
            Event::Empty(s) => s.byte_name(),
            _ => None,
        }
    }
}

fn event_type(event: &Event) -> &'static str {
    match event {
        Event::Start(_) => "start",
        Event::End(_) => "end",
        Event::Empty(_) => "empty",
        Event::Text(_) => "text",
        Event::Comment(_) => "comment",
        Event::CData(_) => "cdata",
        Event::Decl(_) => "decl",
        Event::PI(_) => "pi",
        Event::DocType(_) => "doctype",
        Event::Eof => "eof",
    }
}
