//! Event-driven construction of dynamic values.
//!
//! [`ValueBuilder`] receives the parser's events and keeps a stack of the
//! containers and slots still waiting for content. A scalar on top of a
//! mapping is a key and opens a slot for its value; the next complete value
//! fills that slot. Sequences accept values until their end event.

use crate::error::{IngestError, Position};
use crate::scalar::resolve_scalar;
use paramtree::{DynamicValue, Members};
use std::collections::HashMap;
use std::mem;
use yaml_rust2::parser::{Event, MarkedEventReceiver};
use yaml_rust2::scanner::Marker;

/// How alias events are turned into values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AliasPolicy {
    /// An alias produces an Invalid value; anchors are not tracked.
    ///
    /// The Invalid value still takes a slot: an aliased sequence element
    /// counts towards `len()` and makes a `Vec<T>` decode of that sequence
    /// fail.
    #[default]
    Ignore,
    /// An alias produces a copy of the value its anchor was attached to.
    Resolve,
}

/// A value still under construction.
#[derive(Debug)]
enum Frame {
    /// The document root, not yet assigned.
    Document,
    /// The value slot of a mapping key.
    Member(String),
    Sequence { anchor: usize, items: Vec<DynamicValue> },
    Mapping { anchor: usize, members: Members },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeDocument,
    InDocument,
    AfterDocument,
}

/// Builds one dynamic value from a stream of parser events.
///
/// Only the first document is consumed. The first structural error stops
/// construction; later events are ignored.
#[derive(Debug)]
pub struct ValueBuilder {
    policy: AliasPolicy,
    phase: Phase,
    stack: Vec<Frame>,
    root: DynamicValue,
    anchors: HashMap<usize, DynamicValue>,
    error: Option<IngestError>,
    last_position: Position,
}

impl ValueBuilder {
    pub fn new(policy: AliasPolicy) -> Self {
        Self {
            policy,
            phase: Phase::BeforeDocument,
            stack: Vec::new(),
            root: DynamicValue::Invalid,
            anchors: HashMap::new(),
            error: None,
            last_position: Position::START,
        }
    }

    /// The first error seen, if any.
    pub fn error(&self) -> Option<&IngestError> {
        self.error.as_ref()
    }

    pub(crate) fn take_error(&mut self) -> Option<IngestError> {
        self.error.take()
    }

    /// The built value, or the first error.
    pub fn finish(self) -> Result<DynamicValue, IngestError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.phase {
            Phase::BeforeDocument => Err(IngestError::structure(self.last_position, "no YAML document found")),
            Phase::InDocument => Err(IngestError::structure(self.last_position, "unexpected end of document")),
            Phase::AfterDocument => Ok(self.root),
        }
    }

    fn receive(&mut self, ev: Event, at: Position) {
        if self.error.is_some() || self.phase == Phase::AfterDocument {
            return;
        }
        tracing::trace!(event = ?ev, line = at.line, column = at.column, "yaml event");
        if let Err(error) = self.handle(ev, at) {
            tracing::debug!(%error, "stopping YAML conversion");
            self.error = Some(error);
        }
        self.last_position = at;
    }

    fn handle(&mut self, event: Event, at: Position) -> Result<(), IngestError> {
        match event {
            Event::Nothing | Event::StreamStart | Event::StreamEnd => Ok(()),
            Event::DocumentStart => {
                if self.phase == Phase::BeforeDocument {
                    self.phase = Phase::InDocument;
                    self.stack.push(Frame::Document);
                }
                Ok(())
            }
            Event::DocumentEnd => {
                if self.phase == Phase::InDocument && !self.stack.is_empty() {
                    return Err(IngestError::structure(at, "end of document inside a collection"));
                }
                self.phase = Phase::AfterDocument;
                Ok(())
            }
            Event::Scalar(text, style, anchor, tag) => {
                let is_key = match self.open_frame(at, "scalar")? {
                    Frame::Mapping { members, .. } if members.contains_key(&text) => {
                        return Err(IngestError::structure(at, format!("duplicate map key '{}'", text)));
                    }
                    Frame::Mapping { .. } => true,
                    _ => false,
                };
                if is_key {
                    self.stack.push(Frame::Member(text));
                    return Ok(());
                }
                let value = resolve_scalar(&text, style, tag.as_ref());
                self.deliver(value, anchor, at)
            }
            Event::SequenceStart(anchor, _tag) => {
                self.start_collection(at)?;
                self.stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
                Ok(())
            }
            Event::MappingStart(anchor, _tag) => {
                self.start_collection(at)?;
                self.stack.push(Frame::Mapping {
                    anchor,
                    members: Members::new(),
                });
                Ok(())
            }
            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence { anchor, items }) => self.deliver(DynamicValue::Array(items), anchor, at),
                _ => Err(IngestError::structure(at, "invalid end of sequence")),
            },
            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping { anchor, members }) => self.deliver(DynamicValue::Struct(members), anchor, at),
                _ => Err(IngestError::structure(at, "invalid end of map")),
            },
            Event::Alias(anchor) => {
                let is_key = matches!(self.open_frame(at, "alias")?, Frame::Mapping { .. });
                if is_key {
                    return Err(IngestError::structure(at, "alias cannot be a map key"));
                }
                let value = match self.policy {
                    AliasPolicy::Ignore => DynamicValue::Invalid,
                    AliasPolicy::Resolve => match self.anchors.get(&anchor) {
                        Some(value) => value.clone(),
                        None => {
                            tracing::debug!(anchor, "alias refers to an unknown anchor");
                            DynamicValue::Invalid
                        }
                    },
                };
                tracing::trace!(anchor, policy = ?self.policy, "alias");
                self.deliver(value, 0, at)
            }
        }
    }

    /// The frame a new node will be added to.
    fn open_frame(&self, at: Position, what: &str) -> Result<&Frame, IngestError> {
        match (self.phase, self.stack.last()) {
            (_, Some(frame)) => Ok(frame),
            (Phase::BeforeDocument, None) => Err(IngestError::structure(
                at,
                format!("{} cannot be added before start of document", what),
            )),
            (_, None) => Err(IngestError::structure(
                at,
                format!("{} cannot be added after end of document", what),
            )),
        }
    }

    fn start_collection(&self, at: Position) -> Result<(), IngestError> {
        match self.open_frame(at, "collection (sequence or map)")? {
            Frame::Mapping { .. } => Err(IngestError::structure(
                at,
                "collection (sequence or map) cannot be a map key",
            )),
            _ => Ok(()),
        }
    }

    /// Hands a complete value to the frame on top of the stack.
    fn deliver(&mut self, value: DynamicValue, anchor: usize, at: Position) -> Result<(), IngestError> {
        if anchor != 0 && self.policy == AliasPolicy::Resolve {
            self.anchors.insert(anchor, value.clone());
        }
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => {
                items.push(value);
                Ok(())
            }
            Some(Frame::Document) => {
                self.stack.pop();
                self.root = value;
                Ok(())
            }
            Some(Frame::Member(key)) => {
                let key = mem::take(key);
                self.stack.pop();
                match self.stack.last_mut() {
                    Some(Frame::Mapping { members, .. }) => {
                        members.insert(key, value);
                        Ok(())
                    }
                    _ => Err(IngestError::structure(at, "map value outside of a map")),
                }
            }
            Some(Frame::Mapping { .. }) => Err(IngestError::structure(
                at,
                "collection (sequence or map) cannot be a map key",
            )),
            None => Err(IngestError::structure(at, "value cannot be added after end of document")),
        }
    }
}

impl MarkedEventReceiver for ValueBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        self.receive(ev, Position::from(&marker));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust2::scanner::TScalarStyle;

    fn line(line: usize) -> Position {
        Position { line, column: 1 }
    }

    fn plain(text: &str) -> Event {
        Event::Scalar(text.to_owned(), TScalarStyle::Plain, 0, None)
    }

    fn build(policy: AliasPolicy, events: Vec<Event>) -> Result<DynamicValue, IngestError> {
        let mut builder = ValueBuilder::new(policy);
        builder.receive(Event::StreamStart, line(1));
        for (number, event) in events.into_iter().enumerate() {
            builder.receive(event, line(number + 1));
        }
        builder.receive(Event::StreamEnd, line(99));
        builder.finish()
    }

    fn document(mut body: Vec<Event>) -> Vec<Event> {
        body.insert(0, Event::DocumentStart);
        body.push(Event::DocumentEnd);
        body
    }

    #[test]
    fn test_scalar_root() {
        let value = build(AliasPolicy::Ignore, document(vec![plain("42")]));
        assert_eq!(value, Ok(DynamicValue::Int(42)));
    }

    #[test]
    fn test_nested_containers() {
        let value = build(
            AliasPolicy::Ignore,
            document(vec![
                Event::MappingStart(0, None),
                plain("a"),
                Event::SequenceStart(0, None),
                plain("1"),
                Event::MappingStart(0, None),
                plain("b"),
                plain("true"),
                Event::MappingEnd,
                Event::SequenceEnd,
                plain("c"),
                plain("~"),
                Event::MappingEnd,
            ]),
        )
        .unwrap();
        let a = value.member("a").unwrap();
        assert_eq!(a.get(0), Some(&DynamicValue::Int(1)));
        assert_eq!(a.get(1).and_then(|inner| inner.member("b")), Some(&DynamicValue::Bool(true)));
        assert_eq!(value.member("c"), Some(&DynamicValue::Invalid));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let error = build(
            AliasPolicy::Ignore,
            document(vec![
                Event::MappingStart(0, None),
                plain("k"),
                plain("1"),
                plain("j"),
                plain("2"),
                plain("k"),
                plain("3"),
                Event::MappingEnd,
            ]),
        )
        .unwrap_err();
        insta::assert_snapshot!(error.to_string(), @"7:1: duplicate map key 'k'");
    }

    #[test]
    fn test_same_key_in_sibling_maps() {
        let value = build(
            AliasPolicy::Ignore,
            document(vec![
                Event::SequenceStart(0, None),
                Event::MappingStart(0, None),
                plain("k"),
                plain("1"),
                Event::MappingEnd,
                Event::MappingStart(0, None),
                plain("k"),
                plain("2"),
                Event::MappingEnd,
                Event::SequenceEnd,
            ]),
        )
        .unwrap();
        assert_eq!(value.get(1).and_then(|inner| inner.member("k")), Some(&DynamicValue::Int(2)));
    }

    #[test]
    fn test_collection_as_key_is_rejected() {
        let error = build(
            AliasPolicy::Ignore,
            document(vec![Event::MappingStart(0, None), Event::SequenceStart(0, None)]),
        )
        .unwrap_err();
        insta::assert_snapshot!(error.to_string(), @"3:1: collection (sequence or map) cannot be a map key");
    }

    #[test]
    fn test_mismatched_end_is_rejected() {
        let error = build(
            AliasPolicy::Ignore,
            document(vec![Event::SequenceStart(0, None), Event::MappingEnd]),
        )
        .unwrap_err();
        assert!(error.to_string().ends_with("invalid end of map"));

        let error = build(AliasPolicy::Ignore, document(vec![Event::SequenceEnd])).unwrap_err();
        assert!(error.to_string().ends_with("invalid end of sequence"));
    }

    #[test]
    fn test_scalar_outside_document() {
        let error = build(AliasPolicy::Ignore, vec![plain("1")]).unwrap_err();
        assert!(error.to_string().ends_with("scalar cannot be added before start of document"));

        let error = build(
            AliasPolicy::Ignore,
            vec![Event::DocumentStart, plain("1"), plain("2")],
        )
        .unwrap_err();
        assert!(error.to_string().ends_with("scalar cannot be added after end of document"));
    }

    #[test]
    fn test_first_error_wins() {
        let mut builder = ValueBuilder::new(AliasPolicy::Ignore);
        builder.receive(Event::DocumentStart, line(1));
        builder.receive(Event::SequenceEnd, line(2));
        builder.receive(Event::MappingEnd, line(3));
        assert!(builder.error().is_some_and(|error| error.to_string().ends_with("invalid end of sequence")));
    }

    #[test]
    fn test_empty_stream_has_no_document() {
        let error = build(AliasPolicy::Ignore, Vec::new()).unwrap_err();
        assert!(error.to_string().ends_with("no YAML document found"));
    }

    #[test]
    fn test_second_document_is_ignored() {
        let mut events = document(vec![plain("1")]);
        events.extend(document(vec![plain("2")]));
        assert_eq!(build(AliasPolicy::Ignore, events), Ok(DynamicValue::Int(1)));
    }

    fn aliased() -> Vec<Event> {
        document(vec![
            Event::MappingStart(0, None),
            plain("base"),
            Event::Scalar("7".to_owned(), TScalarStyle::Plain, 1, None),
            plain("copy"),
            Event::Alias(1),
            plain("list"),
            Event::SequenceStart(0, None),
            Event::Alias(1),
            Event::Alias(5),
            Event::SequenceEnd,
            Event::MappingEnd,
        ])
    }

    #[test]
    fn test_alias_ignored() {
        let value = build(AliasPolicy::Ignore, aliased()).unwrap();
        assert_eq!(value.member("copy"), Some(&DynamicValue::Invalid));
        assert_eq!(
            value.member("list"),
            Some(&DynamicValue::Array(vec![DynamicValue::Invalid, DynamicValue::Invalid]))
        );
    }

    #[test]
    fn test_alias_resolved() {
        let value = build(AliasPolicy::Resolve, aliased()).unwrap();
        assert_eq!(value.member("copy"), Some(&DynamicValue::Int(7)));
        assert_eq!(
            value.member("list"),
            Some(&DynamicValue::Array(vec![DynamicValue::Int(7), DynamicValue::Invalid]))
        );
    }

    #[test]
    fn test_alias_as_key_is_rejected() {
        for policy in [AliasPolicy::Ignore, AliasPolicy::Resolve] {
            let error = build(policy, document(vec![Event::MappingStart(0, None), Event::Alias(1)])).unwrap_err();
            assert!(error.to_string().ends_with("alias cannot be a map key"));
        }
    }
}
