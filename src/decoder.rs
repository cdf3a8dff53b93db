//! Streaming XML decoder.
//!
//! Wraps a quick-xml [`Reader`] and walks the token stream recursively,
//! filling a [`Bindable`] destination through its mutable views. Empty-element
//! tags are expanded so the token model is exactly start, text and end.
//! Unknown elements and attributes are skipped without error so documents can
//! grow fields the binding does not know about.

use std::io::{BufReader, Read};
use std::str;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::binder::XmlBinder;
use crate::error::BindError;
use crate::name::{Attribute, QName, StartTag};
use crate::value::{AnyElement, Bindable, ListValue, ScalarMut, StructValue, ValueMut, assign_text};

/// Normalized token model over the event stream.
enum Token {
    Start(StartTag),
    End(QName),
    Text(Vec<u8>),
}

/// Streaming decoder bound to an [`XmlBinder`] context.
///
/// Created by [`XmlBinder::decoder`]. Consumes elements from the source one
/// [`decode`](Self::decode) call at a time, so several destinations can be
/// filled from a single stream.
pub struct Decoder<'a, R: Read> {
    binder: &'a XmlBinder,
    reader: Reader<BufReader<R>>,
    buffer: Vec<u8>,
}

impl<'a, R: Read> Decoder<'a, R> {
    pub(crate) fn new(binder: &'a XmlBinder, source: R) -> Self {
        let mut reader = Reader::from_reader(BufReader::new(source));
        reader.config_mut().expand_empty_elements = true;
        Self {
            binder,
            reader,
            buffer: Vec::new(),
        }
    }

    /// Decodes the next element in the stream into `target`.
    ///
    /// A sequence destination keeps appending elements until the document
    /// ends; end of input is normal termination for it. Every other
    /// destination consumes exactly one element.
    pub fn decode(&mut self, target: &mut dyn Bindable) -> Result<(), BindError> {
        self.decode_element(target, None)
    }

    /// Like [`decode`](Self::decode), but an already-consumed start tag (from
    /// [`find`](Self::find)) can be handed back in so its element is the one
    /// decoded.
    pub fn decode_element(
        &mut self,
        target: &mut dyn Bindable,
        start: Option<StartTag>,
    ) -> Result<(), BindError> {
        if let ValueMut::List(list) = target.view_mut() {
            // A sequence drains the stream: the handed-back tag fills the
            // first slot, then scanning continues until the document ends.
            if let Some(tag) = start {
                self.decode_list_slot(&mut *list, tag)?;
            }
            loop {
                let tag = match self.next_start() {
                    Ok(tag) => tag,
                    Err(BindError::UnexpectedEof) => return Ok(()),
                    Err(e) => return Err(e),
                };
                self.decode_list_slot(&mut *list, tag)?;
            }
        }
        let tag = match start {
            Some(tag) => tag,
            None => self.next_start()?,
        };
        self.decode_value(target, tag)
    }

    /// Scans forward to the next start tag matching one of `names` and
    /// returns it, at any depth. An unqualified name in `names` matches on
    /// the local part alone.
    ///
    /// Fails with [`BindError::UnexpectedEof`] when the document ends first.
    pub fn find(&mut self, names: &[QName]) -> Result<StartTag, BindError> {
        loop {
            let tag = self.next_start()?;
            let resolved = self.resolve(&tag.name);
            let hit = names
                .iter()
                .any(|n| *n == resolved || (n.space.is_empty() && n.local == resolved.local));
            if hit {
                return Ok(tag);
            }
            debug!("find: passing over <{}>", resolved);
        }
    }

    fn decode_value(&mut self, target: &mut dyn Bindable, tag: StartTag) -> Result<(), BindError> {
        match target.view_mut() {
            ValueMut::Nullable(slot) => self.decode_value(slot.materialize(), tag),
            ValueMut::Poly(slot) => self.decode_poly(slot, tag),
            ValueMut::List(list) => self.decode_list_slot(list, tag),
            ValueMut::Struct(record) => self.decode_fields(record, tag),
            ValueMut::Scalar(slot) => self.decode_leaf(slot),
        }
    }

    /// Appends one empty slot and decodes the element into it, rolling the
    /// append back when the decode fails.
    fn decode_list_slot(
        &mut self,
        list: &mut dyn ListValue,
        tag: StartTag,
    ) -> Result<(), BindError> {
        let slot = list.push_item();
        if let Err(e) = self.decode_value(slot, tag) {
            list.pop_item();
            return Err(e);
        }
        Ok(())
    }

    /// Resolves the element name to a registered type and decodes into a
    /// fresh instance of it. An unresolved name skips the element's whole
    /// subtree so the enclosing field loop stays aligned.
    fn decode_poly(&mut self, slot: &mut AnyElement, tag: StartTag) -> Result<(), BindError> {
        let name = self.resolve(&tag.name);
        match self.binder.type_by_name(&name) {
            Some(mut value) => {
                self.decode_value(&mut *value, tag)?;
                slot.set(value);
                Ok(())
            }
            None => {
                debug!("no type registered for element <{}>, skipping", name);
                self.skip_element()
            }
        }
    }

    fn decode_fields(
        &mut self,
        record: &mut dyn StructValue,
        tag: StartTag,
    ) -> Result<(), BindError> {
        let desc = self.binder.descriptor_of(record.as_bindable());

        for attr in &tag.attrs {
            self.assign_attribute(&mut *record, &desc.fields, attr)?;
        }

        loop {
            match self.read_token()? {
                Token::End(_) => return Ok(()),
                Token::Text(_) => continue,
                Token::Start(child) => {
                    // Field names were URI-resolved at derivation; only the
                    // document side still carries a raw prefix.
                    let child_name = self.resolve(&child.name);
                    // An exact name match wins over the polymorphic slot, so
                    // siblings declared after it still bind by name.
                    let index = desc
                        .fields
                        .iter()
                        .position(|fi| !fi.is_attr && fi.name == child_name)
                        .or_else(|| desc.fields.iter().position(|fi| !fi.is_attr && fi.is_poly));
                    match index.and_then(|i| record.field_mut(i)) {
                        Some(field) => self.decode_value(field, child)?,
                        None => {
                            debug!(
                                "no field for element <{}> in {}, skipping",
                                child_name,
                                record.type_name()
                            );
                            self.skip_element()?;
                        }
                    }
                }
            }
        }
    }

    /// First declared attribute field with a matching name wins. A field
    /// without a prefix matches on the local part alone. Non-scalar targets
    /// are skipped; attributes carry leaf text only.
    fn assign_attribute(
        &self,
        record: &mut dyn StructValue,
        fields: &[crate::registry::FieldDescriptor],
        attr: &Attribute,
    ) -> Result<(), BindError> {
        for (index, fi) in fields.iter().enumerate() {
            if !fi.is_attr || fi.name.local != attr.name.local {
                continue;
            }
            if !fi.name.space.is_empty() && fi.name.space != self.resolve(&attr.name).space {
                continue;
            }
            match record.field_mut(index).map(|f| f.view_mut()) {
                Some(ValueMut::Scalar(slot)) => assign_text(slot, attr.value.as_bytes())?,
                _ => debug!("attribute '{}' targets a non-scalar field, ignored", attr.name),
            }
            return Ok(());
        }
        debug!("no field for attribute '{}', ignored", attr.name);
        Ok(())
    }

    /// Accumulates the element's own text and assigns it once the matching
    /// end tag arrives. Nested markup inside a leaf is skipped.
    fn decode_leaf(&mut self, slot: ScalarMut<'_>) -> Result<(), BindError> {
        let mut text: Vec<u8> = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.read_token()? {
                Token::Start(inner) => {
                    debug!("skipping nested element <{}> inside leaf text", inner.name);
                    depth += 1;
                }
                Token::End(_) if depth == 0 => break,
                Token::End(_) => depth -= 1,
                Token::Text(chunk) if depth == 0 => text.extend_from_slice(&chunk),
                Token::Text(_) => {}
            }
        }
        assign_text(slot, &text)
    }

    /// Consumes the remainder of the current element, matching nested tags
    /// by depth.
    fn skip_element(&mut self) -> Result<(), BindError> {
        let mut depth = 0usize;
        loop {
            match self.read_token()? {
                Token::Start(_) => depth += 1,
                Token::End(_) if depth == 0 => return Ok(()),
                Token::End(_) => depth -= 1,
                Token::Text(_) => {}
            }
        }
    }

    fn next_start(&mut self) -> Result<StartTag, BindError> {
        loop {
            if let Token::Start(tag) = self.read_token()? {
                return Ok(tag);
            }
        }
    }

    /// Swaps a raw prefix for its registered URI. Unregistered prefixes stay
    /// as written so prefix-literal bindings keep working.
    fn resolve(&self, name: &QName) -> QName {
        if name.space.is_empty() {
            return name.clone();
        }
        match self.binder.namespaces().uri_for(&name.space) {
            Some(uri) if !uri.is_empty() => QName::new(uri, name.local.clone()),
            _ => name.clone(),
        }
    }

    fn read_token(&mut self) -> Result<Token, BindError> {
        loop {
            self.buffer.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buffer)
                .map_err(|e| BindError::Stream(e.to_string()))?;
            match event {
                Event::Start(start) => return Ok(Token::Start(capture_start(&start)?)),
                Event::End(end) => return Ok(Token::End(split_name(end.name())?)),
                Event::Text(text) => {
                    // Entity references never reach this arm; the reader
                    // splits them into their own events.
                    let text = text
                        .decode()
                        .map_err(|e| BindError::Stream(e.to_string()))?;
                    return Ok(Token::Text(text.into_owned().into_bytes()));
                }
                Event::CData(data) => return Ok(Token::Text(data.into_inner().into_owned())),
                Event::GeneralRef(entity) => return Ok(Token::Text(resolve_entity(&entity)?)),
                Event::Eof => return Err(BindError::UnexpectedEof),
                // Prolog, comments and processing instructions carry no
                // bound data.
                _ => continue,
            }
        }
    }
}

// Entity references arrive as their own events; the predefined five and
// numeric character references resolve here, anything else is rejected.
fn resolve_entity(entity: &[u8]) -> Result<Vec<u8>, BindError> {
    let name = str::from_utf8(entity)
        .map_err(|e| BindError::Malformed(format!("invalid UTF-8 in entity reference: {}", e)))?;
    let text = match name {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        _ => {
            let Some(num) = name.strip_prefix('#') else {
                return Err(BindError::Malformed(format!("unknown entity '&{};'", name)));
            };
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => num.parse::<u32>(),
            }
            .map_err(|_| {
                BindError::Malformed(format!("bad character reference '&{};'", name))
            })?;
            char::from_u32(code)
                .ok_or_else(|| {
                    BindError::Malformed(format!("bad character reference '&{};'", name))
                })?
                .to_string()
        }
    };
    Ok(text.into_bytes())
}

fn capture_start(start: &BytesStart<'_>) -> Result<StartTag, BindError> {
    let name = split_name(start.name())?;
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| BindError::Stream(format!("malformed attribute: {}", e)))?;
        let key = split_name(attr.key)?;
        let value = attr
            .unescape_value()
            .map_err(|e| BindError::Stream(e.to_string()))?;
        attrs.push(Attribute::new(key, value.into_owned()));
    }
    Ok(StartTag { name, attrs })
}

fn split_name(name: quick_xml::name::QName<'_>) -> Result<QName, BindError> {
    let local = str::from_utf8(name.local_name().into_inner())
        .map_err(|e| BindError::Malformed(format!("invalid UTF-8 in name: {}", e)))?
        .to_owned();
    let prefix = match name.prefix() {
        Some(prefix) => str::from_utf8(prefix.into_inner())
            .map_err(|e| BindError::Malformed(format!("invalid UTF-8 in prefix: {}", e)))?
            .to_owned(),
        None => String::new(),
    };
    Ok(QName { space: prefix, local })
}
