//! reading and parsing xml mesh files
//!
//! The reader mirrors [`write_dataset`](crate::write_store::write_dataset): a `MeshFile` root
//! holding `Attributes`, `Dimensions` and `Variables`, in that order. Everything is read
//! back into a [`Dataset`]; interpreting the dataset as a mesh is left to the
//! [`File`](crate::File) session.

mod error;
mod event_summary;

pub use error::ParseError;
pub(crate) use error::{Inconsistent, MissingSchemaItem, Schema};
use event_summary::EventSummary;

use crate::dataset::{Dataset, Dimension, ValueType, VarData, Variable};
use crate::prelude::*;
use crate::write_store::FORMAT_VERSION;

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::reader::Reader;

/// read in and parse an entire mesh file for a given path
pub fn read_dataset(path: &Path) -> Result<Dataset, Error> {
    let file = std::fs::File::open(path)?;
    let buf_reader = std::io::BufReader::new(file);
    let reader = Reader::from_reader(buf_reader);

    log::debug!("parsing mesh file {}", path.display());

    let dataset = parse_dataset(reader)?;
    Ok(dataset)
}

/// parse a full xml document into a dataset
pub fn parse_dataset<R: BufRead>(mut reader: Reader<R>) -> Result<Dataset, ParseError> {
    let mut buffer = Vec::new();
    let mut dataset = Dataset::new();

    // ignore whitespace in the reader
    reader.trim_text(true);

    read_header(&mut reader, &mut buffer)?;
    read_attributes(&mut reader, &mut buffer, &mut dataset)?;
    read_dimensions(&mut reader, &mut buffer, &mut dataset)?;
    read_variables(&mut reader, &mut buffer, &mut dataset)?;

    Ok(dataset)
}

fn read_header<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<(), error::Header> {
    // find a MeshFile leading element
    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        if let Event::Start(inner_start) = &event {
            if inner_start.name() != QName(b"MeshFile") {
                let actual_event = EventSummary::new(&event);
                let element_mismatch = error::UnexpectedElement::new("MeshFile", actual_event);
                return Err(error::Header::from(element_mismatch));
            }

            for attribute in inner_start.attributes() {
                let attribute = attribute.map_err(error::MalformedAttribute::from)?;

                if attribute.key.as_ref() == b"version" {
                    check_attribute_value(attribute, "MeshFile", "version", FORMAT_VERSION)?;
                } else if attribute.key.as_ref() == b"byte_order" {
                    check_attribute_value(attribute, "MeshFile", "byte_order", "LittleEndian")?;
                }
            }

            return Ok(());
        }

        // the xml declaration and comments may precede the root
        if matches!(event, Event::Decl(_) | Event::Comment(_)) {
            continue;
        }

        let actual_event = if let Event::Eof = event {
            EventSummary::eof()
        } else {
            EventSummary::new(&event)
        };
        let element_mismatch = error::UnexpectedElement::new("MeshFile", actual_event);
        return Err(error::Header::from(element_mismatch));
    }
}

fn read_attributes<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    dataset: &mut Dataset,
) -> Result<(), error::Attributes> {
    if read_empty_or_starting_element::<error::Attributes, _>(reader, buffer, "Attributes")? {
        return Ok(());
    }

    while let Some((name, value)) =
        read_attribute_element::<error::Attributes, _>(reader, buffer, "Attributes")?
    {
        dataset.set_attribute(name, value);
    }

    Ok(())
}

fn read_dimensions<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    dataset: &mut Dataset,
) -> Result<(), error::Dimensions> {
    if read_empty_or_starting_element::<error::Dimensions, _>(reader, buffer, "Dimensions")? {
        return Ok(());
    }

    loop {
        buffer.clear();
        let element = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        let dimension = match &element {
            Event::Empty(start) if start.name().as_ref() == b"Dimension" => {
                let name = owned_attribute::<error::Dimensions>(start, "name", "Dimension")?;
                let length = owned_attribute::<error::Dimensions>(start, "length", "Dimension")?;
                let unlimited = optional_attribute::<error::Dimensions>(start, "unlimited")?;

                let length = length.parse::<usize>().map_err(|_| {
                    error::InvalidNumber::new("Dimension".into(), "length".into(), length.clone())
                })?;

                Dimension::new(name, length, unlimited.as_deref() == Some("true"))
            }
            Event::End(end) if end.name().as_ref() == b"Dimensions" => break,
            _ => {
                let actual_event = EventSummary::new(&element);
                let unexpected = error::UnexpectedElement::new("Dimension", actual_event);
                return Err(error::Dimensions::from(unexpected));
            }
        };

        if dimension.unlimited && dataset.record_dimension().is_some() {
            let detail = format!("second unlimited dimension `{}`", dimension.name);
            return Err(error::Inconsistent::new(detail).into());
        }

        dataset
            .insert_dimension(dimension)
            .map_err(|e| error::Inconsistent::new(e.to_string()))?;
    }

    Ok(())
}

fn read_variables<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    dataset: &mut Dataset,
) -> Result<(), error::Variables> {
    if read_empty_or_starting_element::<error::Variables, _>(reader, buffer, "Variables")? {
        return Ok(());
    }

    loop {
        let header = {
            buffer.clear();
            let element = reader
                .read_event_into(buffer)
                .map_err(error::MalformedXml::from)?;

            match &element {
                Event::Start(start) if start.name().as_ref() == b"Variable" => {
                    Some((VariableHeader::from_start(start)?, false))
                }
                Event::Empty(start) if start.name().as_ref() == b"Variable" => {
                    Some((VariableHeader::from_start(start)?, true))
                }
                Event::End(end) if end.name().as_ref() == b"Variables" => None,
                _ => {
                    let actual_event = EventSummary::new(&element);
                    let unexpected = error::UnexpectedElement::new("Variable", actual_event);
                    return Err(error::Variables::from(unexpected));
                }
            }
        };

        let (header, was_empty) = match header {
            Some(header) => header,
            None => break,
        };

        let variable = if was_empty {
            header.finish(None, Vec::new(), BTreeMap::new())?
        } else {
            read_variable_body(reader, buffer, header)?
        };

        log::trace!("parsed variable {}", variable.name());

        dataset
            .insert_variable(variable)
            .map_err(|e| error::Inconsistent::new(e.to_string()))?;
    }

    // closing tag of the root element
    read_ending_element::<error::Variables, _>(reader, buffer, "MeshFile")?;

    Ok(())
}

/// the owned contents of a `<Variable>` start tag
struct VariableHeader {
    name: String,
    value_type: ValueType,
    dims: Vec<String>,
}

impl VariableHeader {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, error::Variables> {
        let name = owned_attribute::<error::Variables>(start, "name", "Variable")?;
        let type_tag = owned_attribute::<error::Variables>(start, "type", "Variable")?;
        let dims = owned_attribute::<error::Variables>(start, "dims", "Variable")?;

        let value_type = ValueType::from_tag(type_tag.as_bytes()).ok_or_else(|| {
            error::UnexpectedAttributeValue::new(
                "Variable".into(),
                "type".into(),
                "Float64, Int64 or String".into(),
                type_tag.as_str().into(),
            )
        })?;

        let dims = dims.split_whitespace().map(String::from).collect();

        Ok(Self {
            name,
            value_type,
            dims,
        })
    }

    /// combine the header with whatever payload was found in the body
    fn finish(
        self,
        values: Option<VarData>,
        items: Vec<String>,
        attributes: BTreeMap<String, String>,
    ) -> Result<Variable, error::Variables> {
        let data = match (self.value_type, values) {
            (ValueType::Text, None) => VarData::Text(items),
            (ValueType::Float64, None) => VarData::Float64(Vec::new()),
            (ValueType::Int64, None) => VarData::Int64(Vec::new()),
            (_, Some(values)) => values,
        };

        Ok(Variable {
            name: self.name,
            dims: self.dims,
            data,
            attributes,
        })
    }
}

/// what a single event inside of a `<Variable>` contributes
enum BodyItem {
    Attribute(String, String),
    Item(String),
    EmptyValues,
    Values(String),
    End,
}

fn read_variable_body<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    header: VariableHeader,
) -> Result<Variable, error::Variables> {
    let mut attributes = BTreeMap::new();
    let mut items = Vec::new();
    let mut values = None;

    loop {
        let item = {
            buffer.clear();
            let element = reader
                .read_event_into(buffer)
                .map_err(error::MalformedXml::from)?;

            match &element {
                Event::Empty(start) if start.name().as_ref() == b"Attribute" => {
                    let name = owned_attribute::<error::Variables>(start, "name", "Attribute")?;
                    let value = owned_attribute::<error::Variables>(start, "value", "Attribute")?;
                    BodyItem::Attribute(name, value)
                }
                Event::Empty(start) if start.name().as_ref() == b"Item" => {
                    BodyItem::Item(owned_attribute::<error::Variables>(start, "value", "Item")?)
                }
                Event::Empty(start) if start.name().as_ref() == b"Values" => BodyItem::EmptyValues,
                Event::Start(start) if start.name().as_ref() == b"Values" => {
                    let format = owned_attribute::<error::Variables>(start, "format", "Values")?;
                    BodyItem::Values(format)
                }
                Event::End(end) if end.name().as_ref() == b"Variable" => BodyItem::End,
                _ => {
                    let actual_event = EventSummary::new(&element);
                    let unexpected = error::UnexpectedElement::new("Values", actual_event);
                    return Err(error::Variables::from(unexpected));
                }
            }
        };

        match item {
            BodyItem::Attribute(name, value) => {
                attributes.insert(name, value);
            }
            BodyItem::Item(value) => items.push(value),
            BodyItem::EmptyValues => values = Some(empty_payload(&header)?),
            BodyItem::Values(format) => {
                let text = read_body_text(reader, buffer)?;
                values = Some(decode_payload(&header, &format, &text)?);
                read_ending_element::<error::Variables, _>(reader, buffer, "Values")?;
            }
            BodyItem::End => break,
        }
    }

    header.finish(values, items, attributes)
}

fn empty_payload(header: &VariableHeader) -> Result<VarData, error::Variables> {
    match header.value_type {
        ValueType::Float64 => Ok(VarData::Float64(Vec::new())),
        ValueType::Int64 => Ok(VarData::Int64(Vec::new())),
        ValueType::Text => {
            let detail = "text variables hold items, not values";
            Err(error::InvalidArray::new(header.name.clone(), detail).into())
        }
    }
}

fn decode_payload(
    header: &VariableHeader,
    format: &str,
    text: &str,
) -> Result<VarData, error::Variables> {
    if format != "binary" && format != "ascii" {
        let unexpected = error::UnexpectedAttributeValue::new(
            "Values".into(),
            "format".into(),
            "binary or ascii".into(),
            format.into(),
        );
        return Err(unexpected.into());
    }

    let data = match header.value_type {
        ValueType::Float64 => f64::wrap(decode_values::<f64>(text, format, &header.name)?),
        ValueType::Int64 => i64::wrap(decode_values::<i64>(text, format, &header.name)?),
        ValueType::Text => return empty_payload(header),
    };

    Ok(data)
}

/// decode the text of a `<Values>` element
fn decode_values<T: Payload>(
    text: &str,
    format: &str,
    array_name: &str,
) -> Result<Vec<T>, error::InvalidArray> {
    if format == "ascii" {
        return text
            .split_ascii_whitespace()
            .map(|x| {
                T::parse_ascii(x).ok_or_else(|| {
                    error::InvalidArray::new(array_name.into(), "number could not be parsed")
                })
            })
            .collect();
    }

    let numerical_bytes = base64::decode(text.trim())
        .map_err(|_| error::InvalidArray::new(array_name.into(), "invalid base64 payload"))?;

    if numerical_bytes.len() % 8 != 0 {
        return Err(error::InvalidArray::new(
            array_name.into(),
            "payload is not a whole number of 8 byte words",
        ));
    }

    Ok(numerical_bytes.chunks_exact(8).map(T::read_le).collect())
}

/// Read the next `<Attribute name=".." value=".."/>` inside `parent`, or `None` once the
/// parent closes
fn read_attribute_element<E, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    parent: &str,
) -> Result<Option<(String, String)>, E>
where
    E: From<error::UnexpectedElement>
        + From<error::MalformedXml>
        + From<error::MalformedAttribute>
        + From<error::MissingAttribute>,
{
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    match &element {
        Event::Empty(start) if start.name().as_ref() == b"Attribute" => {
            let name = owned_attribute::<E>(start, "name", "Attribute")?;
            let value = owned_attribute::<E>(start, "value", "Attribute")?;
            Ok(Some((name, value)))
        }
        Event::End(end) if end.name().as_ref() == parent.as_bytes() => Ok(None),
        _ => {
            let actual_event = EventSummary::new(&element);
            let unexpected = error::UnexpectedElement::new("Attribute", actual_event);
            Err(E::from(unexpected))
        }
    }
}

/// returns `true` if the element was empty (has no children)
fn read_empty_or_starting_element<E, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    expected_name: &str,
) -> Result<bool, E>
where
    E: From<error::UnexpectedElement> + From<error::MalformedXml>,
{
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    let (was_empty, name_matches) = match &element {
        Event::Empty(empty) => (true, empty.name().as_ref() == expected_name.as_bytes()),
        Event::Start(start) => (false, start.name().as_ref() == expected_name.as_bytes()),
        _ => (false, false),
    };

    if !name_matches {
        let actual_event = EventSummary::new(&element);
        let unexpected = error::UnexpectedElement::new(expected_name, actual_event);
        return Err(E::from(unexpected));
    }

    Ok(was_empty)
}

fn read_body_text<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<String, error::Variables> {
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    if let Event::Text(text) = &element {
        let text = text.unescape().map_err(error::MalformedXml::from)?;
        Ok(text.into_owned())
    } else {
        let actual_event = EventSummary::new(&element);
        let unexpected = error::UnexpectedElement::new("body element", actual_event);
        Err(error::Variables::from(unexpected))
    }
}

fn read_ending_element<E, R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    expected_name: &str,
) -> Result<(), E>
where
    E: From<error::UnexpectedElement> + From<error::MalformedXml>,
{
    buffer.clear();
    let element = reader
        .read_event_into(buffer)
        .map_err(error::MalformedXml::from)?;

    match &element {
        Event::End(end) if end.name().as_ref() == expected_name.as_bytes() => Ok(()),
        Event::End(end) => {
            let actual_event = EventSummary::end(end);
            let unexpected =
                error::UnexpectedElement::new(format!("/{expected_name}"), actual_event);
            Err(E::from(unexpected))
        }
        _ => {
            let actual_event = EventSummary::new(&element);
            let unexpected =
                error::UnexpectedElement::new(format!("/{expected_name}"), actual_event);
            Err(E::from(unexpected))
        }
    }
}

/// find the `attribute_key` attribute on the `element_name` element and unescape its value
fn owned_attribute<E>(
    bytes_start: &BytesStart<'_>,
    attribute_key: &str,
    element_name: &str,
) -> Result<String, E>
where
    E: From<error::MissingAttribute> + From<error::MalformedAttribute> + From<error::MalformedXml>,
{
    match optional_attribute::<E>(bytes_start, attribute_key)? {
        Some(value) => Ok(value),
        None => {
            let err = error::MissingAttribute::new(element_name.into(), attribute_key.into());
            Err(E::from(err))
        }
    }
}

fn optional_attribute<E>(
    bytes_start: &BytesStart<'_>,
    attribute_key: &str,
) -> Result<Option<String>, E>
where
    E: From<error::MalformedAttribute> + From<error::MalformedXml>,
{
    for attribute in bytes_start.attributes() {
        let attribute = attribute.map_err(error::MalformedAttribute::from)?;

        if attribute.key.as_ref() == attribute_key.as_bytes() {
            let value = attribute.unescape_value().map_err(error::MalformedXml::from)?;
            return Ok(Some(value.into_owned()));
        }
    }

    Ok(None)
}

/// ensure that an attribute's value is what we expect it to be, otherwise return an error with
/// some location information
fn check_attribute_value(
    att: Attribute<'_>,
    element_name: &str,
    attribute_name: &str,
    expected_attribute_value: &str,
) -> Result<(), error::UnexpectedAttributeValue> {
    if att.value.as_ref() != expected_attribute_value.as_bytes() {
        let unexpected_value = error::UnexpectedAttributeValue {
            element_name: element_name.into(),
            attribute_name: attribute_name.into(),
            expected_value: expected_attribute_value.into(),
            actual_value: error::ParsedNameOrBytes::from(att.value),
        };

        Err(unexpected_value)
    } else {
        Ok(())
    }
}
