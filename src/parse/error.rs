use crate::prelude::*;

use super::event_summary::EventSummary;

use quick_xml::name::QName;

#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("Error parsing mesh file header: {0}")]
    Header(Header),
    #[error("Error parsing mesh file attributes: {0}")]
    Attributes(Attributes),
    #[error("Error parsing mesh file dimensions: {0}")]
    Dimensions(Dimensions),
    #[error("Error parsing mesh file variables: {0}")]
    Variables(Variables),
    #[error("Error reading mesh schema: {0}")]
    Schema(Schema),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Header {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Attributes {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Dimensions {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    InvalidNumber(InvalidNumber),
    #[error("{0}")]
    Inconsistent(Inconsistent),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Variables {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    InvalidArray(InvalidArray),
    #[error("{0}")]
    Inconsistent(Inconsistent),
}

/// The document parsed, but does not describe a mesh
#[derive(Debug, thiserror::Error, From)]
pub enum Schema {
    #[error("{0}")]
    MissingItem(MissingSchemaItem),
    #[error("{0}")]
    Inconsistent(Inconsistent),
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml element: {xml_err}")]
pub struct MalformedXml {
    xml_err: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml attribute: {att_err}")]
pub struct MalformedAttribute {
    att_err: quick_xml::events::attributes::AttrError,
}

#[derive(From, Display, Debug)]
#[display(fmt = "unexpected element. Expected `{expected_name}`, got {actual_element}")]
pub struct UnexpectedElement {
    expected_name: String,
    actual_element: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new<T: Into<String>>(expected_name: T, actual_element: EventSummary) -> Self {
        Self {
            expected_name: expected_name.into(),
            actual_element,
        }
    }
}

#[derive(From, Display, Debug, Constructor)]
#[display(
    fmt = "unexpected attribute value for {attribute_name} in {element_name} element: expected {expected_value}, got {actual_value}"
)]
pub struct UnexpectedAttributeValue {
    pub(crate) element_name: String,
    pub(crate) attribute_name: String,
    pub(crate) expected_value: String,
    pub(crate) actual_value: ParsedNameOrBytes,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "missing attribute `{attribute_name}` in {element_name} element")]
pub struct MissingAttribute {
    element_name: String,
    attribute_name: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "attribute `{attribute_name}` of {element_name} is not a valid number: `{value}`")]
pub struct InvalidNumber {
    element_name: String,
    attribute_name: String,
    value: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "Failed to decode the values of variable `{array_name}`: {detail}")]
pub struct InvalidArray {
    array_name: String,
    detail: &'static str,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "{detail}")]
pub struct Inconsistent {
    detail: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "the file has no {what} `{name}`")]
pub struct MissingSchemaItem {
    what: &'static str,
    name: String,
}

#[derive(From, Display, Debug)]
pub enum ParsedNameOrBytes {
    #[display(fmt = "{_0}")]
    Utf8(String),
    #[display(fmt = "{_0:?} (cannot convert to UTF8 string)")]
    Bytes(Vec<u8>),
}

impl ParsedNameOrBytes {
    fn new(bytes: &[u8]) -> Self {
        let vec = Vec::from(bytes);
        match String::from_utf8(vec) {
            Ok(string) => Self::Utf8(string),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }
}

impl<'a> From<QName<'a>> for ParsedNameOrBytes {
    fn from(x: QName) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<std::borrow::Cow<'a, [u8]>> for ParsedNameOrBytes {
    fn from(x: std::borrow::Cow<'a, [u8]>) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<&'a str> for ParsedNameOrBytes {
    fn from(x: &str) -> Self {
        Self::Utf8(x.into())
    }
}
