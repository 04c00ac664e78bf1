use crate::dataset::{Dataset, VarData, Variable};
use crate::traits::Payload;
use crate::Error;

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

pub(crate) const FORMAT_VERSION: &str = "1.0";

/// Write a whole dataset as an xml mesh file to a `Writer`
///
/// The layout is
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8"?>
/// <MeshFile version="1.0" byte_order="LittleEndian">
///   <Attributes>
///     <Attribute name="title" value="test"/>
///   </Attributes>
///   <Dimensions>
///     <Dimension name="num_nodes" length="3"/>
///     <Dimension name="time_step" length="1" unlimited="true"/>
///   </Dimensions>
///   <Variables>
///     <Variable name="coordx" type="Float64" dims="num_nodes">
///       <Values format="binary">AAAAAAAAAAAAAAAAAADwPwAAAAAAAAAA</Values>
///     </Variable>
///     <Variable name="connect1" type="Int64" dims="num_el_in_blk1 num_nod_per_el1">
///       <Attribute name="elem_type" value="TRI3"/>
///       <Values format="binary">...</Values>
///     </Variable>
///     <Variable name="eb_names" type="String" dims="num_el_blk">
///       <Item value="blk1"/>
///     </Variable>
///   </Variables>
/// </MeshFile>
/// ```
pub fn write_dataset<W: Write>(
    writer: W,
    dataset: &Dataset,
    encoding: Encoding,
) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("MeshFile");
    root.push_attribute(("version", FORMAT_VERSION));
    root.push_attribute(("byte_order", "LittleEndian"));
    writer.write_event(Event::Start(root))?;

    // file level attributes
    writer.write_event(Event::Start(BytesStart::new("Attributes")))?;
    for (name, value) in dataset.attributes() {
        write_attribute(&mut writer, name, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Attributes")))?;

    writer.write_event(Event::Start(BytesStart::new("Dimensions")))?;
    for dim in dataset.dimensions() {
        let length = dim.length.to_string();
        let mut element = BytesStart::new("Dimension");
        element.push_attribute(("name", dim.name.as_str()));
        element.push_attribute(("length", length.as_str()));
        if dim.unlimited {
            element.push_attribute(("unlimited", "true"));
        }
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Dimensions")))?;

    writer.write_event(Event::Start(BytesStart::new("Variables")))?;
    for variable in dataset.variables() {
        write_variable(&mut writer, variable, encoding)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Variables")))?;

    writer.write_event(Event::End(BytesEnd::new("MeshFile")))?;

    Ok(())
}

fn write_attribute<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<(), Error> {
    let mut element = BytesStart::new("Attribute");
    element.push_attribute(("name", name));
    element.push_attribute(("value", value));
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_variable<W: Write>(
    writer: &mut Writer<W>,
    variable: &Variable,
    encoding: Encoding,
) -> Result<(), Error> {
    let dims = variable.dims().join(" ");

    let mut header = BytesStart::new("Variable");
    header.push_attribute(("name", variable.name()));
    header.push_attribute(("type", variable.data().value_type().as_str()));
    header.push_attribute(("dims", dims.as_str()));
    writer.write_event(Event::Start(header))?;

    for (name, value) in variable.attributes() {
        write_attribute(writer, name, value)?;
    }

    match variable.data() {
        VarData::Float64(values) => write_values(writer, values, encoding)?,
        VarData::Int64(values) => write_values(writer, values, encoding)?,
        VarData::Text(items) => {
            for item in items {
                let mut element = BytesStart::new("Item");
                element.push_attribute(("value", item.as_str()));
                writer.write_event(Event::Empty(element))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Variable")))?;
    Ok(())
}

/// write a single numeric payload inside a `<Values>` element
fn write_values<W: Write, T: Payload>(
    writer: &mut Writer<W>,
    values: &[T],
    encoding: Encoding,
) -> Result<(), Error> {
    let mut element = BytesStart::new("Values");
    element.push_attribute(("format", encoding.to_str()));

    if values.is_empty() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    let data = match encoding {
        Encoding::Ascii => {
            let mut data = String::with_capacity(values.len() * 8);
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    data.push(' ');
                }
                value.write_ascii(&mut data);
            }
            data
        }
        Encoding::Binary => {
            let mut bytes = Vec::with_capacity(values.len() * 8);
            for value in values {
                value.write_le(&mut bytes);
            }
            base64::encode(bytes.as_slice())
        }
    };

    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(&data)))?;
    writer.write_event(Event::End(BytesEnd::new("Values")))?;

    Ok(())
}

/// the encoding to use for numeric payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// whitespace separated decimal text
    Ascii,
    /// base64 encoded little endian words
    #[default]
    Binary,
}

impl Encoding {
    pub(crate) fn to_str(&self) -> &'static str {
        match &self {
            Self::Ascii => "ascii",
            Self::Binary => "binary",
        }
    }
}
