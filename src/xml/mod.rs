//! XML form of metadata records
//!
//! The root element is named after the entity and every dotted segment
//! becomes a nested element:
//!
//! ```xml
//! <station>
//!   <id type="string">MT001</id>
//!   <location>
//!     <latitude type="float" units="degrees">40.5</latitude>
//!     <x type="float" units="meters"/>
//!   </location>
//!   <channels_recorded type="name_list"><item>ex</item><item>ey</item></channels_recorded>
//! </station>
//! ```
//!
//! Unset leaves are self-closing elements, while an empty string is written
//! as an open/close pair. Output is compact so leaf text is never padded
//! with indentation. Reading is guided by the entity schema: leaf text is
//! handed to the validator, which restores the declared type.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use crate::error::{Format, MetadataError, Result};
use crate::keys::{self, join_path};
use crate::record::MetadataRecord;
use crate::schema::{EntitySchema, FieldSpec, FieldType};

const ITEM_ELEMENT: &str = "item";

/// Serialize a record to an XML document
pub fn write_record(record: &MetadataRecord) -> Result<String> {
    let tree = keys::nest(&record.to_flat())?;
    let Value::Object(tree) = tree else {
        return Err(MetadataError::serialization(Format::Xml, "record did not nest into an object"));
    };

    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new(record.entity())))?;
    write_tree(&mut writer, record.schema(), &tree, "")?;
    emit(&mut writer, Event::End(BytesEnd::new(record.entity())))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| MetadataError::serialization(Format::Xml, e.to_string()))
}

/// Parse an XML document into a mapping that
/// [`MetadataRecord::update_from_dict`] accepts.
///
/// Elements the schema does not know are kept as text so the record's
/// unknown-field policy decides what happens to them.
pub fn read_dict(schema: &EntitySchema, xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    if root.name != schema.name() {
        return Err(MetadataError::parse(
            Format::Xml,
            format!(
                "expected root element <{}>, found <{}>",
                schema.name(),
                root.name
            ),
        ));
    }
    let mut flat = Map::new();
    collect_fields(schema, &root, "", &mut flat);
    Ok(Value::Object(flat))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| MetadataError::serialization(Format::Xml, e.to_string()))
}

fn write_tree(
    writer: &mut Writer<Vec<u8>>,
    schema: &EntitySchema,
    tree: &Map<String, Value>,
    prefix: &str,
) -> Result<()> {
    for (key, value) in tree {
        let path = join_path(prefix, key);
        if let Some(spec) = schema.field(&path) {
            write_leaf(writer, schema, spec, key, value)?;
            continue;
        }
        match value {
            Value::Object(child) => {
                emit(writer, Event::Start(BytesStart::new(key.as_str())))?;
                write_tree(writer, schema, child, &path)?;
                emit(writer, Event::End(BytesEnd::new(key.as_str())))?;
            }
            other => write_text(writer, BytesStart::new(key.as_str()), other)?,
        }
    }
    Ok(())
}

fn write_leaf(
    writer: &mut Writer<Vec<u8>>,
    schema: &EntitySchema,
    spec: &FieldSpec,
    key: &str,
    value: &Value,
) -> Result<()> {
    let mut start = BytesStart::new(key);
    start.push_attribute(("type", spec.field_type.as_str()));
    if let Some(units) = &spec.units {
        start.push_attribute(("units", units.as_str()));
    }

    let Value::Array(items) = value else {
        return write_text(writer, start, value);
    };

    emit(writer, Event::Start(start))?;
    let item_schema = schema.item_schema(&spec.name);
    for item in items {
        match (item, item_schema) {
            (Value::Object(fields), Some(item_schema)) => {
                emit(writer, Event::Start(BytesStart::new(ITEM_ELEMENT)))?;
                write_tree(writer, item_schema, fields, "")?;
                emit(writer, Event::End(BytesEnd::new(ITEM_ELEMENT)))?;
            }
            (other, _) => write_text(writer, BytesStart::new(ITEM_ELEMENT), other)?,
        }
    }
    emit(writer, Event::End(BytesEnd::new(key)))
}

fn write_text(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>, value: &Value) -> Result<()> {
    let text = match value {
        Value::Null => return emit(writer, Event::Empty(start)),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let end = start.to_end().into_owned();
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(&text)))?;
    emit(writer, Event::End(end))
}

/// Element tree of a parsed document
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
    self_closing: bool,
}

impl XmlElement {
    fn new(name: String, self_closing: bool) -> Self {
        Self {
            name,
            self_closing,
            ..Default::default()
        }
    }
}

fn parse_error(message: impl Into<String>) -> MetadataError {
    MetadataError::parse(Format::Xml, message)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn parse_tree(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(XmlElement::new(element_name(&e), false)),
            Ok(Event::Empty(e)) => {
                attach(&mut stack, &mut root, XmlElement::new(element_name(&e), true))?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_error("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| parse_error(err.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(parse_error("text outside the root element")),
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(parse_error(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| parse_error("document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(parse_error("more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn collect_fields(
    schema: &EntitySchema,
    element: &XmlElement,
    prefix: &str,
    flat: &mut Map<String, Value>,
) {
    for child in &element.children {
        let path = join_path(prefix, &child.name);
        if let Some(spec) = schema.field(&path) {
            let value = leaf_value(schema, spec, child);
            flat.insert(path, value);
        } else if schema.is_prefix(&path) {
            collect_fields(schema, child, &path, flat);
        } else {
            flat.insert(path, Value::String(child.text.clone()));
        }
    }
}

fn leaf_value(schema: &EntitySchema, spec: &FieldSpec, element: &XmlElement) -> Value {
    if element.self_closing {
        return Value::Null;
    }
    match spec.field_type {
        FieldType::NameList if element.children.is_empty() && element.text.trim().is_empty() => {
            Value::Array(Vec::new())
        }
        FieldType::NameList if element.children.is_empty() => Value::String(element.text.clone()),
        FieldType::NameList => Value::Array(
            element
                .children
                .iter()
                .map(|item| Value::String(item.text.clone()))
                .collect(),
        ),
        FieldType::ObjectList => {
            let item_schema = schema.item_schema(&spec.name);
            Value::Array(
                element
                    .children
                    .iter()
                    .map(|item| {
                        let mut fields = Map::new();
                        if let Some(item_schema) = item_schema {
                            collect_fields(item_schema, item, "", &mut fields);
                        }
                        Value::Object(fields)
                    })
                    .collect(),
            )
        }
        _ => Value::String(element.text.clone()),
    }
}
