//! Shared helpers for the export writers.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;

/// GraphML namespace.
pub const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

/// XML Schema instance namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// GraphML schema location.
pub const GRAPHML_SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";

/// Write a `<data key="...">text</data>` element.
pub fn write_data_element<W: Write>(writer: &mut Writer<W>, key: &str, text: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    writer.write_event(Event::Start(data))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

/// Write a GraphML `<key>` declaration.
pub fn write_key<W: Write>(
    writer: &mut Writer<W>,
    id: &str,
    domain: &str,
    attr_type: &str,
) -> Result<()> {
    let mut key = BytesStart::new("key");
    key.push_attribute(("id", id));
    key.push_attribute(("for", domain));
    key.push_attribute(("attr.name", id));
    key.push_attribute(("attr.type", attr_type));
    writer.write_event(Event::Empty(key))?;
    Ok(())
}

/// Quote a string for DOT, escaping quotes, backslashes and newlines.
pub fn dot_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_quote_escapes() {
        assert_eq!(dot_quote("a \"b\"\nc"), r#""a \"b\"\nc""#);
        assert_eq!(dot_quote(r"x\y"), r#""x\\y""#);
    }
}
