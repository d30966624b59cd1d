//! Text layout: one JSON object per node.
//!
//! ```json
//! { "name": "", "type": "{...}", "version": 1, "data": "5", "children": [] }
//! ```
//!
//! Leaf payloads are stored as their text form. Binary payloads are
//! converted with the class serializer when written; nodes read back hold
//! text payloads and are converted when loaded.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::SerializeContext;
use crate::info::TypeUuid;
use crate::interfaces::CodecError;
use crate::stream::StreamError;
use crate::tree::{DataElement, DataElementNode, DataType};

#[derive(Serialize, Deserialize)]
struct TextNode {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default)]
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<TextNode>,
}

pub(crate) fn write_stream(sc: &SerializeContext, root: &DataElementNode, pretty: bool) -> Result<Vec<u8>, StreamError> {
    let node = to_text(sc, root)?;
    let data = if pretty {
        serde_json::to_vec_pretty(&node)?
    } else {
        serde_json::to_vec(&node)?
    };
    Ok(data)
}

pub(crate) fn read_stream(data: &[u8]) -> Result<DataElementNode, StreamError> {
    let node: TextNode = serde_json::from_slice(data)?;
    from_text(node)
}

fn to_text(sc: &SerializeContext, node: &DataElementNode) -> Result<TextNode, StreamError> {
    let element = node.element();
    let buffer = element.buffer();
    let data = match element.data_type() {
        _ if buffer.is_empty() => None,
        DataType::Text => Some(String::from_utf8(buffer.to_vec()).map_err(|_| CodecError::InvalidUtf8)?),
        data_type => {
            let uuid = element.id();
            let serializer = sc
                .find_class_data(uuid, None, 0)
                .and_then(|class| class.serializer())
                .ok_or(StreamError::UnregisteredType { uuid })?;
            Some(serializer.data_to_text(buffer, data_type.is_big_endian())?)
        }
    };

    Ok(TextNode {
        name: element.name().to_string(),
        type_id: element.id().to_string(),
        version: element.version(),
        data,
        children: node
            .children()
            .iter()
            .map(|child| to_text(sc, child))
            .collect::<Result<_, _>>()?,
    })
}

fn from_text(node: TextNode) -> Result<DataElementNode, StreamError> {
    let id = TypeUuid::parse(&node.type_id).ok_or(StreamError::InvalidTypeId(node.type_id))?;
    let mut element = DataElement::new(node.name, id, node.version);
    element.set_buffer(DataType::Text, node.data.map(String::into_bytes).unwrap_or_default());

    let mut result = DataElementNode::from_element(element);
    for child in node.children {
        result.add_element_node(from_text(child)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_payloads_become_text() {
        let sc = SerializeContext::new();
        let mut node = DataElementNode::new("");
        node.set_data(&sc, &42_i32).unwrap();

        let json = write_stream(&sc, &node, false).unwrap();
        let text = core::str::from_utf8(&json).unwrap();
        assert!(text.contains("\"data\":\"42\""));
        assert!(!text.contains("children"));

        let mut read = read_stream(&json).unwrap();
        assert_eq!(read.data_type(), DataType::Text);
        assert_eq!(read.type_uuid(), node.type_uuid());

        let mut value = 0_i32;
        read.get_data(&sc, &mut value).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn bad_type_id() {
        let json = br#"{"type":"not a uuid"}"#;
        assert!(matches!(read_stream(json), Err(StreamError::InvalidTypeId(_))));
        assert!(matches!(read_stream(b"{"), Err(StreamError::Json(_))));
    }
}
