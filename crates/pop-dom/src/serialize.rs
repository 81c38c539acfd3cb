//! Markup serialization
//!
//! Attribute order on an element: inline style, properties, the attribute
//! table, `class`, then `data-*` entries.

use crate::{DomTree, ElementData, NodeData, NodeId};

/// Elements rendered self-closing
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "menuitem",
    "meta", "param", "source", "track", "wbr",
];

/// Escape `&`, `<` and `>`
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// [`escape_text`] plus `"`
pub fn escape_attribute_value(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Serialize a node and its subtree to markup
pub fn serialize_node(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Text(text) => out.push_str(&escape_text(&text.content)),
        NodeData::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        NodeData::Document | NodeData::Fragment => {
            for &child in node.children() {
                write_node(tree, child, out);
            }
        }
        NodeData::Element(elem) => write_element(tree, elem, node.children(), out),
    }
}

fn write_element(tree: &DomTree, elem: &ElementData, children: &[NodeId], out: &mut String) {
    let tag = elem.local_tag();

    out.push('<');
    out.push_str(&tag);
    for (name, value) in attribute_list(elem) {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_attribute_value(&value));
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        out.push_str(" />");
        return;
    }
    out.push('>');

    if !children.is_empty() {
        for &child in children {
            write_node(tree, child, out);
        }
    } else if let Some(text) = elem.text_content.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&escape_text(text));
    } else if let Some(html) = elem.inner_html.as_deref() {
        out.push_str(html);
    }

    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn attribute_list(elem: &ElementData) -> Vec<(String, String)> {
    let mut list = Vec::new();
    if !elem.style.is_empty() {
        list.push(("style".to_string(), elem.style.to_css_text()));
    }
    for (name, value) in elem.properties() {
        list.push((name.to_string(), value.to_string()));
    }
    for attr in elem.attributes().iter() {
        list.push((attr.qualified_name(), attr.value.clone()));
    }
    if !elem.class_name.is_empty() {
        list.push(("class".to_string(), elem.class_name.clone()));
    }
    for (key, value) in &elem.dataset {
        list.push((format!("data-{}", key), value.clone()));
    }
    list
}
