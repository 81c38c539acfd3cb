//! Markup output of realistic documents

use std::rc::Rc;

use pop_dom::{Document, Event, Listener, HTML_NAMESPACE};

#[test]
fn test_game_page_markup() {
    let mut doc = Document::new();
    let body = doc.body();

    let canvas = doc.create_element("canvas");
    {
        let elem = doc.tree_mut().element_mut(canvas).unwrap();
        elem.set_property("id", "screen").unwrap();
        elem.set_property("width", 320u32).unwrap();
        elem.set_property("height", 240u32).unwrap();
        elem.style.set("imageRendering", "pixelated");
        elem.class_name = "game main".into();
        elem.set_data("tick", "0");
        elem.set_attribute("aria-label", "a \"quoted\" <label>");
    }
    let comment = doc.create_comment(" hud ");
    let text = doc.create_text_node("Health & armor");
    let input = doc.create_element("input");

    let tree = doc.tree_mut();
    tree.append_child(body, canvas).unwrap();
    tree.append_child(body, comment).unwrap();
    tree.append_child(body, text).unwrap();
    tree.append_child(body, input).unwrap();

    assert_eq!(
        doc.serialize(),
        concat!(
            "<html><head></head><body>",
            "<canvas style=\"image-rendering:pixelated;\" id=\"screen\" width=\"320\" height=\"240\" ",
            "aria-label=\"a &quot;quoted&quot; &lt;label&gt;\" class=\"game main\" data-tick=\"0\"></canvas>",
            "<!-- hud -->",
            "Health &amp; armor",
            "<input type=\"text\" />",
            "</body></html>",
        )
    );
}

#[test]
fn test_namespaced_attribute_prefix() {
    let mut doc = Document::new();
    let svg = doc.create_element_ns(Some("http://www.w3.org/2000/svg"), "svg");
    let image = doc.create_element_ns(Some("http://www.w3.org/2000/svg"), "image");
    doc.tree_mut()
        .element_mut(image)
        .unwrap()
        .set_attribute_ns(Some("http://www.w3.org/1999/xlink"), "xlink:href", "frame.png");
    doc.tree_mut().append_child(svg, image).unwrap();

    assert_eq!(
        pop_dom::serialize_node(doc.tree(), svg),
        "<svg><image xlink:href=\"frame.png\"></image></svg>"
    );
    let elem = doc.tree().element(image).unwrap();
    assert_eq!(
        elem.get_attribute_ns(Some("http://www.w3.org/1999/xlink"), "href").as_deref(),
        Some("frame.png")
    );
    assert_eq!(elem.namespace.as_deref(), Some("http://www.w3.org/2000/svg"));
    assert_ne!(elem.namespace.as_deref(), Some(HTML_NAMESPACE));
}

#[test]
fn test_event_from_leaf_reaches_document() {
    let mut doc = Document::new();
    let body = doc.body();
    let div = doc.create_element("div");
    let span = doc.create_element("span");
    doc.tree_mut().append_child(body, div).unwrap();
    doc.tree_mut().append_child(div, span).unwrap();

    let seen = Rc::new(std::cell::Cell::new(None));
    let sink = Rc::clone(&seen);
    let listener: Listener = Rc::new(move |e: &mut Event| sink.set(e.current_target));
    assert!(doc.add_event_listener("keydown", listener));

    let mut event = Event::new("keydown");
    let outcome = doc.dispatch_event(span, &mut event).unwrap();

    assert_eq!(seen.get(), Some(doc.root()));
    assert_eq!(outcome.handled_by, Some(doc.root()));
    assert_eq!(event.target, Some(span));
}
