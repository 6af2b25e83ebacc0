use super::{NodeId, Tree};

pub(super) fn write_element(tree: &Tree, node: NodeId, out: &mut String) {
    let Some(el) = tree.get(node) else {
        return;
    };

    out.push('<');
    out.push_str(&el.tag);
    if let Some(id) = &el.id {
        push_attr(out, "id", id);
    }
    if !el.classes.is_empty() {
        push_attr(out, "class", &el.classes.join(" "));
    }
    if !el.styles.is_empty() {
        let style = el
            .styles
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ");
        push_attr(out, "style", &style);
    }
    if el.disabled {
        out.push_str(" disabled");
    }
    out.push('>');

    // Raw text elements keep their content unescaped.
    if matches!(el.tag.as_str(), "style" | "script") {
        out.push_str(&el.text);
    } else {
        out.push_str(&escape(&el.text));
    }
    for child in &el.children {
        write_element(tree, *child, out);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value).replace('"', "&quot;"));
    out.push('"');
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
