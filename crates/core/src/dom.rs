use indexmap::IndexMap;

/// Handle to a node in a [`Document`].
///
/// Handles stay valid until the node is removed; every operation on a
/// removed handle is a silent no-op so renderer teardown can never fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    styles: IndexMap<String, String>,
    attrs: IndexMap<String, String>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

// Tags serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

/// Retained element tree standing in for the browser DOM.
///
/// The page controller owns the root container; each renderer exclusively
/// owns the subtree it created and no renderer reads another's subtree.
/// Removed node slots are tombstoned rather than reused, so a stale handle
/// can never alias a live node.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl Document {
    pub fn new(root_tag: &str) -> Self {
        let mut document = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        document.root = document.create_element(root_tag);
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Some(Node {
            tag: tag.to_string(),
            ..Node::default()
        }));
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Detach a node from its parent and free its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        let parent = match self.node(id) {
            Some(node) => node.parent,
            None => return,
        };
        if let Some(parent) = parent {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&child| child != id);
            }
        }
        self.free_subtree(id);
    }

    /// Free every child subtree, leaving the node itself in place.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = match self.node_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let node = match self.nodes.get_mut(id.0).and_then(Option::take) {
            Some(node) => node,
            None => return,
        };
        for child in node.children {
            self.free_subtree(child);
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            node.text = Some(text.to_string());
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.text.as_deref())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|node| node.attrs.get(name)).map(String::as_str)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(id) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id)
            .and_then(|node| node.styles.get(property))
            .map(String::as_str)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id)
            .map(|node| node.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Serialize the whole document, root element included.
    pub fn to_html(&self) -> String {
        self.html_for(self.root)
    }

    /// Serialize one subtree.
    pub fn html_for(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = match self.node(id) {
            Some(node) => node,
            None => return,
        };
        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_attr(&node.classes.join(" ")));
            out.push('"');
        }
        if !node.styles.is_empty() {
            let style = node
                .styles
                .iter()
                .map(|(property, value)| format!("{}: {}", property, value))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(" style=\"");
            out.push_str(&escape_attr(&style));
            out.push('"');
        }
        for (name, value) in &node.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        if VOID_TAGS.contains(&node.tag.as_str()) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        }
        for &child in &node.children {
            self.write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_serializes_a_tree() {
        let mut dom = Document::new("div");
        let list = dom.create_element("ul");
        dom.add_class(list, "info_list");
        let item = dom.create_element("li");
        dom.set_text(item, "pan 0->255->0 1.5");
        dom.append_child(list, item);
        dom.append_child(dom.root(), list);

        assert_eq!(
            dom.to_html(),
            "<div><ul class=\"info_list\"><li>pan 0-&gt;255-&gt;0 1.5</li></ul></div>"
        );
    }

    #[test]
    fn styles_and_attrs_render_in_insertion_order() {
        let mut dom = Document::new("div");
        let img = dom.create_element("img");
        dom.set_style(img, "display", "block");
        dom.set_style(img, "opacity", "0.5");
        dom.set_attr(img, "src", "/static/img/gobos/stars.png");
        dom.append_child(dom.root(), img);

        assert_eq!(
            dom.html_for(img),
            "<img style=\"display: block; opacity: 0.5\" src=\"/static/img/gobos/stars.png\"/>"
        );

        // Overwriting keeps the original position.
        dom.set_style(img, "display", "none");
        assert!(dom.html_for(img).starts_with("<img style=\"display: none;"));
    }

    #[test]
    fn class_toggling() {
        let mut dom = Document::new("div");
        let row = dom.create_element("tr");
        assert!(!dom.has_class(row, "selected"));
        dom.add_class(row, "selected");
        dom.add_class(row, "selected");
        assert!(dom.has_class(row, "selected"));
        assert_eq!(dom.html_for(row), "<tr class=\"selected\"></tr>");
        dom.remove_class(row, "selected");
        assert!(!dom.has_class(row, "selected"));
    }

    #[test]
    fn remove_frees_the_subtree_and_detaches_from_parent() {
        let mut dom = Document::new("div");
        let table = dom.create_element("table");
        let row = dom.create_element("tr");
        dom.append_child(table, row);
        dom.append_child(dom.root(), table);

        dom.remove(table);
        assert!(!dom.contains(table));
        assert!(!dom.contains(row));
        assert_eq!(dom.to_html(), "<div></div>");
    }

    #[test]
    fn operations_on_removed_handles_are_no_ops() {
        let mut dom = Document::new("div");
        let gone = dom.create_element("span");
        dom.append_child(dom.root(), gone);
        dom.remove(gone);

        dom.remove(gone);
        dom.set_text(gone, "x");
        dom.set_style(gone, "top", "10%");
        dom.add_class(gone, "selected");
        assert!(!dom.has_class(gone, "selected"));
        assert!(dom.children(gone).is_empty());
        assert_eq!(dom.to_html(), "<div></div>");
    }

    #[test]
    fn clear_children_keeps_the_node() {
        let mut dom = Document::new("div");
        let list = dom.create_element("ul");
        let item = dom.create_element("li");
        dom.append_child(list, item);
        dom.append_child(dom.root(), list);

        dom.clear_children(list);
        assert!(dom.contains(list));
        assert!(!dom.contains(item));
        assert_eq!(dom.to_html(), "<div><ul></ul></div>");
    }
}
