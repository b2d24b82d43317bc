use std::collections::HashMap;

/// Class token whose presence means an element is not rendered.
pub const HIDDEN_CLASS: &str = "hidden";

pub type NodeId = usize;

/// Returns true when `token` appears in the space-delimited `class_name`
/// string. Matching is token-exact: `initialHidden` does not contain
/// `hidden`.
pub fn class_list_contains(class_name: &str, token: &str) -> bool {
    class_name.split_whitespace().any(|t| t == token)
}

/// Appends `token` to `class_name` unless it is already present.
pub fn with_class_token(class_name: &str, token: &str) -> String {
    if class_list_contains(class_name, token) {
        return class_name.to_string();
    }
    if class_name.trim().is_empty() {
        return token.to_string();
    }
    format!("{} {}", class_name.trim_end(), token)
}

/// Removes every occurrence of `token` from `class_name`, preserving the
/// order of the remaining tokens.
pub fn without_class_token(class_name: &str, token: &str) -> String {
    class_name
        .split_whitespace()
        .filter(|t| *t != token)
        .collect::<Vec<_>>()
        .join(" ")
}

/// What the banner lifecycle needs from the host's render tree. Hosts with
/// a real document implement this over their own node handles; tests and
/// the demo use [`PageDom`].
pub trait DomAdapter {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// First descendant of `root` (depth-first) carrying `class` as a token.
    fn descendant_with_class(&self, root: NodeId, class: &str) -> Option<NodeId>;

    fn class_name(&self, node: NodeId) -> &str;

    fn set_class_name(&mut self, node: NodeId, class_name: &str);

    /// One-shot markers stashed on an element, analogous to `data-*`
    /// attributes.
    fn data_flag(&self, node: NodeId, key: &str) -> bool;

    fn set_data_flag(&mut self, node: NodeId, key: &str);

    fn has_class(&self, node: NodeId, token: &str) -> bool {
        class_list_contains(self.class_name(node), token)
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.has_class(node, HIDDEN_CLASS)
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        let updated = if hidden {
            with_class_token(self.class_name(node), HIDDEN_CLASS)
        } else {
            without_class_token(self.class_name(node), HIDDEN_CLASS)
        };
        self.set_class_name(node, &updated);
    }
}

#[derive(Debug, Clone)]
struct ElementNode {
    tag_name: String,
    class_name: String,
    dataset: HashMap<String, String>,
    children: Vec<NodeId>,
}

/// Interaction-layer mirror of the host page: just enough of an element
/// tree to look elements up, edit class strings and stash data flags.
#[derive(Debug, Clone)]
pub struct PageDom {
    nodes: Vec<ElementNode>,
    id_index: HashMap<String, NodeId>,
}

impl PageDom {
    /// The implicit body element every page starts with.
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![ElementNode {
                tag_name: "body".to_string(),
                class_name: String::new(),
                dataset: HashMap::new(),
                children: Vec::new(),
            }],
            id_index: HashMap::new(),
        }
    }

    pub fn insert_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        id: Option<&str>,
        class_name: &str,
    ) -> NodeId {
        let node_id = self.nodes.len();
        self.nodes.push(ElementNode {
            tag_name: tag_name.to_string(),
            class_name: class_name.to_string(),
            dataset: HashMap::new(),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(node_id);
        if let Some(id) = id {
            self.id_index.insert(id.to_string(), node_id);
        }
        node_id
    }

    pub fn tag_name(&self, node: NodeId) -> &str {
        &self.nodes[node].tag_name
    }
}

impl Default for PageDom {
    fn default() -> Self {
        Self::new()
    }
}

impl DomAdapter for PageDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    fn descendant_with_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.nodes[root].children.clone();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if class_list_contains(&self.nodes[node].class_name, class) {
                return Some(node);
            }
            for child in self.nodes[node].children.iter().rev() {
                stack.push(*child);
            }
        }
        None
    }

    fn class_name(&self, node: NodeId) -> &str {
        &self.nodes[node].class_name
    }

    fn set_class_name(&mut self, node: NodeId, class_name: &str) {
        self.nodes[node].class_name = class_name.to_string();
    }

    fn data_flag(&self, node: NodeId, key: &str) -> bool {
        self.nodes[node].dataset.contains_key(key)
    }

    fn set_data_flag(&mut self, node: NodeId, key: &str) {
        self.nodes[node]
            .dataset
            .insert(key.to_string(), "true".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_matching_is_exact() {
        assert!(class_list_contains("error-message-div hidden", "hidden"));
        assert!(!class_list_contains("error-message-div initialHidden", "hidden"));
        assert!(!class_list_contains("", "hidden"));
    }

    #[test]
    fn append_is_idempotent() {
        let once = with_class_token("error-message-div", "hidden");
        assert_eq!(once, "error-message-div hidden");
        assert_eq!(with_class_token(&once, "hidden"), once);
    }

    #[test]
    fn append_to_empty_is_just_the_token() {
        assert_eq!(with_class_token("", "hidden"), "hidden");
    }

    #[test]
    fn remove_preserves_other_tokens() {
        assert_eq!(
            without_class_token("error-message-div hidden initialHidden", "hidden"),
            "error-message-div initialHidden"
        );
    }

    #[test]
    fn descendant_lookup_is_depth_first() {
        let mut page = PageDom::new();
        let outer = page.insert_element(PageDom::ROOT, "div", Some("outer"), "panel");
        let inner = page.insert_element(outer, "div", None, "panel-body");
        let button = page.insert_element(inner, "button", None, "close-error-div");
        page.insert_element(PageDom::ROOT, "button", None, "close-error-div");

        assert_eq!(page.descendant_with_class(outer, "close-error-div"), Some(button));
        assert_eq!(page.descendant_with_class(outer, "missing"), None);
    }

    #[test]
    fn hidden_helpers_edit_tokens() {
        let mut page = PageDom::new();
        let node = page.insert_element(PageDom::ROOT, "div", Some("x"), "panel initialHidden");
        assert!(!page.is_hidden(node));

        page.set_hidden(node, true);
        assert_eq!(page.class_name(node), "panel initialHidden hidden");
        assert!(page.is_hidden(node));

        page.set_hidden(node, false);
        assert_eq!(page.class_name(node), "panel initialHidden");
    }

    #[test]
    fn data_flags_are_sticky() {
        let mut page = PageDom::new();
        let node = page.insert_element(PageDom::ROOT, "button", None, "close-error-div");
        assert!(!page.data_flag(node, "listenerAdded"));
        page.set_data_flag(node, "listenerAdded");
        assert!(page.data_flag(node, "listenerAdded"));
    }
}
