//! html5ever TreeSink that builds a reference-counted scratch tree.
//!
//! html5ever needs a mutable tree it can re-parent into while repairing
//! markup. The scratch tree lives only for the duration of a parse and is
//! lowered into the owned [`crate::Document`] afterwards.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use crate::dom::{Attribute, Document, Element, Node};

/// Handle used by TreeSink to reference nodes.
pub type Handle = Rc<ScratchNode>;

/// Node payload in the scratch tree.
#[derive(Debug)]
pub enum ScratchData {
    Document,
    Element {
        name: QualName,
        attrs: RefCell<Vec<Attribute>>,
    },
    Text(RefCell<String>),
    /// Comments, processing instructions and doctypes; dropped when lowering.
    Ignored,
}

/// A node in the scratch tree.
#[derive(Debug)]
pub struct ScratchNode {
    data: ScratchData,
    parent: RefCell<Option<Weak<ScratchNode>>>,
    children: RefCell<Vec<Handle>>,
}

impl ScratchNode {
    fn new(data: ScratchData) -> Handle {
        Rc::new(Self {
            data,
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }

    fn parent(&self) -> Option<Handle> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// TreeSink implementation that builds a scratch tree.
pub struct ScratchSink {
    document: Handle,
    quirks_mode: Cell<QuirksMode>,
}

impl Default for ScratchSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchSink {
    pub fn new() -> Self {
        Self {
            document: ScratchNode::new(ScratchData::Document),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
        }
    }

    /// Lower the scratch tree into an owned document.
    pub fn into_document(self) -> Document {
        Document::new(lower_children(&self.document))
    }
}

fn lower_children(handle: &Handle) -> Vec<Node> {
    handle.children.borrow().iter().filter_map(lower).collect()
}

fn lower(handle: &Handle) -> Option<Node> {
    match &handle.data {
        ScratchData::Element { name, attrs } => Some(Node::Element(Element {
            name: name.local.to_string(),
            attrs: attrs.borrow().clone(),
            children: lower_children(handle),
        })),
        ScratchData::Text(text) => {
            let text = text.borrow();
            (!text.is_empty()).then(|| Node::Text(text.clone()))
        }
        ScratchData::Document | ScratchData::Ignored => None,
    }
}

/// Detach a node from its current parent, if any.
fn detach(target: &Handle) {
    let Some(parent) = target.parent() else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, target));
    *target.parent.borrow_mut() = None;
}

fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().push(child);
}

/// Append text, merging with a trailing text node.
fn append_text(parent: &Handle, text: &str) {
    if let Some(last) = parent.children.borrow().last()
        && let ScratchData::Text(existing) = &last.data
    {
        existing.borrow_mut().push_str(text);
        return;
    }
    append_child(parent, ScratchNode::new(ScratchData::Text(RefCell::new(text.to_string()))));
}

impl TreeSink for ScratchSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        // Be lenient like browsers
        log::trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        self.document.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        match &target.data {
            ScratchData::Element { name, .. } => name,
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name.local.to_string(),
                value: a.value.to_string(),
            })
            .collect();
        ScratchNode::new(ScratchData::Element {
            name,
            attrs: RefCell::new(attrs),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        ScratchNode::new(ScratchData::Ignored)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        ScratchNode::new(ScratchData::Ignored)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => append_child(parent, node),
            NodeOrText::AppendText(text) => append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if element.parent().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        append_child(&self.document, ScratchNode::new(ScratchData::Ignored));
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Templates never occur in note exports; treat the element as its own content
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let Some(parent) = sibling.parent() else {
            return;
        };

        let new_node = match new_node {
            NodeOrText::AppendNode(node) => {
                detach(&node);
                node
            }
            NodeOrText::AppendText(text) => {
                let children = parent.children.borrow();
                let index = children.iter().position(|c| Rc::ptr_eq(c, sibling));
                if let Some(prev) = index.and_then(|i| i.checked_sub(1)).map(|i| &children[i])
                    && let ScratchData::Text(existing) = &prev.data
                {
                    existing.borrow_mut().push_str(&text);
                    return;
                }
                ScratchNode::new(ScratchData::Text(RefCell::new(text.to_string())))
            }
        };

        let mut children = parent.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(children.len());
        *new_node.parent.borrow_mut() = Some(Rc::downgrade(&parent));
        children.insert(index, new_node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        if let ScratchData::Element {
            attrs: existing, ..
        } = &target.data
        {
            let mut existing = existing.borrow_mut();
            for attr in attrs {
                let name = attr.name.local.to_string();
                if !existing.iter().any(|a| a.name == name) {
                    existing.push(Attribute {
                        name,
                        value: attr.value.to_string(),
                    });
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        for child in children {
            *child.parent.borrow_mut() = None;
            append_child(new_parent, child);
        }
    }
}
