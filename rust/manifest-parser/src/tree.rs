// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! The manifest tree.
//!
//! Nodes live in an arena owned by [`Manifest`] and are addressed by
//! [`NodeId`]. Children are owned through the ids stored in their parent's
//! [`NodeKind`]; the `parent` id on each node is a back-reference used for
//! diagnostics only, so the tree has no ownership cycles.
//!
//! Read access goes through [`NodeRef`], a copyable handle pairing a node
//! with the manifest it belongs to.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use ordermap::OrderMap;
use serde_json::{Map, Value};

use crate::config::{CANONICAL_INDENT, Configuration};
use crate::error::{LookupError, LookupErrorKind};
use crate::serializer::serialize;

/// Top-level key holding the application list.
pub const APPLICATIONS_KEY: &str = "applications";

/// Source of the owner tag given to every new arena.
static NEXT_OWNER: AtomicUsize = AtomicUsize::new(0);

/// Stable identifier of a node within one [`Manifest`] and its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    owner: usize,
    index: usize,
}

/// The shape and content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Scalar(String),
    /// Entries in source order. Keys are unique.
    Mapping(OrderMap<String, NodeId>),
    Sequence(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    /// Source line, `0` for nodes created after parsing.
    line: usize,
}

/// A parsed manifest: the root mapping and every node below it.
#[derive(Debug, Clone)]
pub struct Manifest {
    owner: usize,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Manifest {
    /// An arena with no nodes; the parser sets the root once it is built.
    pub(crate) fn empty() -> Self {
        let owner = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        Self {
            owner,
            nodes: Vec::new(),
            root: NodeId { owner, index: 0 },
        }
    }

    pub(crate) const fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>, line: usize) -> NodeId {
        let id = NodeId {
            owner: self.owner,
            index: self.nodes.len(),
        };
        self.nodes.push(Node { kind, parent, line });
        id
    }

    /// Add or replace a mapping entry. No-op when `target` is not a mapping.
    pub(crate) fn insert_entry(&mut self, target: NodeId, key: &str, child: NodeId) {
        if let NodeKind::Mapping(entries) = &mut self.node_mut(target).kind {
            entries.insert(key.to_owned(), child);
        }
    }

    /// Append a sequence item. No-op when `target` is not a sequence.
    pub(crate) fn push_item(&mut self, target: NodeId, child: NodeId) {
        if let NodeKind::Sequence(items) = &mut self.node_mut(target).kind {
            items.push(child);
        }
    }

    #[allow(
        clippy::indexing_slicing,
        reason = "Ids are handed out by this arena and checked at the public entry points"
    )]
    fn node_at(&self, id: NodeId) -> &Node {
        &self.nodes[id.index]
    }

    #[allow(
        clippy::indexing_slicing,
        reason = "Ids are handed out by this arena and checked at the public entry points"
    )]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index]
    }

    const fn handle(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { manifest: self, id }
    }

    /// The root mapping.
    #[must_use]
    pub const fn root(&self) -> NodeRef<'_> {
        self.handle(self.root)
    }

    /// Look up a node by id, `None` if the id was handed out by another
    /// manifest. Clones share ids with the manifest they were cloned from.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.owner == self.owner && id.index < self.nodes.len()).then(|| self.handle(id))
    }

    /// Number of nodes in the arena, including replaced ones.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The application nodes, in order.
    pub fn applications(&self) -> Result<Vec<NodeRef<'_>>, LookupError> {
        let applications = self.root().get(APPLICATIONS_KEY)?;
        if !applications.is_sequence() {
            return Err(applications.error(LookupErrorKind::NotASequence));
        }
        Ok(applications.children())
    }

    /// Top-level entries other than `applications`, in order.
    #[must_use]
    pub fn globals(&self) -> Vec<(&str, NodeRef<'_>)> {
        self.root()
            .entries()
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| *key != APPLICATIONS_KEY)
            .collect()
    }

    /// Export the tree as JSON. Mapping key order is preserved.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.root().to_json()
    }

    /// Serialize with the indentation width from `config`.
    #[must_use]
    pub fn serialize_with(&self, config: &Configuration) -> String {
        serialize(self, config.indent_width)
    }

    fn checked(&self, id: NodeId) -> Result<NodeRef<'_>, LookupError> {
        self.node(id).ok_or_else(|| LookupError {
            kind: LookupErrorKind::UnknownNode,
            path: String::new(),
            line: 0,
        })
    }

    fn checked_mapping(&self, id: NodeId) -> Result<NodeRef<'_>, LookupError> {
        let node = self.checked(id)?;
        if node.is_mapping() {
            Ok(node)
        } else {
            Err(node.error(LookupErrorKind::NotAMapping))
        }
    }

    /// Set `key` in the mapping `target` to a scalar.
    ///
    /// An existing scalar is updated in place and keeps its position; any
    /// other existing value is replaced. New keys are appended.
    pub fn set_scalar(
        &mut self,
        target: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<NodeId, LookupError> {
        let existing = self.checked_mapping(target)?.get_opt(key).map(|node| node.id);
        let value = value.into();

        if let Some(child) = existing
            && let NodeKind::Scalar(text) = &mut self.node_mut(child).kind
        {
            *text = value;
            return Ok(child);
        }

        let child = self.alloc(NodeKind::Scalar(value), Some(target), 0);
        self.insert_entry(target, key, child);
        Ok(child)
    }

    /// Replace the text of a scalar node.
    pub fn update_scalar(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), LookupError> {
        let node = self.checked(id)?;
        if !node.is_scalar() {
            return Err(node.error(LookupErrorKind::NotAScalar));
        }
        if let NodeKind::Scalar(text) = &mut self.node_mut(id).kind {
            *text = value.into();
        }
        Ok(())
    }

    /// Deep-copy the subtree at `source` into the mapping `target` under `key`.
    ///
    /// Copied nodes keep their source lines.
    pub fn graft(&mut self, target: NodeId, key: &str, source: NodeId) -> Result<NodeId, LookupError> {
        self.checked_mapping(target)?;
        self.checked(source)?;
        let copy = self.copy_subtree(source, target);
        self.insert_entry(target, key, copy);
        Ok(copy)
    }

    fn copy_subtree(&mut self, source: NodeId, parent: NodeId) -> NodeId {
        let Node { kind, line, .. } = self.node_at(source).clone();
        match kind {
            NodeKind::Scalar(text) => self.alloc(NodeKind::Scalar(text), Some(parent), line),
            NodeKind::Mapping(entries) => {
                let id = self.alloc(NodeKind::Mapping(OrderMap::new()), Some(parent), line);
                for (key, child) in entries {
                    let copy = self.copy_subtree(child, id);
                    self.insert_entry(id, &key, copy);
                }
                id
            }
            NodeKind::Sequence(items) => {
                let id = self.alloc(NodeKind::Sequence(Vec::new()), Some(parent), line);
                for child in items {
                    let copy = self.copy_subtree(child, id);
                    self.push_item(id, copy);
                }
                id
            }
        }
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self, CANONICAL_INDENT))
    }
}

/// Something a child node can be selected by: a mapping key or a sequence index.
pub trait Selector: Copy {
    fn select<'a>(self, node: NodeRef<'a>) -> Result<NodeRef<'a>, LookupError>;
}

impl Selector for &str {
    fn select<'a>(self, node: NodeRef<'a>) -> Result<NodeRef<'a>, LookupError> {
        match node.kind() {
            NodeKind::Mapping(entries) => entries
                .get(self)
                .map(|&id| node.manifest.handle(id))
                .ok_or_else(|| node.error(LookupErrorKind::MissingKey(self.to_owned()))),
            _ => Err(node.error(LookupErrorKind::NotAMapping)),
        }
    }
}

impl Selector for usize {
    fn select<'a>(self, node: NodeRef<'a>) -> Result<NodeRef<'a>, LookupError> {
        match node.kind() {
            NodeKind::Sequence(items) => items
                .get(self)
                .map(|&id| node.manifest.handle(id))
                .ok_or_else(|| {
                    node.error(LookupErrorKind::IndexOutOfRange {
                        index: self,
                        len: items.len(),
                    })
                }),
            _ => Err(node.error(LookupErrorKind::NotASequence)),
        }
    }
}

/// A read-only handle to one node of a [`Manifest`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    manifest: &'a Manifest,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub const fn id(self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(self) -> &'a NodeKind {
        &self.manifest.node_at(self.id).kind
    }

    /// Source line the node was parsed from, `0` if it was created later.
    #[must_use]
    pub fn line(self) -> usize {
        self.manifest.node_at(self.id).line
    }

    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.manifest
            .node_at(self.id)
            .parent
            .map(|id| self.manifest.handle(id))
    }

    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(self.kind(), NodeKind::Scalar(_))
    }

    #[must_use]
    pub fn is_mapping(self) -> bool {
        matches!(self.kind(), NodeKind::Mapping(_))
    }

    #[must_use]
    pub fn is_sequence(self) -> bool {
        matches!(self.kind(), NodeKind::Sequence(_))
    }

    /// Select a child by key (mappings) or index (sequences).
    pub fn get<S: Selector>(self, selector: S) -> Result<Self, LookupError> {
        selector.select(self)
    }

    /// The child under `key`, or `None` if it is absent or this is not a mapping.
    #[must_use]
    pub fn get_opt(self, key: &str) -> Option<Self> {
        self.get(key).ok()
    }

    #[must_use]
    pub fn has(self, key: &str) -> bool {
        self.get_opt(key).is_some()
    }

    /// The text of a scalar.
    pub fn value(self) -> Result<&'a str, LookupError> {
        match self.kind() {
            NodeKind::Scalar(text) => Ok(text),
            _ => Err(self.error(LookupErrorKind::NotAScalar)),
        }
    }

    /// Mapping values in key order or sequence items in order. Empty for scalars.
    #[must_use]
    pub fn children(self) -> Vec<Self> {
        let ids: Vec<NodeId> = match self.kind() {
            NodeKind::Scalar(_) => Vec::new(),
            NodeKind::Mapping(entries) => entries.values().copied().collect(),
            NodeKind::Sequence(items) => items.clone(),
        };
        ids.into_iter().map(|id| self.manifest.handle(id)).collect()
    }

    /// Key/value pairs of a mapping, in order.
    pub fn entries(self) -> Result<Vec<(&'a str, Self)>, LookupError> {
        match self.kind() {
            NodeKind::Mapping(entries) => Ok(entries
                .iter()
                .map(|(key, &id)| (key.as_str(), self.manifest.handle(id)))
                .collect()),
            _ => Err(self.error(LookupErrorKind::NotAMapping)),
        }
    }

    /// This node and everything below it, parents before children.
    #[must_use]
    pub fn descendants(self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        found
    }

    /// The key this node is stored under, if its parent is a mapping.
    #[must_use]
    pub fn label(self) -> Option<&'a str> {
        match self.parent()?.kind() {
            NodeKind::Mapping(entries) => entries
                .iter()
                .find(|(_, id)| **id == self.id)
                .map(|(key, _)| key.as_str()),
            _ => None,
        }
    }

    /// Diagnostic path from the root, e.g. `applications[1].env.FOO`.
    #[must_use]
    pub fn path(self) -> String {
        let mut segments = Vec::new();
        let mut current = self;
        while let Some(parent) = current.parent() {
            let segment = match parent.kind() {
                NodeKind::Sequence(items) => {
                    let index = items.iter().position(|id| *id == current.id).unwrap_or(0);
                    format!("[{index}]")
                }
                _ => format!(".{}", current.label().unwrap_or_default()),
            };
            segments.push(segment);
            current = parent;
        }
        let path: String = segments.into_iter().rev().collect();
        path.strip_prefix('.').map(str::to_owned).unwrap_or(path)
    }

    /// Export this subtree as JSON.
    #[must_use]
    pub fn to_json(self) -> Value {
        match self.kind() {
            NodeKind::Scalar(text) => Value::String(text.clone()),
            NodeKind::Mapping(_) => Value::Object(
                self.entries()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, child)| (key.to_owned(), child.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            NodeKind::Sequence(_) => {
                Value::Array(self.children().into_iter().map(Self::to_json).collect())
            }
        }
    }

    pub(crate) fn error(self, kind: LookupErrorKind) -> LookupError {
        LookupError {
            kind,
            path: self.path(),
            line: self.line(),
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("path", &self.path())
            .field("kind", self.kind())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parse;

    const INPUT: &str = "\
memory: 256M
applications:
- name: web
  host: web-host
  env:
    FOO: bar
  services:
  - mysql
- name: worker
";

    #[test]
    fn test_get_by_key_and_index() {
        let manifest = parse(INPUT).unwrap();
        let root = manifest.root();
        let web = root.get("applications").unwrap().get(0).unwrap();
        assert_eq!(web.get("host").unwrap().value().unwrap(), "web-host");
        assert_eq!(
            web.get("services").unwrap().get(0).unwrap().value().unwrap(),
            "mysql"
        );
        assert_eq!(root.get("memory").unwrap().line(), 1);
        assert_eq!(web.line(), 3);
    }

    #[test]
    fn test_lookup_errors() {
        let manifest = parse(INPUT).unwrap();
        let applications = manifest.root().get("applications").unwrap();

        let err = applications.get("name").unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotAMapping);
        assert_eq!(err.path, "applications");

        let err = applications.get(5).unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::IndexOutOfRange { index: 5, len: 2 });

        let worker = applications.get(1).unwrap();
        let err = worker.get("host").unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::MissingKey("host".to_owned()));
        assert_eq!(err.to_string(), "applications[1]: no entry 'host'");

        let err = worker.value().unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotAScalar);
        assert_eq!(manifest.root().get(0).unwrap_err().kind, LookupErrorKind::NotASequence);
    }

    #[test]
    fn test_children_keep_order() {
        let manifest = parse(INPUT).unwrap();
        let web = manifest.applications().unwrap()[0];
        let keys: Vec<&str> = web
            .entries()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["name", "host", "env", "services"]);
        assert_eq!(web.children().len(), 4);
        assert!(web.get("name").unwrap().children().is_empty());
    }

    #[test]
    fn test_path_label_and_parent() {
        let manifest = parse(INPUT).unwrap();
        let foo = manifest
            .root()
            .get("applications")
            .and_then(|apps| apps.get(0))
            .and_then(|app| app.get("env"))
            .and_then(|env| env.get("FOO"))
            .unwrap();
        assert_eq!(foo.path(), "applications[0].env.FOO");
        assert_eq!(foo.label(), Some("FOO"));
        assert_eq!(foo.parent().unwrap().label(), Some("env"));
        assert_eq!(manifest.root().path(), "");
        assert!(manifest.root().parent().is_none());
    }

    #[test]
    fn test_globals() {
        let manifest = parse(INPUT).unwrap();
        let globals = manifest.globals();
        assert_eq!(globals.len(), 1);
        assert_eq!(globals[0].0, "memory");
        assert_eq!(globals[0].1.value().unwrap(), "256M");
    }

    #[test]
    fn test_to_json() {
        let manifest = parse(INPUT).unwrap();
        assert_eq!(
            manifest.to_json(),
            json!({
                "memory": "256M",
                "applications": [
                    {
                        "name": "web",
                        "host": "web-host",
                        "env": {"FOO": "bar"},
                        "services": ["mysql"],
                    },
                    {"name": "worker"},
                ],
            })
        );
    }

    #[test]
    fn test_set_scalar() {
        let mut manifest = parse(INPUT).unwrap();
        let web = manifest.applications().unwrap()[0].id();

        let host = manifest.set_scalar(web, "host", "other").unwrap();
        let url = manifest.set_scalar(web, "url", "other.example.org").unwrap();

        let node = manifest.node(host).unwrap();
        assert_eq!(node.value().unwrap(), "other");
        assert_eq!(node.line(), 4);
        assert_eq!(manifest.node(url).unwrap().line(), 0);
        assert_eq!(manifest.node(url).unwrap().path(), "applications[0].url");

        let scalar = manifest.node(host).unwrap().id();
        let err = manifest.set_scalar(scalar, "x", "y").unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotAMapping);
    }

    #[test]
    fn test_graft_copies_subtree() {
        let mut manifest = parse(INPUT).unwrap();
        let applications = manifest.applications().unwrap();
        let env = applications[0].get("env").unwrap().id();
        let worker = applications[1].id();

        let copy = manifest.graft(worker, "env", env).unwrap();
        manifest
            .set_scalar(copy, "FOO", "changed")
            .unwrap();

        let json = manifest.to_json();
        assert_eq!(json["applications"][0]["env"], json!({"FOO": "bar"}));
        assert_eq!(json["applications"][1]["env"], json!({"FOO": "changed"}));
        assert_eq!(manifest.node(copy).unwrap().parent().unwrap().id(), worker);
    }

    #[test]
    fn test_update_scalar() {
        let mut manifest = parse(INPUT).unwrap();
        let name = manifest.applications().unwrap()[1].get("name").unwrap().id();
        manifest.update_scalar(name, "renamed").unwrap();
        assert_eq!(manifest.node(name).unwrap().value().unwrap(), "renamed");

        let root = manifest.root().id();
        let err = manifest.update_scalar(root, "x").unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotAScalar);
    }

    #[test]
    fn test_foreign_node_id() {
        let small = parse("applications:\n- name: a\n").unwrap();
        let large = parse(INPUT).unwrap();
        let foreign = large.applications().unwrap()[1]
            .get("name")
            .unwrap()
            .id();
        let mut small = small;
        assert!(small.node(foreign).is_none());
        let err = small.set_scalar(foreign, "k", "v").unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::UnknownNode);
    }

    #[test]
    fn test_foreign_node_id_in_range() {
        let first = parse(INPUT).unwrap();
        let mut second = parse(INPUT).unwrap();
        let web = first.applications().unwrap()[0].id();
        let host = first.applications().unwrap()[0].get("host").unwrap().id();

        assert!(second.node(web).is_none());
        assert_eq!(
            second.set_scalar(web, "host", "x").unwrap_err().kind,
            LookupErrorKind::UnknownNode
        );
        assert_eq!(
            second.update_scalar(host, "x").unwrap_err().kind,
            LookupErrorKind::UnknownNode
        );
        let root = second.root().id();
        assert_eq!(
            second.graft(root, "copy", web).unwrap_err().kind,
            LookupErrorKind::UnknownNode
        );
        assert_eq!(second.to_json(), first.to_json());
    }

    #[test]
    fn test_clone_shares_node_ids() {
        let manifest = parse(INPUT).unwrap();
        let mut copy = manifest.clone();
        let host = manifest.applications().unwrap()[0].get("host").unwrap().id();
        copy.update_scalar(host, "changed").unwrap();
        assert_eq!(copy.node(host).unwrap().value().unwrap(), "changed");
        assert_eq!(manifest.node(host).unwrap().value().unwrap(), "web-host");
    }
}
