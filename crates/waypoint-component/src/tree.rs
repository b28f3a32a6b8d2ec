// Component tree
// Arena of named components. Children are owned through the arena, parents
// are plain indexes used for lookups only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::trace;
use waypoint_core::{ParamMap, NAME_SEPARATOR};
use waypoint_error::{Result, StateError, StateResult};

use crate::class::ComponentClass;
use crate::component::Component;
use crate::root::RequestRoot;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Index of a node inside a [`ComponentTree`]. Only valid in the tree that
/// created it; operations taking ids from callers reject foreign ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u64,
    index: usize,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index
    }
}

pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) component: Box<dyn Component>,
    /// Parameters bound by the last `load_state`
    pub(crate) params: ParamMap,
}

/// Arena holding one presenter tree plus any detached subtrees
pub struct ComponentTree {
    id: u64,
    nodes: Vec<Node>,
    request_root: Option<NodeId>,
}

impl Default for ComponentTree {
    fn default() -> Self {
        ComponentTree {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            request_root: None,
        }
    }
}

impl ComponentTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree whose root is the request root
    pub fn with_request_root(name: impl Into<String>, component: Box<dyn Component>) -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.push(name.into(), component);
        tree.request_root = Some(root);
        (tree, root)
    }

    /// The request-root node, if any
    pub fn request_root(&self) -> Option<NodeId> {
        self.request_root
    }

    /// Create a detached component; attach it with [`attach`]
    pub fn create(&mut self, name: impl Into<String>, component: Box<dyn Component>) -> StateResult<NodeId> {
        let name = name.into();
        validate_name(&name)?;
        Ok(self.push(name, component))
    }

    fn push(&mut self, name: String, component: Box<dyn Component>) -> NodeId {
        let id = NodeId { tree: self.id, index: self.nodes.len() };
        self.nodes.push(Node {
            name,
            parent: None,
            children: Vec::new(),
            component,
            params: ParamMap::new(),
        });
        id
    }

    /// Whether `id` was created by this tree
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.id && id.index < self.nodes.len()
    }

    /// Fail with `UnknownNode` unless `id` was created by this tree
    pub fn check(&self, id: NodeId) -> StateResult<NodeId> {
        if self.contains(id) {
            Ok(id)
        } else {
            Err(StateError::UnknownNode(id.index))
        }
    }

    // `id` must come from this tree; entry points run `check` first
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index]
    }

    /// Link a detached node beneath `parent`. Does not run the attach hook.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> StateResult<()> {
        self.check(parent)?;
        self.check(child)?;
        let child_name = self.node(child).name.clone();
        if self.node(child).parent.is_some() || Some(child) == self.request_root {
            return Err(StateError::AlreadyAttached(child_name));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(StateError::Cycle(child_name));
        }
        if self.child(parent, &child_name).is_some() {
            return Err(StateError::DuplicateComponent {
                name: child_name,
                container: self.node(parent).name.clone(),
            });
        }

        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Direct child by name
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    /// `id` followed by its ancestors up to its root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.node(*current).parent)
    }

    /// `id` and everything beneath it, parents before children
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        result
    }

    pub fn component(&self, id: NodeId) -> &dyn Component {
        self.node(id).component.as_ref()
    }

    pub fn component_mut(&mut self, id: NodeId) -> &mut dyn Component {
        self.node_mut(id).component.as_mut()
    }

    /// Typed access to a node's component
    pub fn downcast<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.component(id).as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to a node's component
    pub fn downcast_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.component_mut(id).as_any_mut().downcast_mut::<T>()
    }

    pub fn class(&self, id: NodeId) -> Arc<ComponentClass> {
        self.component(id).class()
    }

    /// Nearest ancestor (or self) that is the request root
    pub fn presenter_of(&self, id: NodeId) -> Option<NodeId> {
        let root = self.request_root?;
        self.ancestors(id).find(|ancestor| *ancestor == root)
    }

    /// Like [`presenter_of`](Self::presenter_of) but fails when detached
    pub fn need_presenter(&self, id: NodeId) -> StateResult<NodeId> {
        self.presenter_of(id).ok_or_else(|| StateError::PresenterNotFound {
            component: self.name(id).to_string(),
        })
    }

    /// Names from below the request root down to `id`, joined by `-`.
    /// Empty for the request root itself.
    pub fn unique_id(&self, id: NodeId) -> StateResult<String> {
        let presenter = self.need_presenter(id)?;
        let mut names: Vec<&str> = self
            .ancestors(id)
            .take_while(|ancestor| *ancestor != presenter)
            .map(|ancestor| self.name(ancestor))
            .collect();
        names.reverse();
        Ok(names.join(&NAME_SEPARATOR.to_string()))
    }

    /// Resolve a `-` separated path below `from` without creating anything
    pub fn find(&self, from: NodeId, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(from);
        }
        path.split(NAME_SEPARATOR)
            .try_fold(from, |current, name| self.child(current, name))
    }
}

fn validate_name(name: &str) -> StateResult<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StateError::InvalidComponentName(name.to_string()))
    }
}

/// Attach a detached node beneath `parent`. When the node lands under the
/// request root, every node of its subtree receives its slice of the global
/// parameters and loads it, parents first.
pub fn attach(root: &mut dyn RequestRoot, parent: NodeId, child: NodeId) -> Result<()> {
    root.tree_mut().add_child(parent, child)?;
    if root.tree().presenter_of(child).is_none() {
        return Ok(());
    }

    for node in root.tree().descendants(child) {
        let unique_id = root.tree().unique_id(node)?;
        let params = root.pop_global_params(&unique_id);
        trace!(component = %unique_id, count = params.len(), "loading attached component state");
        root.tree_mut().load_state(node, params)?;
    }
    Ok(())
}

/// Create a component and attach it beneath `parent` in one step
pub fn add_component(
    root: &mut dyn RequestRoot,
    parent: NodeId,
    name: &str,
    component: Box<dyn Component>,
) -> Result<NodeId> {
    let child = root.tree_mut().create(name, component)?;
    attach(root, parent, child)?;
    Ok(child)
}

/// Resolve a `-` separated path below `parent`, creating missing children
/// through their container's class factories. With `need`, a missing
/// component is an error; otherwise `None` is returned.
pub fn get_component(
    root: &mut dyn RequestRoot,
    parent: NodeId,
    path: &str,
    need: bool,
) -> Result<Option<NodeId>> {
    let mut current = root.tree().check(parent)?;
    if path.is_empty() {
        return Ok(Some(current));
    }

    for name in path.split(NAME_SEPARATOR) {
        if let Some(child) = root.tree().child(current, name) {
            current = child;
            continue;
        }

        let factory = root.tree().class(current).factory(name).cloned();
        match factory {
            Some(factory) => {
                trace!(component = name, "creating component");
                current = add_component(root, current, name, factory(name))?;
            }
            None if need => {
                return Err(StateError::ComponentNotFound {
                    name: name.to_string(),
                    container: root.tree().name(current).to_string(),
                }
                .into());
            }
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}
