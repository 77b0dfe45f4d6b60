//! BSP tree node data structure

use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;

/// A BSP tree node, containing polygons plus optional front/back subtrees
///
/// `Clone` and `Drop` walk the tree with an explicit worklist, so arbitrarily
/// deep trees are copied and freed without deep recursion.
#[derive(Debug)]
pub struct Node<S: Clone> {
    /// Splitting plane for this node *or* **None** for a leaf that
    /// only stores polygons.
    pub plane: Option<Plane>,

    /// Polygons in *front* half‑spaces.
    pub front: Option<Box<Node<S>>>,

    /// Polygons in *back* half‑spaces.
    pub back: Option<Box<Node<S>>>,

    /// Polygons that lie *exactly* on `plane`, in either orientation
    /// (after the node has been built).
    pub polygons: Vec<Polygon<S>>,
}

impl<S: Clone> Clone for Node<S> {
    fn clone(&self) -> Self {
        // Post-order: children are cloned before their parent is assembled.
        let mut work = vec![(self, false)];
        let mut done: Vec<Node<S>> = Vec::new();

        while let Some((current, expanded)) = work.pop() {
            if !expanded {
                work.push((current, true));
                work.extend(current.front.as_deref().map(|n| (n, false)));
                work.extend(current.back.as_deref().map(|n| (n, false)));
                continue;
            }

            // back was pushed last, so it finished first and sits below front
            let front = current.front.as_ref().and_then(|_| done.pop()).map(Box::new);
            let back = current.back.as_ref().and_then(|_| done.pop()).map(Box::new);
            done.push(Node {
                plane: current.plane,
                front,
                back,
                polygons: current.polygons.clone(),
            });
        }

        done.pop().unwrap_or_default()
    }
}

impl<S: Clone> Drop for Node<S> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<S>>> = Vec::new();
        stack.extend(self.front.take());
        stack.extend(self.back.take());

        // detach the children first, so every node is dropped as a leaf
        while let Some(mut node) = stack.pop() {
            stack.extend(node.front.take());
            stack.extend(node.back.take());
        }
    }
}

impl<S: Clone> Default for Node<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> Node<S> {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend(current.front.as_deref());
            stack.extend(current.back.as_deref());
        }
        count
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((current, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(current.front.as_deref().map(|n| (n, level + 1)));
            stack.extend(current.back.as_deref().map(|n| (n, level + 1)));
        }
        deepest
    }
}
