//! Serial implementation of BSP operations
//!
//! Every traversal runs on an explicit worklist, so deep trees built from
//! large or badly ordered inputs cannot overflow the call stack. Outputs and
//! their ordering match the textbook recursive definitions.

use crate::mesh::bsp::node::Node;
use crate::mesh::bsp::traits::{BspOps, FirstPolygonStrategy, SplittingPlaneStrategy};
use crate::mesh::polygon::Polygon;
use tracing::trace;

/// Serial implementation of BSP operations
#[derive(Debug, Clone, Default)]
pub struct SerialBspOps<SP = FirstPolygonStrategy> {
    splitting_strategy: SP,
}

impl SerialBspOps<FirstPolygonStrategy> {
    pub const fn new() -> Self {
        Self {
            splitting_strategy: FirstPolygonStrategy,
        }
    }
}

impl<SP> SerialBspOps<SP> {
    pub const fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
        }
    }
}

impl<S: Clone, SP: SplittingPlaneStrategy<S>> BspOps<S> for SerialBspOps<SP> {
    fn invert(&self, node: &mut Node<S>) {
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            // Flip all polygons and plane in this node
            current.polygons.iter_mut().for_each(|p| p.flip());
            if let Some(ref mut plane) = current.plane {
                plane.flip();
            }

            // Swap front and back
            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }

    fn clip_polygons(&self, node: &Node<S>, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        let mut result = Vec::with_capacity(polygons.len());

        // Depth-first, front before back: terminal buckets reach `result` in
        // the same order the recursive `front ++ back` concatenation yields.
        let mut stack = vec![(node, polygons.to_vec())];

        while let Some((current, polys)) = stack.pop() {
            // An unsplit leaf keeps everything
            let Some(plane) = current.plane.as_ref() else {
                result.extend(polys);
                continue;
            };

            let mut front_polys = Vec::with_capacity(polys.len());
            let mut back_polys = Vec::with_capacity(polys.len());

            for polygon in &polys {
                let (coplanar_front, coplanar_back, front_parts, back_parts) =
                    plane.split_polygon(polygon);
                front_polys.extend(coplanar_front);
                back_polys.extend(coplanar_back);
                front_polys.extend(front_parts);
                back_polys.extend(back_parts);
            }

            // Behind a node without a back child is solid: drop those polygons.
            if let Some(back_node) = current.back.as_deref() {
                if !back_polys.is_empty() {
                    stack.push((back_node, back_polys));
                }
            }

            match current.front.as_deref() {
                Some(front_node) if !front_polys.is_empty() => {
                    stack.push((front_node, front_polys));
                },
                Some(_) => {},
                None => result.extend(front_polys),
            }
        }

        result
    }

    fn clip_to(&self, node: &mut Node<S>, bsp: &Node<S>) {
        let mut visited = 0usize;
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            visited += 1;
            current.polygons = self.clip_polygons(bsp, &current.polygons);

            if let Some(front) = current.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = current.back.as_deref_mut() {
                stack.push(back);
            }
        }

        trace!(nodes = visited, "clipped tree");
    }

    fn all_polygons(&self, node: &Node<S>) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);

            // back first so that the front subtree is emitted before it
            stack.extend(current.back.as_deref());
            stack.extend(current.front.as_deref());
        }
        result
    }

    fn build(&self, node: &mut Node<S>, polygons: &[Polygon<S>]) {
        if polygons.is_empty() {
            return;
        }

        let mut nodes = 0usize;
        let mut stack = vec![(node, polygons.to_vec())];

        while let Some((current, polys)) = stack.pop() {
            nodes += 1;

            // Adopt a splitting plane if this node has none yet
            let plane = *current
                .plane
                .get_or_insert_with(|| self.splitting_strategy.pick_splitting_plane(&polys));

            let mut front = Vec::with_capacity(polys.len() / 2);
            let mut back = Vec::with_capacity(polys.len() / 2);

            for polygon in &polys {
                let (coplanar_front, coplanar_back, front_parts, back_parts) =
                    plane.split_polygon(polygon);

                // Coplanar polygons stay here, whichever way they face
                current.polygons.extend(coplanar_front);
                current.polygons.extend(coplanar_back);
                front.extend(front_parts);
                back.extend(back_parts);
            }

            // Children are created lazily, only for non-empty sides
            if !front.is_empty() {
                let child = current.front.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((child.as_mut(), front));
            }
            if !back.is_empty() {
                let child = current.back.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((child.as_mut(), back));
            }
        }

        trace!(nodes, polygons = polygons.len(), "built tree");
    }
}
