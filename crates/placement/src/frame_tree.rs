use std::collections::BTreeMap;

use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, instrument};

use crate::error::PlacementError;
use crate::frame::{frame_compose, ReferenceFrame};

/// One frame definition: an offset and rotation inside a named parent.
#[derive(Debug, Clone)]
struct FrameDef {
    parent: String,
    offset: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
}

/// A set of named frames, each defined relative to a parent, all hanging off
/// a single root.
///
/// Definitions can arrive in any order. Resolution walks the parent chain and
/// rejects unknown parents and cycles, so a resolved frame is always fully
/// determined.
#[derive(Debug, Clone)]
pub struct FrameTree {
    root: String,
    defs: BTreeMap<String, FrameDef>,
}

impl FrameTree {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            defs: BTreeMap::new(),
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// Define `name` as `parent` composed with `(offset, rotation)`.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        parent: impl Into<String>,
        offset: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Result<(), PlacementError> {
        let name = name.into();
        if name == self.root || self.defs.contains_key(&name) {
            return Err(PlacementError::DuplicateFrame { name });
        }
        self.defs.insert(
            name,
            FrameDef {
                parent: parent.into(),
                offset,
                rotation,
            },
        );
        Ok(())
    }

    /// Shorthand for a pure translation inside `parent`.
    pub fn define_offset(
        &mut self,
        name: impl Into<String>,
        parent: impl Into<String>,
        offset: Vector3<f64>,
    ) -> Result<(), PlacementError> {
        self.define(name, parent, offset, UnitQuaternion::identity())
    }

    pub fn contains(&self, name: &str) -> bool {
        name == self.root || self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root.as_str()).chain(self.defs.keys().map(String::as_str))
    }

    /// Resolve `name` to an absolute frame.
    #[instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<ReferenceFrame, PlacementError> {
        let chain = self.chain_to_root(name)?;
        let mut frame = ReferenceFrame::root(self.root.clone());
        // chain runs child -> root; compose from the root down.
        for link in chain.iter().rev() {
            let def = &self.defs[link];
            frame = frame_compose(&frame, link.clone(), def.offset, def.rotation)?;
        }
        debug!(frame = name, origin = ?frame.origin(), "resolved frame");
        Ok(frame)
    }

    /// Resolve every defined frame, failing on the first broken chain.
    pub fn resolve_all(&self) -> Result<BTreeMap<String, ReferenceFrame>, PlacementError> {
        self.names()
            .map(|name| self.resolve(name).map(|f| (name.to_string(), f)))
            .collect()
    }

    /// Names from `name` up to (excluding) the root.
    fn chain_to_root(&self, name: &str) -> Result<Vec<String>, PlacementError> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = name.to_string();
        while current != self.root {
            if chain.contains(&current) {
                chain.push(current);
                return Err(PlacementError::FrameCycle { chain });
            }
            let def = self
                .defs
                .get(&current)
                .ok_or_else(|| PlacementError::UnknownFrame {
                    name: current.clone(),
                })?;
            let parent = def.parent.clone();
            chain.push(current);
            current = parent;
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn out_of_order_definitions_resolve() {
        let mut tree = FrameTree::new("world");
        tree.define_offset("inner", "outer", Vector3::new(0.0, 5.0, 0.0))
            .unwrap();
        tree.define_offset("outer", "world", Vector3::new(0.0, -58.0, 0.0))
            .unwrap();
        let inner = tree.resolve("inner").unwrap();
        assert_relative_eq!(inner.origin(), Point3::new(0.0, -53.0, 0.0), epsilon = 1e-12);
        assert_eq!(inner.name, "inner");
    }

    #[test]
    fn cycle_is_reported_with_chain() {
        let mut tree = FrameTree::new("world");
        tree.define_offset("a", "b", Vector3::zeros()).unwrap();
        tree.define_offset("b", "a", Vector3::zeros()).unwrap();
        match tree.resolve("a") {
            Err(PlacementError::FrameCycle { chain }) => {
                assert_eq!(chain, vec!["a".to_string(), "b".to_string(), "a".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn unknown_parent_is_named() {
        let mut tree = FrameTree::new("world");
        tree.define_offset("pillar_top", "floor", Vector3::zeros())
            .unwrap();
        assert_eq!(
            tree.resolve("pillar_top"),
            Err(PlacementError::UnknownFrame {
                name: "floor".to_string()
            })
        );
    }

    #[test]
    fn duplicate_and_root_names_rejected() {
        let mut tree = FrameTree::new("world");
        tree.define_offset("board", "world", Vector3::zeros()).unwrap();
        assert!(tree.define_offset("board", "world", Vector3::zeros()).is_err());
        assert!(tree.define_offset("world", "board", Vector3::zeros()).is_err());
    }

    #[test]
    fn resolve_all_includes_root() {
        let mut tree = FrameTree::new("world");
        tree.define_offset("board", "world", Vector3::new(1.0, 2.0, 3.0))
            .unwrap();
        let all = tree.resolve_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("world"));
    }
}
