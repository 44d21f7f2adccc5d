//! Cached tree of component poses under a movable root.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Isometry3;

/// Where a node's relative transform comes from.
pub enum TransformSource {
    /// Fixed mount offset, registered once.
    Constant(Isometry3<f32>),
    /// Supplier evaluated on every [`TransformTree::update`] pass,
    /// e.g. a joint angle converted to a transform.
    Dynamic(Box<dyn Fn() -> Isometry3<f32> + Send>),
}

impl TransformSource {
    fn evaluate(&self) -> Isometry3<f32> {
        match self {
            TransformSource::Constant(transform) => *transform,
            TransformSource::Dynamic(supplier) => supplier(),
        }
    }
}

struct Node {
    source: Option<TransformSource>,
    cached: Isometry3<f32>,
    children: BTreeMap<String, usize>,
}

impl Node {
    fn placeholder() -> Self {
        Self {
            source: None,
            cached: Isometry3::identity(),
            children: BTreeMap::new(),
        }
    }
}

/// Hierarchical cache of component poses relative to a movable root.
///
/// Nodes live in an arena and are addressed by slash-delimited paths
/// (`"arm/wrist/camera"`). Registering a deep path creates missing
/// ancestors as placeholders that pass their parent's pose through
/// until a source is registered for them.
///
/// One [`update`](Self::update) pass per tick recomputes every cached
/// absolute pose root-to-leaf; consumers then read poses for free.
/// Cached values are only meaningful immediately after a completed
/// `update` — changing a dynamic source has no visible effect until
/// the next pass.
pub struct TransformTree {
    nodes: Vec<Node>,
}

/// Index of the implicit root node.
const ROOT: usize = 0;

impl TransformTree {
    /// Create an empty tree. The root pose is supplied per update.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::placeholder()],
        }
    }

    /// Register (or overwrite) the component at `path`.
    ///
    /// Missing ancestors are created as identity placeholders. Empty
    /// path segments are ignored; an entirely empty path is a no-op.
    pub fn register(&mut self, path: &str, source: TransformSource) {
        let mut current = ROOT;
        let mut registered = false;

        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            current = match self.nodes[current].children.get(segment) {
                Some(&index) => index,
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(Node::placeholder());
                    self.nodes[current]
                        .children
                        .insert(segment.to_string(), index);
                    index
                }
            };
            registered = true;
        }

        if registered {
            self.nodes[current].source = Some(source);
        }
    }

    /// Register a fixed transform at `path`.
    pub fn register_constant(&mut self, path: &str, transform: Isometry3<f32>) {
        self.register(path, TransformSource::Constant(transform));
    }

    /// Recompute every cached absolute pose from `root_pose` down.
    ///
    /// Children compose onto their parent's absolute pose; placeholder
    /// nodes inherit the parent pose unchanged. The pass is synchronous
    /// and leaves a fully consistent snapshot.
    pub fn update(&mut self, root_pose: Isometry3<f32>) {
        self.nodes[ROOT].cached = root_pose;

        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let parent_pose = self.nodes[index].cached;
            let children: Vec<usize> = self.nodes[index].children.values().copied().collect();
            for child in children {
                self.nodes[child].cached = match &self.nodes[child].source {
                    Some(source) => parent_pose * source.evaluate(),
                    None => parent_pose,
                };
                stack.push(child);
            }
        }
    }

    /// Cached absolute pose of the component at `path`.
    ///
    /// `None` for unregistered paths, including a path with no
    /// segments; never panics.
    pub fn pose(&self, path: &str) -> Option<Isometry3<f32>> {
        let mut current = ROOT;
        let mut matched = false;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            current = *self.nodes[current].children.get(segment)?;
            matched = true;
        }
        matched.then(|| self.nodes[current].cached)
    }

    /// All registered paths with their cached poses, depth-first.
    ///
    /// Intended for telemetry consumers that publish every component
    /// pose each tick.
    pub fn snapshot(&self) -> Vec<(String, Isometry3<f32>)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, String)> = vec![(ROOT, String::new())];
        while let Some((index, prefix)) = stack.pop() {
            for (name, &child) in &self.nodes[index].children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                out.push((path.clone(), self.nodes[child].cached));
                stack.push((child, path));
            }
        }
        out
    }
}

impl Default for TransformTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(
            tree: &TransformTree,
            index: usize,
            indent: &str,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            for (name, &child) in &tree.nodes[index].children {
                let marker = if tree.nodes[child].source.is_none() {
                    "?"
                } else {
                    "#"
                };
                writeln!(f, "{}|--- {} {}", indent, name, marker)?;
                write_node(tree, child, &format!("{}|   ", indent), f)?;
            }
            Ok(())
        }

        writeln!(f, "TransformTree")?;
        write_node(self, ROOT, "", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use std::f32::consts::FRAC_PI_2;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn translation(x: f32, y: f32, z: f32) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    }

    #[test]
    fn test_unregistered_path_is_none() {
        let tree = TransformTree::new();
        assert!(tree.pose("arm/wrist").is_none());
    }

    #[test]
    fn test_empty_path_is_none() {
        let mut tree = TransformTree::new();
        tree.register_constant("arm", translation(0.0, 0.0, 0.5));
        tree.update(translation(1.0, 0.0, 0.0));

        assert!(tree.pose("").is_none());
        assert!(tree.pose("///").is_none());
    }

    #[test]
    fn test_constant_chain_composes() {
        let mut tree = TransformTree::new();
        tree.register_constant("arm", translation(0.0, 0.0, 0.5));
        tree.register_constant("arm/wrist", translation(0.3, 0.0, 0.0));

        tree.update(translation(1.0, 2.0, 0.0));

        let wrist = tree.pose("arm/wrist").unwrap();
        assert_relative_eq!(wrist.translation.x, 1.3, epsilon = 1e-6);
        assert_relative_eq!(wrist.translation.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(wrist.translation.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_root_rotation_rotates_children() {
        let mut tree = TransformTree::new();
        tree.register_constant("bumper", translation(1.0, 0.0, 0.0));

        let root = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        tree.update(root);

        let bumper = tree.pose("bumper").unwrap();
        assert_relative_eq!(bumper.translation.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(bumper.translation.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_placeholder_ancestor_passes_parent_through() {
        let mut tree = TransformTree::new();
        // "arm" never gets its own source.
        tree.register_constant("arm/wrist", translation(0.3, 0.0, 0.0));

        tree.update(translation(1.0, 0.0, 0.0));

        let wrist = tree.pose("arm/wrist").unwrap();
        assert_relative_eq!(wrist.translation.x, 1.3, epsilon = 1e-6);
        // The placeholder itself sits at the parent pose.
        let arm = tree.pose("arm").unwrap();
        assert_relative_eq!(arm.translation.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dynamic_source_read_only_on_update() {
        let angle = Arc::new(AtomicU32::new(0f32.to_bits()));
        let supplier_angle = Arc::clone(&angle);

        let mut tree = TransformTree::new();
        tree.register(
            "turret",
            TransformSource::Dynamic(Box::new(move || {
                let theta = f32::from_bits(supplier_angle.load(Ordering::Relaxed));
                Isometry3::from_parts(
                    Translation3::new(0.0, 0.0, 0.0),
                    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta),
                )
            })),
        );

        tree.update(Isometry3::identity());
        let before = tree.pose("turret").unwrap();

        // Changing the joint state is invisible until the next update.
        angle.store(FRAC_PI_2.to_bits(), Ordering::Relaxed);
        let unchanged = tree.pose("turret").unwrap();
        assert_relative_eq!(
            unchanged.rotation.angle(),
            before.rotation.angle(),
            epsilon = 1e-6
        );

        tree.update(Isometry3::identity());
        let after = tree.pose("turret").unwrap();
        assert_relative_eq!(after.rotation.angle(), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_register_overwrites_source() {
        let mut tree = TransformTree::new();
        tree.register_constant("mast", translation(1.0, 0.0, 0.0));
        tree.register_constant("mast", translation(2.0, 0.0, 0.0));

        tree.update(Isometry3::identity());
        assert_relative_eq!(
            tree.pose("mast").unwrap().translation.x,
            2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_consistency_after_update() {
        let mut tree = TransformTree::new();
        tree.register_constant("a", translation(1.0, 0.0, 0.0));
        tree.register_constant("a/b", translation(0.0, 1.0, 0.0));
        tree.register_constant("a/b/c", translation(0.0, 0.0, 1.0));

        tree.update(translation(5.0, 5.0, 0.0));

        // Every node equals parent ∘ own transform.
        let a = tree.pose("a").unwrap();
        let b = tree.pose("a/b").unwrap();
        let c = tree.pose("a/b/c").unwrap();
        assert_relative_eq!(
            (a * translation(0.0, 1.0, 0.0)).translation.vector,
            b.translation.vector,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            (b * translation(0.0, 0.0, 1.0)).translation.vector,
            c.translation.vector,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_snapshot_lists_all_paths() {
        let mut tree = TransformTree::new();
        tree.register_constant("arm", translation(0.0, 0.0, 0.5));
        tree.register_constant("arm/wrist", translation(0.3, 0.0, 0.0));
        tree.update(Isometry3::identity());

        let mut paths: Vec<String> = tree.snapshot().into_iter().map(|(path, _)| path).collect();
        paths.sort();
        assert_eq!(paths, vec!["arm".to_string(), "arm/wrist".to_string()]);
    }
}
