// SPDX-License-Identifier: MPL-2.0
//! Retained scene of positioned, fadeable nodes.
//!
//! Nodes are addressed by opaque [`NodeId`] handles and mutated through
//! property setters, the same way the overlay would drive a scene-graph
//! toolkit. Opacity changes can be animated; an animation is stored as a
//! [`Transition`] and evaluated lazily against the instant the view is
//! rendered at, so the scene itself holds no timers.

use std::time::{Duration, Instant};

/// Handle of a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Embedded image asset a node can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Panel,
    Play,
    Pause,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Container whose children are positioned relative to it.
    Group,
    Rect { color: Color },
    Image(Asset),
    Text { content: String, size: f32, color: Color },
    /// Surface the decoded frames are drawn on.
    VideoSurface,
}

/// Easing curve of an animated property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseOutQuint,
}

impl Easing {
    /// Maps linear progress `t` in [0, 1] to eased progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
        }
    }
}

/// An in-flight opacity animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    fn value_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

/// Axis-aligned rectangle in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    opacity: f32,
    visible: bool,
    transition: Option<Transition>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: 255.0,
            visible: true,
            transition: None,
        }
    }

    fn opacity_at(&self, now: Instant) -> f32 {
        match &self.transition {
            Some(transition) => transition.value_at(now),
            None => self.opacity,
        }
    }
}

/// Tree of nodes rooted at [`Scene::root`].
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Group, None)],
        }
    }

    /// The stage-sized root group.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds a node as the topmost child of `parent`.
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) {
        let node = &mut self.nodes[id.0];
        node.x = x;
        node.y = y;
    }

    /// Position relative to the parent node.
    #[must_use]
    pub fn position(&self, id: NodeId) -> (f32, f32) {
        let node = &self.nodes[id.0];
        (node.x, node.y)
    }

    pub fn set_size(&mut self, id: NodeId, width: f32, height: f32) {
        let node = &mut self.nodes[id.0];
        node.width = width.max(0.0);
        node.height = height.max(0.0);
    }

    #[must_use]
    pub fn size(&self, id: NodeId) -> (f32, f32) {
        let node = &self.nodes[id.0];
        (node.width, node.height)
    }

    /// Position in stage coordinates, summing every ancestor offset.
    #[must_use]
    pub fn absolute_position(&self, id: NodeId) -> (f32, f32) {
        let mut current = Some(id);
        let (mut x, mut y) = (0.0, 0.0);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            x += node.x;
            y += node.y;
            current = node.parent;
        }
        (x, y)
    }

    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Bounds {
        let (x, y) = self.absolute_position(id);
        let (width, height) = self.size(id);
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    pub fn show(&mut self, id: NodeId) {
        self.nodes[id.0].visible = true;
    }

    pub fn hide(&mut self, id: NodeId) {
        self.nodes[id.0].visible = false;
    }

    /// Whether the node and every ancestor are visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Sets opacity (0-255) immediately, cancelling any running animation.
    pub fn set_opacity(&mut self, id: NodeId, opacity: u8) {
        let node = &mut self.nodes[id.0];
        node.transition = None;
        node.opacity = f32::from(opacity);
    }

    /// Animates opacity from its current value at `now` to `target`.
    pub fn animate_opacity(
        &mut self,
        id: NodeId,
        target: u8,
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) {
        let node = &mut self.nodes[id.0];
        let from = node.opacity_at(now);
        let to = f32::from(target);
        node.opacity = to;
        node.transition = Some(Transition {
            from,
            to,
            start: now,
            duration,
            easing,
        });
    }

    /// Final opacity of the node once any running animation completes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // stored from a u8
    pub fn target_opacity(&self, id: NodeId) -> u8 {
        self.nodes[id.0].opacity.round() as u8
    }

    /// Opacity of the node alone (0.0-255.0) at `now`.
    #[must_use]
    pub fn opacity_at(&self, id: NodeId, now: Instant) -> f32 {
        self.nodes[id.0].opacity_at(now)
    }

    /// Opacity multiplied through every ancestor, normalised to 0.0-1.0.
    #[must_use]
    pub fn effective_opacity(&self, id: NodeId, now: Instant) -> f32 {
        let mut current = Some(id);
        let mut alpha = 1.0;
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            alpha *= node.opacity_at(now) / 255.0;
            current = node.parent;
        }
        alpha
    }

    /// Whether any node still has an unfinished animation at `now`.
    #[must_use]
    pub fn is_animating(&self, now: Instant) -> bool {
        self.nodes
            .iter()
            .filter_map(|node| node.transition.as_ref())
            .any(|transition| !transition.is_finished(now))
    }

    /// Replaces the content of a text node. Other node kinds are left untouched.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeKind::Text { content, .. } = &mut self.nodes[id.0].kind {
            *content = text.into();
        }
    }

    /// Changes the font size of a text node. Other node kinds are left untouched.
    pub fn set_text_size(&mut self, id: NodeId, font_size: f32) {
        if let NodeKind::Text { size, .. } = &mut self.nodes[id.0].kind {
            *size = font_size;
        }
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Nodes in paint order (parents before children, siblings bottom to top).
    #[must_use]
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Topmost visible non-group node under the given stage position.
    #[must_use]
    pub fn pick(&self, x: f32, y: f32) -> Option<NodeId> {
        self.paint_order().into_iter().rev().find(|&id| {
            !matches!(self.nodes[id.0].kind, NodeKind::Group)
                && self.is_visible(id)
                && self.bounds(id).contains(x, y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{after_ms, assert_abs_diff_eq, F32_EPSILON};

    fn rect() -> NodeKind {
        NodeKind::Rect {
            color: Color::from_rgba8(0, 0, 0, 255),
        }
    }

    #[test]
    fn ease_out_quint_hits_endpoints() {
        assert_abs_diff_eq!(Easing::EaseOutQuint.apply(0.0), 0.0);
        assert_abs_diff_eq!(Easing::EaseOutQuint.apply(1.0), 1.0);
        assert!(Easing::EaseOutQuint.apply(0.5) > 0.9);
        assert_abs_diff_eq!(Easing::EaseOutQuint.apply(2.0), 1.0);
    }

    #[test]
    fn absolute_position_sums_ancestors() {
        let mut scene = Scene::new();
        let group = scene.add(scene.root(), NodeKind::Group);
        scene.set_position(group, 100.0, 50.0);
        let child = scene.add(group, rect());
        scene.set_position(child, 5.0, 7.0);

        assert_eq!(scene.absolute_position(child), (105.0, 57.0));
    }

    #[test]
    fn animation_interpolates_and_settles() {
        let start = Instant::now();
        let mut scene = Scene::new();
        let node = scene.add(scene.root(), rect());
        scene.set_opacity(node, 0);
        scene.animate_opacity(
            node,
            200,
            Duration::from_millis(100),
            Easing::Linear,
            start,
        );

        assert_abs_diff_eq!(scene.opacity_at(node, start), 0.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(
            scene.opacity_at(node, after_ms(start, 50)),
            100.0,
            epsilon = F32_EPSILON
        );
        assert_abs_diff_eq!(
            scene.opacity_at(node, after_ms(start, 500)),
            200.0,
            epsilon = F32_EPSILON
        );
        assert_eq!(scene.target_opacity(node), 200);
        assert!(scene.is_animating(after_ms(start, 50)));
        assert!(!scene.is_animating(after_ms(start, 100)));
    }

    #[test]
    fn retargeting_starts_from_current_value() {
        let start = Instant::now();
        let mut scene = Scene::new();
        let node = scene.add(scene.root(), rect());
        scene.set_opacity(node, 0);
        scene.animate_opacity(node, 200, Duration::from_millis(100), Easing::Linear, start);
        let midway = after_ms(start, 50);
        scene.animate_opacity(node, 0, Duration::from_millis(100), Easing::Linear, midway);

        assert_abs_diff_eq!(scene.opacity_at(node, midway), 100.0, epsilon = F32_EPSILON);
        assert_eq!(scene.target_opacity(node), 0);
    }

    #[test]
    fn effective_opacity_multiplies_through_parents() {
        let now = Instant::now();
        let mut scene = Scene::new();
        let group = scene.add(scene.root(), NodeKind::Group);
        scene.set_opacity(group, 51);
        let child = scene.add(group, rect());

        assert_abs_diff_eq!(scene.effective_opacity(child, now), 0.2, epsilon = F32_EPSILON);
    }

    #[test]
    fn pick_returns_topmost_visible_node() {
        let mut scene = Scene::new();
        let bottom = scene.add(scene.root(), rect());
        scene.set_size(bottom, 100.0, 100.0);
        let top = scene.add(scene.root(), rect());
        scene.set_size(top, 50.0, 50.0);

        assert_eq!(scene.pick(10.0, 10.0), Some(top));
        assert_eq!(scene.pick(75.0, 75.0), Some(bottom));

        scene.hide(top);
        assert_eq!(scene.pick(10.0, 10.0), Some(bottom));
        assert_eq!(scene.pick(500.0, 500.0), None);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut scene = Scene::new();
        let group = scene.add(scene.root(), NodeKind::Group);
        let child = scene.add(group, rect());
        scene.hide(group);
        assert!(!scene.is_visible(child));
    }

    #[test]
    fn set_text_only_affects_text_nodes() {
        let mut scene = Scene::new();
        let label = scene.add(
            scene.root(),
            NodeKind::Text {
                content: String::new(),
                size: 12.0,
                color: Color::from_rgba8(255, 255, 255, 255),
            },
        );
        let block = scene.add(scene.root(), rect());

        scene.set_text(label, "movie.mkv");
        scene.set_text(block, "ignored");

        assert_eq!(scene.text(label), Some("movie.mkv"));
        assert_eq!(scene.text(block), None);

        scene.set_text_size(label, 18.0);
        scene.set_text_size(block, 18.0);
        assert!(matches!(scene.kind(label), NodeKind::Text { size, .. } if *size == 18.0));
        assert_eq!(scene.kind(block), &rect());
    }

    #[test]
    fn paint_order_is_depth_first() {
        let mut scene = Scene::new();
        let a = scene.add(scene.root(), NodeKind::Group);
        let a1 = scene.add(a, rect());
        let b = scene.add(scene.root(), rect());

        assert_eq!(scene.paint_order(), vec![scene.root(), a, a1, b]);
    }
}
