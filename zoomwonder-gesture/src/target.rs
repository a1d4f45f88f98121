//! Registered targets and their per-target zoom state.
//!
//! Targets form a forest through an optional parent link. The committed
//! transform, the active gesture and the running transition live here,
//! keyed by [`TargetId`], instead of on the host's elements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use zoomwonder_core::{Decimal, Extent, Point, Rect, Transform};

use crate::error::ZoomError;
use crate::gesture::Gesture;
use crate::input::InputEvent;
use crate::transition::Transition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Native size information used to derive a default viewport extent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetGeometry {
    /// An SVG root. With a viewBox the extent is the viewBox rectangle,
    /// otherwise `[0, 0]..[width, height]`.
    Svg {
        view_box: Option<Rect<Decimal>>,
        width: Decimal,
        height: Decimal,
    },
    /// Any other element, sized by its client box.
    Element {
        client_width: Decimal,
        client_height: Decimal,
    },
}

impl TargetGeometry {
    pub fn element(client_width: impl Into<Decimal>, client_height: impl Into<Decimal>) -> Self {
        TargetGeometry::Element {
            client_width: client_width.into(),
            client_height: client_height.into(),
        }
    }

    pub fn default_extent(&self) -> Extent {
        match self {
            TargetGeometry::Svg {
                view_box: Some(view_box),
                ..
            } => view_box.clone(),
            TargetGeometry::Svg { width, height, .. } => {
                Rect::new(Point::origin(), Point::new(width.clone(), height.clone()))
            }
            TargetGeometry::Element {
                client_width,
                client_height,
            } => Rect::new(
                Point::origin(),
                Point::new(client_width.clone(), client_height.clone()),
            ),
        }
    }
}

impl Default for TargetGeometry {
    fn default() -> Self {
        TargetGeometry::element(0, 0)
    }
}

/// Registration record for a new target.
#[derive(Clone, Debug)]
pub struct TargetSpec<D> {
    pub datum: D,
    pub parent: Option<TargetId>,
    pub geometry: TargetGeometry,
    /// Maximum simultaneous touch points the target reports.
    pub touch_points: u32,
}

impl<D> TargetSpec<D> {
    pub fn new(datum: D) -> Self {
        Self {
            datum,
            parent: None,
            geometry: TargetGeometry::default(),
            touch_points: 0,
        }
    }

    pub fn with_parent(mut self, parent: TargetId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_geometry(mut self, geometry: TargetGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_touch_points(mut self, touch_points: u32) -> Self {
        self.touch_points = touch_points;
        self
    }
}

/// Everything a per-target configuration callback may look at.
pub struct TargetContext<'a, D> {
    pub id: TargetId,
    pub datum: &'a D,
    /// Position of the target within the collection being operated on;
    /// 0 for input events.
    pub index: usize,
    pub transform: &'a Transform,
    pub geometry: &'a TargetGeometry,
    pub touch_points: u32,
    pub event: Option<&'a InputEvent>,
}

pub(crate) struct TargetNode<D> {
    pub id: TargetId,
    pub datum: D,
    pub parent: Option<TargetId>,
    pub geometry: TargetGeometry,
    pub touch_points: u32,
    pub attached: bool,
    pub transform: Option<Transform>,
    pub gesture: Option<Gesture>,
    pub transition: Option<Transition>,
}

impl<D> TargetNode<D> {
    /// The committed transform, identity when none has been set yet.
    pub fn current(&self) -> Transform {
        self.transform.clone().unwrap_or_default()
    }

    pub fn context<'a>(
        &'a self,
        transform: &'a Transform,
        index: usize,
        event: Option<&'a InputEvent>,
    ) -> TargetContext<'a, D> {
        TargetContext {
            id: self.id,
            datum: &self.datum,
            index,
            transform,
            geometry: &self.geometry,
            touch_points: self.touch_points,
            event,
        }
    }
}

pub(crate) struct TargetTree<D> {
    nodes: BTreeMap<TargetId, TargetNode<D>>,
    next_id: u64,
}

impl<D> TargetTree<D> {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn insert(&mut self, spec: TargetSpec<D>) -> Result<TargetId, ZoomError> {
        if let Some(parent) = spec.parent {
            if !self.nodes.contains_key(&parent) {
                return Err(ZoomError::UnknownTarget(parent));
            }
        }
        self.next_id += 1;
        let id = TargetId(self.next_id);
        self.nodes.insert(
            id,
            TargetNode {
                id,
                datum: spec.datum,
                parent: spec.parent,
                geometry: spec.geometry,
                touch_points: spec.touch_points,
                attached: false,
                transform: None,
                gesture: None,
                transition: None,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetNode<D>> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut TargetNode<D>> {
        self.nodes.get_mut(&id)
    }

    pub fn require(&self, id: TargetId) -> Result<&TargetNode<D>, ZoomError> {
        self.get(id).ok_or(ZoomError::UnknownTarget(id))
    }

    pub fn values(&self) -> impl Iterator<Item = &TargetNode<D>> {
        self.nodes.values()
    }

    /// Own transform, else the nearest ancestor's, else `None`.
    pub fn inherited_transform(&self, id: TargetId) -> Option<&Transform> {
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            if let Some(transform) = &node.transform {
                return Some(transform);
            }
            cursor = node.parent.and_then(|parent| self.get(parent));
        }
        None
    }
}
