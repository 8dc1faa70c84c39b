use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Dataset, Join, Record, RecordKey, Viewport, reconcile};
use crate::render::{AttrMap, Primitive, RenderFrame};

/// Paint order of scene layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Background,
    Axis,
    Series,
    Annotation,
    Overlay,
}

/// One enter or update applied by `ShapeLayer::bind`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePatch {
    pub key: RecordKey,
    /// Displayed primitive before binding; `None` on enter.
    pub previous: Option<Primitive>,
    pub target: Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindOutcome {
    pub join: Join<RecordKey>,
    pub patches: Vec<ShapePatch>,
}

/// Keyed group of shapes bound to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLayer {
    kind: LayerKind,
    translate: (f64, f64),
    shapes: IndexMap<RecordKey, Primitive>,
}

impl ShapeLayer {
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            translate: (0.0, 0.0),
            shapes: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    #[must_use]
    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    pub fn set_translate(&mut self, dx: f64, dy: f64) {
        self.translate = (dx, dy);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<RecordKey> {
        self.shapes.keys().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&Primitive> {
        self.shapes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &Primitive)> {
        self.shapes.iter()
    }

    /// Binds one primitive per dataset record, keyed by `Dataset::key_of`.
    pub fn bind<F>(&mut self, dataset: &Dataset, mut shape_for: F) -> BindOutcome
    where
        F: FnMut(&Record, usize) -> Primitive,
    {
        self.bind_keyed(
            dataset
                .keyed()
                .enumerate()
                .map(|(index, (key, record))| (key, shape_for(record, index))),
        )
    }

    /// Replaces the layer contents with `items`: new keys enter, known keys
    /// update in place, missing keys exit. Afterwards the layer holds exactly
    /// one primitive per distinct key in `items` order.
    pub fn bind_keyed<I>(&mut self, items: I) -> BindOutcome
    where
        I: IntoIterator<Item = (RecordKey, Primitive)>,
    {
        let mut next: IndexMap<RecordKey, Primitive> = IndexMap::new();
        for (key, primitive) in items {
            if let Entry::Vacant(slot) = next.entry(key) {
                slot.insert(primitive);
            }
        }

        let previous_keys = self.keys();
        let next_keys: Vec<RecordKey> = next.keys().cloned().collect();
        let join = reconcile(&previous_keys, &next_keys);

        let patches = next
            .iter()
            .map(|(key, target)| ShapePatch {
                key: key.clone(),
                previous: self.shapes.get(key).cloned(),
                target: target.clone(),
            })
            .collect();

        trace!(
            enter = join.enter.len(),
            update = join.update.len(),
            exit = join.exit.len(),
            "bound shape layer"
        );
        self.shapes = next;
        BindOutcome { join, patches }
    }

    /// Overwrites attributes of one shape; returns `false` for unknown keys.
    pub fn apply_attrs(&mut self, key: &RecordKey, attrs: &AttrMap) -> bool {
        match self.shapes.get_mut(key) {
            Some(primitive) => {
                for (attr, value) in attrs {
                    primitive.attrs.insert(*attr, value.clone());
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Topmost shape under a surface-space point.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&RecordKey> {
        let (local_x, local_y) = (x - self.translate.0, y - self.translate.1);
        self.shapes
            .iter()
            .rev()
            .find(|(_, primitive)| primitive.contains(local_x, local_y))
            .map(|(key, _)| key)
    }
}

/// Named layers drawn on one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    viewport: Viewport,
    layers: IndexMap<String, ShapeLayer>,
}

impl Scene {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Layer named `name`, created empty with `kind` on first use.
    pub fn layer_mut(&mut self, name: &str, kind: LayerKind) -> &mut ShapeLayer {
        self.layers
            .entry(name.to_owned())
            .or_insert_with(|| ShapeLayer::new(kind))
    }

    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&ShapeLayer> {
        self.layers.get(name)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Empties every layer, keeping their placement.
    pub fn clear(&mut self) {
        for layer in self.layers.values_mut() {
            layer.clear();
        }
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.layers.values().map(ShapeLayer::len).sum()
    }

    /// Flattens layers by `LayerKind`, then creation order, applying each
    /// layer's translation.
    #[must_use]
    pub fn to_frame(&self) -> RenderFrame {
        let mut layers: Vec<&ShapeLayer> = self.layers.values().collect();
        layers.sort_by_key(|layer| layer.kind);

        let mut frame = RenderFrame::new(self.viewport);
        for layer in layers {
            let (dx, dy) = layer.translate;
            frame
                .primitives
                .extend(layer.shapes.values().map(|shape| shape.translated(dx, dy)));
        }
        frame
    }
}
