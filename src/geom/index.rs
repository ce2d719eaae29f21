use geo::Rect;
use rstar::{
    primitives::{GeomWithData, Rectangle},
    RTree, AABB,
};

use super::Shape;

/// Bounding rectangle of one shape, tagged with its slot in the input order.
type SlotBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn envelope(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}

/// R-tree over shape bounding boxes, used as the broad phase of pairwise scans.
///
/// Shapes without a bounding box (empty geometry) are left out of the tree
/// and therefore never produce candidates.
#[derive(Debug)]
pub(crate) struct ShapeIndex {
    rtree: RTree<SlotBox>,
    len: usize,
}

impl ShapeIndex {
    /// Build the index; slot `k` refers to the `k`-th shape.
    pub(crate) fn new<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Self {
        let shapes = shapes.into_iter().collect::<Vec<_>>();
        let boxes = shapes.iter()
            .enumerate()
            .filter_map(|(slot, shape)| {
                let rect = shape.bounding_rect()?;
                Some(SlotBox::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), slot))
            })
            .collect::<Vec<_>>();

        Self { rtree: RTree::bulk_load(boxes), len: shapes.len() }
    }

    /// Number of shapes the index was built from (indexed or not).
    #[inline] pub(crate) fn len(&self) -> usize { self.len }

    /// Slots whose boxes intersect `rect` (touching counts), in ascending order.
    pub(crate) fn candidates(&self, rect: &Rect<f64>) -> Vec<usize> {
        let mut slots = self.rtree.locate_in_envelope_intersecting(&envelope(rect))
            .map(|entry| entry.data)
            .collect::<Vec<_>>();
        slots.sort_unstable();
        slots
    }

    /// Slots after `slot` whose boxes intersect its box, in ascending order.
    /// Each unordered pair is therefore produced exactly once.
    pub(crate) fn later_candidates(&self, slot: usize, rect: &Rect<f64>) -> Vec<usize> {
        let mut slots = self.candidates(rect);
        slots.retain(|&other| other > slot);
        slots
    }
}
