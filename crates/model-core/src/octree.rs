//! Point octree used to deduplicate coincident vertices.
//!
//! Pure acceleration structure: the only external contract is the
//! correctness of [`Octree::add_point`] and [`Octree::find_point`].
//! Cells live in an arena and reference their children by index, so the
//! tree has no pointer cycles. Leaf capacity and maximum depth are
//! tunable defaults, not part of the contract.

use nalgebra::Point3;

use crate::geometry::{is_equal_point3, is_greater_or_equal, BoundingBox};

/// Points per leaf before a cell subdivides.
const LEAF_CAPACITY: usize = 8;

/// Maximum subdivision depth, capping recursion on pathological inputs
/// (for example many distinct points inside one epsilon ball).
const MAX_DEPTH: usize = 10;

struct OctreePoint<T> {
    position: Point3<f64>,
    value: T,
}

struct OctreeCell<T> {
    bounds: BoundingBox,
    depth: usize,
    points: Vec<OctreePoint<T>>,
    /// Indices of the eight child cells once this cell has been split.
    children: Option<[usize; 8]>,
}

/// Spatial index mapping epsilon-deduplicated points to values.
pub struct Octree<T> {
    cells: Vec<OctreeCell<T>>,
}

impl<T> Octree<T> {
    /// Creates an octree covering `bounds`. Points outside the bounds are
    /// rejected rather than growing the tree.
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            cells: vec![OctreeCell {
                bounds,
                depth: 0,
                points: Vec::new(),
                children: None,
            }],
        }
    }

    /// Adds a point with an associated value.
    ///
    /// Returns `false` without storing anything if the point lies outside
    /// the octree bounds or an epsilon-equal point is already present.
    pub fn add_point(&mut self, point: &Point3<f64>, value: T) -> bool {
        if !self.cells[0].bounds.contains(point) {
            return false;
        }
        if self.find_point(point).is_some() {
            return false;
        }
        self.insert(0, point, value);
        true
    }

    /// Finds the value stored for an epsilon-equal point, if any.
    pub fn find_point(&self, point: &Point3<f64>) -> Option<&T> {
        let mut cell_index = 0;
        loop {
            let cell = &self.cells[cell_index];
            match cell.children {
                Some(children) => {
                    cell_index = children[octant_of(&cell.bounds, point)];
                }
                None => {
                    return cell
                        .points
                        .iter()
                        .find(|p| is_equal_point3(&p.position, point))
                        .map(|p| &p.value);
                }
            }
        }
    }

    fn insert(&mut self, cell_index: usize, point: &Point3<f64>, value: T) {
        if let Some(children) = self.cells[cell_index].children {
            let octant = octant_of(&self.cells[cell_index].bounds, point);
            self.insert(children[octant], point, value);
            return;
        }

        let cell = &mut self.cells[cell_index];
        if cell.points.len() < LEAF_CAPACITY || cell.depth >= MAX_DEPTH {
            cell.points.push(OctreePoint {
                position: *point,
                value,
            });
            return;
        }

        self.split(cell_index);
        self.insert(cell_index, point, value);
    }

    fn split(&mut self, cell_index: usize) {
        let bounds = self.cells[cell_index].bounds;
        let depth = self.cells[cell_index].depth;
        let center = bounds.center();

        let mut children = [0usize; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            let mut min = bounds.min;
            let mut max = center;
            if octant & 1 != 0 {
                min.x = center.x;
                max.x = bounds.max.x;
            }
            if octant & 2 != 0 {
                min.y = center.y;
                max.y = bounds.max.y;
            }
            if octant & 4 != 0 {
                min.z = center.z;
                max.z = bounds.max.z;
            }
            *child = self.cells.len();
            self.cells.push(OctreeCell {
                bounds: BoundingBox::new(min, max),
                depth: depth + 1,
                points: Vec::new(),
                children: None,
            });
        }

        let points = std::mem::take(&mut self.cells[cell_index].points);
        self.cells[cell_index].children = Some(children);
        for p in points {
            let octant = octant_of(&bounds, &p.position);
            self.cells[children[octant]].points.push(p);
        }
    }
}

/// Classifies a point into one of the eight octants of a cell.
///
/// Half-open per axis: a point epsilon-close to the center plane lands
/// deterministically in the upper octant, for both insertion and lookup.
fn octant_of(bounds: &BoundingBox, point: &Point3<f64>) -> usize {
    let center = bounds.center();
    let mut octant = 0;
    if is_greater_or_equal(point.x, center.x) {
        octant |= 1;
    }
    if is_greater_or_equal(point.y, center.y) {
        octant |= 2;
    }
    if is_greater_or_equal(point.z, center.z) {
        octant |= 4;
    }
    octant
}
