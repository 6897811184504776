// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D quadtree over map-plane bounding boxes, used to pre-filter walls
//! before segment tests.

use crate::point::Point2d;

const MAX_ITEMS: usize = 8;
const MAX_DEPTH: usize = 8;

/// Axis-aligned box on the map plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min: Point2d,
    pub max: Point2d,
}

impl Bounds2 {
    pub fn new(a: Point2d, b: Point2d) -> Self {
        Self {
            min: Point2d::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2d::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2d>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds2) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x && self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    #[inline]
    pub fn contains(&self, other: &Bounds2) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x && self.min.y <= other.min.y && self.max.y >= other.max.y
    }

    pub fn union(&self, other: &Bounds2) -> Bounds2 {
        Bounds2 {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    fn quadrants(&self) -> [Bounds2; 4] {
        let c = nalgebra::center(&self.min, &self.max);
        [
            Bounds2::new(self.min, c),
            Bounds2::new(Point2d::new(c.x, self.min.y), Point2d::new(self.max.x, c.y)),
            Bounds2::new(Point2d::new(self.min.x, c.y), Point2d::new(c.x, self.max.y)),
            Bounds2::new(c, self.max),
        ]
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: Bounds2,
    items: Vec<(Bounds2, T)>,
    children: Option<Box<[Node<T>; 4]>>,
    depth: usize,
}

impl<T: Clone> Node<T> {
    fn new(bounds: Bounds2, depth: usize) -> Self {
        Self {
            bounds,
            items: Vec::new(),
            children: None,
            depth,
        }
    }

    fn insert(&mut self, bounds: Bounds2, item: T) {
        if let Some(children) = self.children.as_mut() {
            if let Some(child) = children.iter_mut().find(|c| c.bounds.contains(&bounds)) {
                child.insert(bounds, item);
                return;
            }
            self.items.push((bounds, item));
            return;
        }
        self.items.push((bounds, item));
        if self.items.len() > MAX_ITEMS && self.depth < MAX_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let [a, b, c, d] = self.bounds.quadrants();
        let depth = self.depth + 1;
        self.children = Some(Box::new([
            Node::new(a, depth),
            Node::new(b, depth),
            Node::new(c, depth),
            Node::new(d, depth),
        ]));
        for (bounds, item) in std::mem::take(&mut self.items) {
            self.insert(bounds, item);
        }
    }

    fn query(&self, area: &Bounds2, out: &mut Vec<T>) {
        out.extend(
            self.items
                .iter()
                .filter(|(b, _)| b.intersects(area))
                .map(|(_, item)| item.clone()),
        );
        if let Some(children) = &self.children {
            for child in children.iter().filter(|c| c.bounds.intersects(area)) {
                child.query(area, out);
            }
        }
    }
}

/// Quadtree of items keyed by their map-plane bounds.
///
/// Items outside the root bounds are kept at the root and checked on every query.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: Node<T>,
    len: usize,
}

impl<T: Clone> QuadTree<T> {
    pub fn new(bounds: Bounds2) -> Self {
        Self {
            root: Node::new(bounds, 0),
            len: 0,
        }
    }

    /// Build a tree sized to fit every item
    pub fn from_items(items: impl IntoIterator<Item = (Bounds2, T)>) -> Self {
        let items: Vec<(Bounds2, T)> = items.into_iter().collect();
        let bounds = items
            .iter()
            .map(|(b, _)| *b)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or(Bounds2::new(Point2d::origin(), Point2d::origin()));
        let mut tree = Self::new(bounds);
        for (b, item) in items {
            tree.insert(b, item);
        }
        tree
    }

    pub fn insert(&mut self, bounds: Bounds2, item: T) {
        self.root.insert(bounds, item);
        self.len += 1;
    }

    /// Items whose bounds touch `area`
    pub fn query(&self, area: &Bounds2) -> Vec<T> {
        let mut out = Vec::new();
        self.root.query(area, &mut out);
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
