//! Exact k-d tree under the Chebyshev (L∞) distance.
//!
//! Points are stored row-major (`n x dim`). The tree supports the two
//! queries needed by k-nearest-neighbour entropy estimators: distances
//! to the k nearest points and counting points in a closed ball
//! `{p : d(p, q) <= r}`. Both queries include points that coincide with
//! the query, so a query made with a stored point finds itself.

use nalgebra::DMatrix;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const LEAF_SIZE: usize = 16;

enum KdNode {
    Leaf {
        lb: usize,
        ub: usize,
    },
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

pub struct ChebyshevKdTree {
    points: Vec<f64>,
    dim: usize,
    index: Vec<usize>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct Neighbour {
    dist: f64,
    idx: usize,
}

impl PartialEq for Neighbour {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbour {}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.idx.cmp(&other.idx))
    }
}

/// L∞ distance between two points of the same dimension
#[inline]
pub fn chebyshev(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

impl ChebyshevKdTree {
    /// Build a tree over row-major points
    ///
    /// * `points` - flattened `n x dim` coordinates
    /// * `dim` - dimension of each point
    pub fn from_row_major(points: Vec<f64>, dim: usize) -> anyhow::Result<Self> {
        if dim == 0 {
            return Err(anyhow::anyhow!("point dimension must be positive"));
        }
        if points.len() % dim != 0 {
            return Err(anyhow::anyhow!(
                "{} coordinates can't be split into points of dimension {}",
                points.len(),
                dim
            ));
        }
        if points.iter().any(|x| !x.is_finite()) {
            return Err(anyhow::anyhow!("points must have finite coordinates"));
        }

        let nn = points.len() / dim;
        let mut index: Vec<usize> = (0..nn).collect();
        let mut nodes = Vec::with_capacity(2 * nn.div_ceil(LEAF_SIZE));

        let root = if nn > 0 {
            Some(build_node(&points, dim, &mut index, &mut nodes, 0, nn))
        } else {
            None
        };

        Ok(Self {
            points,
            dim,
            index,
            nodes,
            root,
        })
    }

    /// Build a tree treating each row of `data` as a point
    pub fn from_rows(data: &DMatrix<f64>) -> anyhow::Result<Self> {
        let dim = data.ncols();
        let mut points = Vec::with_capacity(data.nrows() * dim);
        for row in data.row_iter() {
            points.extend(row.iter().copied());
        }
        Self::from_row_major(points, dim)
    }

    /// Build a tree over scalar samples
    pub fn from_scalars(values: &[f64]) -> anyhow::Result<Self> {
        Self::from_row_major(values.to_vec(), 1)
    }

    pub fn num_points(&self) -> usize {
        self.index.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of the `i`-th point (in input order)
    pub fn point(&self, i: usize) -> &[f64] {
        &self.points[i * self.dim..(i + 1) * self.dim]
    }

    /// The `knn` nearest points to `query`, sorted by increasing
    /// distance (ties broken by point index)
    ///
    /// * `query` - query coordinates
    /// * `knn` - number of neighbours to return
    pub fn knn(&self, query: &[f64], knn: usize) -> Vec<(usize, f64)> {
        debug_assert_eq!(query.len(), self.dim);
        let mut heap = BinaryHeap::with_capacity(knn + 1);
        if let Some(root) = self.root {
            if knn > 0 {
                self.search_knn(root, query, knn, &mut heap);
            }
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|nb| (nb.idx, nb.dist))
            .collect()
    }

    /// Distance to the `knn`-th nearest point of `query` (1-based),
    /// counting a coincident point at distance zero
    pub fn kth_distance(&self, query: &[f64], knn: usize) -> anyhow::Result<f64> {
        if knn == 0 || knn > self.num_points() {
            return Err(anyhow::anyhow!(
                "can't take the {}-th neighbour among {} points",
                knn,
                self.num_points()
            ));
        }
        self.knn(query, knn)
            .last()
            .map(|&(_, d)| d)
            .ok_or_else(|| anyhow::anyhow!("empty neighbour list"))
    }

    /// Number of points within the closed ball of `radius` around `query`
    pub fn count_within(&self, query: &[f64], radius: f64) -> usize {
        let mut count = 0;
        self.visit_within(query, radius, |_| count += 1);
        count
    }

    /// Indexes of points within the closed ball of `radius` around `query`
    pub fn within(&self, query: &[f64], radius: f64) -> Vec<usize> {
        let mut ret = vec![];
        self.visit_within(query, radius, |i| ret.push(i));
        ret.sort_unstable();
        ret
    }

    fn visit_within(&self, query: &[f64], radius: f64, mut on_point: impl FnMut(usize)) {
        debug_assert_eq!(query.len(), self.dim);
        if radius < 0.0 {
            return;
        }
        if let Some(root) = self.root {
            self.search_within(root, query, radius, &mut on_point);
        }
    }

    fn search_knn(
        &self,
        node: usize,
        query: &[f64],
        knn: usize,
        heap: &mut BinaryHeap<Neighbour>,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { lb, ub } => {
                for &i in self.index[lb..ub].iter() {
                    let nb = Neighbour {
                        dist: chebyshev(self.point(i), query),
                        idx: i,
                    };
                    if heap.len() < knn {
                        heap.push(nb);
                    } else if let Some(worst) = heap.peek() {
                        if nb < *worst {
                            heap.pop();
                            heap.push(nb);
                        }
                    }
                }
            }
            KdNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                let (near, far) = if diff < 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.search_knn(near, query, knn, heap);
                let worst = heap.peek().map(|nb| nb.dist).unwrap_or(f64::INFINITY);
                if heap.len() < knn || diff.abs() <= worst {
                    self.search_knn(far, query, knn, heap);
                }
            }
        }
    }

    fn search_within(
        &self,
        node: usize,
        query: &[f64],
        radius: f64,
        on_point: &mut impl FnMut(usize),
    ) {
        match self.nodes[node] {
            KdNode::Leaf { lb, ub } => {
                for &i in self.index[lb..ub].iter() {
                    if chebyshev(self.point(i), query) <= radius {
                        on_point(i);
                    }
                }
            }
            KdNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                // left holds coordinates <= value, right holds >= value
                if diff <= radius {
                    self.search_within(left, query, radius, on_point);
                }
                if -diff <= radius {
                    self.search_within(right, query, radius, on_point);
                }
            }
        }
    }
}

fn build_node(
    points: &[f64],
    dim: usize,
    index: &mut [usize],
    nodes: &mut Vec<KdNode>,
    lb: usize,
    ub: usize,
) -> usize {
    let coord = |i: usize, a: usize| points[i * dim + a];

    // split along the axis of the widest spread
    let mut axis = 0;
    let mut spread = 0.0;
    if ub - lb > LEAF_SIZE {
        for a in 0..dim {
            let (lo, hi) = index[lb..ub]
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    (lo.min(coord(i, a)), hi.max(coord(i, a)))
                });
            if hi - lo > spread {
                spread = hi - lo;
                axis = a;
            }
        }
    }

    // small or degenerate (all coincident) blocks become leaves
    if ub - lb <= LEAF_SIZE || spread <= 0.0 {
        nodes.push(KdNode::Leaf { lb, ub });
        return nodes.len() - 1;
    }

    let mid = lb + (ub - lb) / 2;
    index[lb..ub].select_nth_unstable_by(mid - lb, |&i, &j| coord(i, axis).total_cmp(&coord(j, axis)));
    let value = coord(index[mid], axis);

    let this = nodes.len();
    nodes.push(KdNode::Leaf { lb, ub });
    let left = build_node(points, dim, index, nodes, lb, mid);
    let right = build_node(points, dim, index, nodes, mid, ub);
    nodes[this] = KdNode::Split {
        axis,
        value,
        left,
        right,
    };
    this
}
