// Points, quadrilaterals and 3x3 projective transforms.
//
// Matrices are row-major:
//
// [ m0 m1 m2 ]
// [ m3 m4 m5 ]
// [ m6 m7 m8 ]
//
// A point `(x, y)` maps to `(m0*x + m1*y + m2, m3*x + m4*y + m5) / (m6*x + m7*y + m8)`.

/// Smallest triangle area (in square pixels) accepted between any three quad corners.
const MIN_AREA: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Four corners in cyclic order: top-left, top-right, bottom-right, bottom-left
/// of the source rectangle they are the image of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// Axis-aligned rectangle with its top-left at (x, y).
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Quad([
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ])
    }

    /// Takes the first four points, `None` if there are fewer.
    pub fn from_slice(pts: &[Point]) -> Option<Self> {
        match pts {
            [a, b, c, d, ..] => Some(Quad([*a, *b, *c, *d])),
            _ => None,
        }
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.0
    }

    /// Edges as (start, end) pairs; edge i joins corner i and corner (i+1) mod 4.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        (0..4).map(|i| (self.0[i], self.0[(i + 1) % 4]))
    }

    pub fn centroid(&self) -> Point {
        let (sx, sy) = self.0.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// True when some three corners are (nearly) collinear or coincide, or a
    /// coordinate is not finite. No projective map onto such a quad exists.
    pub fn is_degenerate(&self) -> bool {
        if !self.0.iter().all(|p| p.is_finite()) {
            return true;
        }
        (0..4).any(|skip| {
            let [a, b, c] = self.others(skip);
            triangle_area(a, b, c).abs() < MIN_AREA
        })
    }

    fn others(&self, skip: usize) -> [Point; 3] {
        let mut out = [Point::default(); 3];
        let mut k = 0;
        for (i, p) in self.0.iter().enumerate() {
            if i != skip {
                out[k] = *p;
                k += 1;
            }
        }
        out
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
/// Returns `None` when a pivot vanishes.
fn solve_8x8(mut a: [[f64; 8]; 8], mut b: [f64; 8]) -> Option<[f64; 8]> {
    const EPS: f64 = 1e-12;

    for col in 0..8 {
        let pivot = (col..8).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < EPS {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..8 {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..8 {
                a[row][k] -= f * a[col][k];
            }
            b[row] -= f * b[col];
        }
    }

    let mut x = [0.0; 8];
    for row in (0..8).rev() {
        let tail: f64 = ((row + 1)..8).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// A 2D projective transform (homography). Affine maps are the special case
/// with last row `[0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub m: [f64; 9],
}

impl Homography {
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            m: [1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0],
        }
    }

    /// Rotation by `angle_deg` (counter-clockwise on screen) and uniform `scale`
    /// about `center`.
    pub fn rotation(center: Point, angle_deg: f64, scale: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let alpha = scale * cos;
        let beta = scale * sin;
        Self {
            m: [
                alpha,
                beta,
                (1.0 - alpha) * center.x - beta * center.y,
                -beta,
                alpha,
                beta * center.x + (1.0 - alpha) * center.y,
                0.0,
                0.0,
                1.0,
            ],
        }
    }

    /// Shift the output of an affine map by (tx, ty).
    pub fn then_translate(mut self, tx: f64, ty: f64) -> Self {
        self.m[2] += tx;
        self.m[5] += ty;
        self
    }

    /// The unique projective transform taking `src[i]` to `dst[i]` for all four corners.
    ///
    /// Returns `None` when either quad is degenerate (three corners collinear)
    /// or the solve is singular.
    pub fn from_quad_to_quad(src: &Quad, dst: &Quad) -> Option<Self> {
        if src.is_degenerate() || dst.is_degenerate() {
            return None;
        }

        // Unknowns [a b c d e f g h], with m8 fixed to 1:
        // [x y 1 0 0 0 -x*X -y*X] = X
        // [0 0 0 x y 1 -x*Y -y*Y] = Y
        let mut a = [[0.0; 8]; 8];
        let mut b = [0.0; 8];
        for (i, (s, d)) in src.0.iter().zip(dst.0.iter()).enumerate() {
            let (r0, r1) = (2 * i, 2 * i + 1);
            a[r0] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y];
            a[r1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y];
            b[r0] = d.x;
            b[r1] = d.y;
        }

        let x = solve_8x8(a, b)?;
        let mut m = [0.0; 9];
        m[..8].copy_from_slice(&x);
        m[8] = 1.0;

        let h = Self { m };
        (m.iter().all(|v| v.is_finite()) && determinant3x3(&m).abs() > f64::EPSILON).then_some(h)
    }

    /// The affine transform taking the three `src` points onto the three `dst` points.
    /// `None` when the source points are collinear.
    pub fn from_affine_points(src: [Point; 3], dst: [Point; 3]) -> Option<Self> {
        #[rustfmt::skip]
        let s = [
            src[0].x, src[0].y, 1.0,
            src[1].x, src[1].y, 1.0,
            src[2].x, src[2].y, 1.0,
        ];
        let det = determinant3x3(&s);
        if det.abs() < MIN_AREA {
            return None;
        }
        let adj = adjugate3x3(&s);
        let solve = |rhs: [f64; 3]| -> [f64; 3] {
            std::array::from_fn(|r| {
                (adj[r * 3] * rhs[0] + adj[r * 3 + 1] * rhs[1] + adj[r * 3 + 2] * rhs[2]) / det
            })
        };
        let row_x = solve([dst[0].x, dst[1].x, dst[2].x]);
        let row_y = solve([dst[0].y, dst[1].y, dst[2].y]);
        #[rustfmt::skip]
        let m = [
            row_x[0], row_x[1], row_x[2],
            row_y[0], row_y[1], row_y[2],
            0.0, 0.0, 1.0,
        ];
        Some(Self { m })
    }

    /// `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = determinant3x3(&self.m);
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let adj = adjugate3x3(&self.m);
        Some(Self {
            m: adj.map(|v| v / det),
        })
    }

    /// Map a point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(
            (m[0] * p.x + m[1] * p.y + m[2]) / w,
            (m[3] * p.x + m[4] * p.y + m[5]) / w,
        ))
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Signed distance from `p` to the closed polygon: positive inside, negative
/// outside, zero on an edge. The magnitude is the distance to the nearest edge.
pub fn signed_distance(polygon: &[Point], p: Point) -> f64 {
    let n = polygon.len();
    if n == 0 {
        return f64::NEG_INFINITY;
    }

    let mut min_dist = f64::INFINITY;
    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        min_dist = min_dist.min(distance_to_segment(p, a, b));

        // even-odd crossing of a ray towards +x
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }

    if min_dist == 0.0 {
        0.0
    } else if inside {
        min_dist
    } else {
        -min_dist
    }
}
