//! Polygon membership, area and convex clipping

use super::Point;

/// Ordered vertex list, closed implicitly from the last vertex to the first
pub type Polygon = Vec<Point>;

/// Even-odd ray casting test.
///
/// A horizontal ray is cast from `point` towards +x and every edge it crosses
/// toggles membership. Horizontal edges never divide; they reuse the last
/// computed intersection and toggle only when `x` lies at or left of it.
/// Polygons with fewer than 3 vertices contain nothing.
pub fn point_in_zone(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let Point { x, y } = point;
    let mut inside = false;
    let mut x_intersection: Option<f64> = None;

    let mut p1 = polygon[0];
    for i in 1..=n {
        let p2 = polygon[i % n];
        if y > p1.y.min(p2.y) && y <= p1.y.max(p2.y) && x <= p1.x.max(p2.x) {
            if p1.y != p2.y {
                x_intersection = Some((y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x);
            }
            if p1.x == p2.x || x_intersection.is_some_and(|xi| x <= xi) {
                inside = !inside;
            }
        }
        p1 = p2;
    }

    inside
}

/// Shoelace area, positive for counter-clockwise order in a y-up frame
pub fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let twice: f64 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();

    twice / 2.0
}

/// Unsigned polygon area
pub fn polygon_area(polygon: &[Point]) -> f64 {
    signed_area(polygon).abs()
}

/// Clip `subject` against the convex polygon `clip` (Sutherland-Hodgman).
///
/// Either winding order is accepted for `clip`. The result is empty when the
/// shapes do not meet or `clip` has no area.
pub fn clip_convex(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    let orientation = signed_area(clip).signum();
    if orientation == 0.0 || subject.len() < 3 {
        return Vec::new();
    }

    let mut output: Vec<Point> = subject.to_vec();
    let n = clip.len();

    for i in 0..n {
        if output.is_empty() {
            break;
        }

        let a = clip[i];
        let b = clip[(i + 1) % n];
        let input = std::mem::take(&mut output);
        let inside = |p: Point| cross(a, b, p) * orientation >= 0.0;

        let mut prev = input[input.len() - 1];
        for &current in &input {
            match (inside(prev), inside(current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(edge_intersection(prev, current, a, b)),
                (false, true) => {
                    output.push(edge_intersection(prev, current, a, b));
                    output.push(current);
                }
                (false, false) => {}
            }
            prev = current;
        }
    }

    output
}

/// z-component of (b - a) x (p - a)
fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Intersection of segment `s`-`e` with the infinite line through `a`-`b`.
/// Only called when `s` and `e` lie on opposite sides of the line.
fn edge_intersection(s: Point, e: Point, a: Point, b: Point) -> Point {
    let ds = cross(a, b, s);
    let de = cross(a, b, e);
    let t = ds / (ds - de);
    Point::new(s.x + t * (e.x - s.x), s.y + t * (e.y - s.y))
}
