use crate::image::Image;
use crate::types::Vector2f;

// Moore neighborhood, clockwise starting east, in image coordinates
// (y grows downward).
const DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Closed boundary of one bright component, in clockwise trace order.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Vector2f>,
    /// Unsigned polygon area of the boundary (shoelace formula).
    pub area: f32,
    /// Leftmost boundary column.
    pub min_x: f32,
}

/// Flattened skyline region: the boundary run between the horizontal
/// extrema, capped at both ends by a projection to the top edge of the
/// frame. First and last points always lie on y = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatContour {
    pub points: Vec<Vector2f>,
}

/// Trace the boundary of every bright (nonzero) component and return the
/// external contours sorted by descending area. Each boundary is walked
/// once with Moore neighbor tracing, starting from the west edge of a
/// bright run. Rims of interior holes come out counterclockwise and are
/// dropped.
pub fn trace_regions(binary: &Image) -> Vec<Contour> {
    let w = binary.width as i32;
    let h = binary.height as i32;
    let mut visited = vec![false; binary.width * binary.height];
    let mut contours = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            if binary.data[i] == 0 || visited[i] {
                continue;
            }
            if x > 0 && binary.value_i32(x - 1, y) != 0 {
                continue;
            }
            let points = trace_boundary(binary, x, y);
            for p in &points {
                visited[p.y as usize * binary.width + p.x as usize] = true;
            }
            if signed_area(&points) < 0.0 {
                continue;
            }
            contours.push(close_up(points));
        }
    }
    contours.sort_by(|a, b| b.area.total_cmp(&a.area));
    contours
}

fn close_up(points: Vec<Vector2f>) -> Contour {
    let area = signed_area(&points).abs();
    let min_x = points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    Contour {
        points,
        area,
        min_x,
    }
}

/// Signed shoelace area. Positive for clockwise paths in image
/// coordinates, so outer boundaries come out positive and hole rims
/// negative.
fn signed_area(points: &[Vector2f]) -> f32 {
    let mut sum = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
    }
    (sum / 2.0) as f32
}

/// Moore neighbor walk around one component, clockwise, until the walk
/// leaves the start pixel in its initial direction again.
fn trace_boundary(binary: &Image, x0: i32, y0: i32) -> Vec<Vector2f> {
    let w = binary.width as i32;
    let h = binary.height as i32;
    let start = (x0, y0);
    let mut points = vec![Vector2f::new(x0 as f32, y0 as f32)];
    let mut cur = start;
    let mut walk_dir = 0usize;
    let mut first_dir: Option<usize> = None;
    let mut arrived = [false; 8];
    // Every boundary pixel is visited from at most four directions.
    let max_steps = 4 * (binary.width * binary.height + 1);
    for _ in 0..max_steps {
        let mut found = None;
        for i in 0..8 {
            let dir = (walk_dir + 6 + i) % 8;
            let nx = cur.0 + DX[dir];
            let ny = cur.1 + DY[dir];
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            if binary.value_i32(nx, ny) != 0 {
                found = Some(((nx, ny), dir));
                break;
            }
        }
        let (next, dir) = match found {
            Some(step) => step,
            // Isolated pixel.
            None => break,
        };
        if cur == start {
            match first_dir {
                Some(first) if dir == first => break,
                Some(_) => {}
                None => first_dir = Some(dir),
            }
        }
        cur = next;
        walk_dir = dir;
        if cur == start {
            // Re-entering the start the same way twice means a closed
            // orbit that never retakes the first exit.
            if arrived[dir] {
                break;
            }
            arrived[dir] = true;
        } else {
            points.push(Vector2f::new(cur.0 as f32, cur.1 as f32));
        }
    }
    points
}

/// Reduce a closed contour to the open skyline span: keep the boundary run
/// between the extreme-left and extreme-right points, oriented left to
/// right, then cap both ends with their projections onto the top edge.
///
/// Of the two runs connecting the extremes, the one not containing the
/// trace start is kept. Tracing starts at the topmost boundary pixel, so
/// for a sky region this is the lower run, the skyline itself. When several
/// points share an extreme column the lowest one wins.
pub fn flatten(contour: &Contour) -> FlatContour {
    let points = &contour.points;
    let mut left = 0;
    let mut right = 0;
    for (i, p) in points.iter().enumerate() {
        let l = points[left];
        if p.x < l.x || (p.x == l.x && p.y > l.y) {
            left = i;
        }
        let r = points[right];
        if p.x > r.x || (p.x == r.x && p.y > r.y) {
            right = i;
        }
    }
    let mut flat = Vec::with_capacity(left.abs_diff(right) + 3);
    flat.push(Vector2f::new(points[left].x, 0.0));
    if left <= right {
        flat.extend_from_slice(&points[left..=right]);
    } else {
        flat.extend(points[right..=left].iter().rev());
    }
    flat.push(Vector2f::new(points[right].x, 0.0));
    FlatContour { points: flat }
}
