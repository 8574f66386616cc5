//! Uniform cubic B-spline ("basis") through a sequence of points.
//!
//! The spline starts and ends on the first and last point but otherwise only
//! approximates the data, which smooths hourly jitter in the drawn line.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
}

fn bezier(p0: Point, p1: Point, next: Point) -> PathCommand {
    PathCommand::CubicTo {
        c1: Point::new((2.0 * p0.x + p1.x) / 3.0, (2.0 * p0.y + p1.y) / 3.0),
        c2: Point::new((p0.x + 2.0 * p1.x) / 3.0, (p0.y + 2.0 * p1.y) / 3.0),
        to: Point::new(
            (p0.x + 4.0 * p1.x + next.x) / 6.0,
            (p0.y + 4.0 * p1.y + next.y) / 6.0,
        ),
    }
}

/// Path commands for a basis spline through `points`
#[must_use]
pub fn basis(points: &[Point]) -> Vec<PathCommand> {
    let mut commands = Vec::with_capacity(points.len() + 2);
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return commands;
    };

    commands.push(PathCommand::MoveTo(first));
    match points.len() {
        1 => return commands,
        2 => {
            commands.push(PathCommand::LineTo(last));
            return commands;
        }
        _ => {}
    }

    let (p0, p1) = (points[0], points[1]);
    commands.push(PathCommand::LineTo(Point::new(
        (5.0 * p0.x + p1.x) / 6.0,
        (5.0 * p0.y + p1.y) / 6.0,
    )));
    for window in points.windows(3) {
        commands.push(bezier(window[0], window[1], window[2]));
    }

    let before_last = points[points.len() - 2];
    commands.push(bezier(before_last, last, last));
    commands.push(PathCommand::LineTo(last));
    commands
}

/// Compact number formatting for path data
pub(crate) fn fmt_num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// SVG `d` attribute for the commands
#[must_use]
pub fn to_svg_path(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        match command {
            PathCommand::MoveTo(p) => {
                d.push_str(&format!("M{},{}", fmt_num(p.x), fmt_num(p.y)));
            }
            PathCommand::LineTo(p) => {
                d.push_str(&format!("L{},{}", fmt_num(p.x), fmt_num(p.y)));
            }
            PathCommand::CubicTo { c1, c2, to } => {
                d.push_str(&format!(
                    "C{},{},{},{},{},{}",
                    fmt_num(c1.x),
                    fmt_num(c1.y),
                    fmt_num(c2.x),
                    fmt_num(c2.y),
                    fmt_num(to.x),
                    fmt_num(to.y)
                ));
            }
        }
    }
    d
}

/// Approximate the path with straight segments, `steps` per cubic
#[must_use]
pub fn flatten(commands: &[PathCommand], steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let mut points: Vec<Point> = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
            PathCommand::CubicTo { c1, c2, to } => {
                let Some(&from) = points.last() else {
                    points.push(to);
                    continue;
                };
                for step in 1..=steps {
                    let t = step as f64 / steps as f64;
                    let u = 1.0 - t;
                    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
                    points.push(Point::new(
                        a * from.x + b * c1.x + c * c2.x + d * to.x,
                        a * from.y + b * c1.y + c * c2.y + d * to.y,
                    ));
                }
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(6.0 * i as f64, 6.0 * i as f64)).collect()
    }

    #[test]
    fn test_basis_short_inputs() {
        assert!(basis(&[]).is_empty());
        assert_eq!(basis(&line(1)), vec![PathCommand::MoveTo(Point::new(0.0, 0.0))]);
        assert_eq!(
            basis(&line(2)),
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::LineTo(Point::new(6.0, 6.0)),
            ]
        );
    }

    #[test]
    fn test_basis_three_points() {
        let commands = basis(&line(3));
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::LineTo(Point::new(1.0, 1.0)),
                PathCommand::CubicTo {
                    c1: Point::new(2.0, 2.0),
                    c2: Point::new(4.0, 4.0),
                    to: Point::new(6.0, 6.0),
                },
                PathCommand::CubicTo {
                    c1: Point::new(8.0, 8.0),
                    c2: Point::new(10.0, 10.0),
                    to: Point::new(11.0, 11.0),
                },
                PathCommand::LineTo(Point::new(12.0, 12.0)),
            ]
        );
        assert_eq!(
            to_svg_path(&commands),
            "M0,0L1,1C2,2,4,4,6,6C8,8,10,10,11,11L12,12"
        );
    }

    #[test]
    fn test_basis_endpoints_are_exact() {
        let points = vec![
            Point::new(0.0, 10.0),
            Point::new(10.0, 40.0),
            Point::new(20.0, 5.0),
            Point::new(30.0, 25.0),
        ];
        let commands = basis(&points);
        assert_eq!(commands.first(), Some(&PathCommand::MoveTo(points[0])));
        assert_eq!(commands.last(), Some(&PathCommand::LineTo(points[3])));
        // one segment per interior point plus the closing segment
        let cubics = commands
            .iter()
            .filter(|c| matches!(c, PathCommand::CubicTo { .. }))
            .count();
        assert_eq!(cubics, 3);
    }

    #[test]
    fn test_flatten_follows_curve() {
        let commands = basis(&line(3));
        let points = flatten(&commands, 4);
        assert_eq!(points.len(), 2 + 4 + 4 + 1);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points.last(), Some(&Point::new(12.0, 12.0)));
        // collinear input keeps every flattened point on the diagonal
        assert!(points.iter().all(|p| (p.x - p.y).abs() < 1e-9));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }
}
