use super::{Point2, TOLERANCE};

/// Returns `true` if the last vertex repeats the first one.
#[must_use]
pub fn is_closed(points: &[Point2]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => (first - last).norm() < TOLERANCE,
        _ => false,
    }
}

/// Returns the ring with the first vertex repeated at the end, if it was not already.
#[must_use]
pub fn close_ring(points: &[Point2]) -> Vec<Point2> {
    let mut ring = points.to_vec();
    if !is_closed(points) {
        if let Some(&first) = points.first() {
            ring.push(first);
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn close_ring_appends_once() {
        let closed = close_ring(&square());
        assert_eq!(closed.len(), 5);
        assert!(is_closed(&closed));
        assert_eq!(close_ring(&closed).len(), 5);
    }

    #[test]
    fn close_ring_empty() {
        assert!(close_ring(&[]).is_empty());
        assert!(!is_closed(&[]));
    }
}
