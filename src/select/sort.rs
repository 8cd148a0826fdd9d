//! Pareto dominance, non-dominated sorting and crowding distance (NSGA-II).
//!
//! Every objective is maximized.

use std::cmp::Ordering;

/// `a` dominates `b`: no worse in every objective and strictly better in at least one.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x < y {
            return false;
        }
        if x > y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort. Returns fronts of indices into `points`, best front first.
/// Within a front, indices keep ascending input order.
pub fn non_dominated_fronts(points: &[[f64; 3]]) -> Vec<Vec<usize>> {
    let n = points.len();
    let mut dominated_by_me: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();

    for p in 0..n {
        for q in (p + 1)..n {
            if dominates(&points[p], &points[q]) {
                dominated_by_me[p].push(q);
                domination_count[q] += 1;
            } else if dominates(&points[q], &points[p]) {
                dominated_by_me[q].push(p);
                domination_count[p] += 1;
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &p in &current {
            for &q in &dominated_by_me[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance for each member of `front` (same order as `front`).
/// Boundary points of every objective get `f64::INFINITY`.
pub fn crowding_distance(points: &[[f64; 3]], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    let mut dist = vec![0.0f64; n];
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut order: Vec<usize> = (0..n).collect();
    for m in 0..3 {
        order.sort_by(|&a, &b| {
            points[front[a]][m]
                .partial_cmp(&points[front[b]][m])
                .unwrap_or(Ordering::Equal)
        });
        let lo = points[front[order[0]]][m];
        let hi = points[front[order[n - 1]]][m];
        dist[order[0]] = f64::INFINITY;
        dist[order[n - 1]] = f64::INFINITY;
        let span = hi - lo;
        if span <= 0.0 || !span.is_finite() {
            continue;
        }
        for k in 1..n - 1 {
            let prev = points[front[order[k - 1]]][m];
            let next = points[front[order[k + 1]]][m];
            dist[order[k]] += (next - prev) / span;
        }
    }
    dist
}

/// NSGA-II environmental selection: indices of the `k` survivors among `points`.
///
/// Whole fronts are taken best-first; the front that overflows is truncated by
/// descending crowding distance.
pub fn select_nsga2(points: &[[f64; 3]], k: usize) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(k);
    for front in non_dominated_fronts(points) {
        if chosen.len() >= k {
            break;
        }
        let room = k - chosen.len();
        if front.len() <= room {
            chosen.extend(front);
            continue;
        }
        let dist = crowding_distance(points, &front);
        let mut ranked: Vec<(usize, f64)> = front.into_iter().zip(dist).collect();
        // Stable sort keeps input order among equal distances.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        chosen.extend(ranked.into_iter().take(room).map(|(i, _)| i));
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominance_needs_strict_improvement() {
        assert!(dominates(&[1.0, 1.0, 1.0], &[0.0, 1.0, 1.0]));
        assert!(!dominates(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]));
        assert!(!dominates(&[2.0, 0.0, 1.0], &[1.0, 1.0, 1.0]));
    }

    #[test]
    fn fronts_are_layered() {
        let pts = [
            [3.0, 3.0, 3.0], // 0: front 0
            [1.0, 1.0, 1.0], // 1: front 2
            [2.0, 2.0, 2.0], // 2: front 1
            [4.0, 0.0, 0.0], // 3: front 0 (best in probability)
            [2.0, 2.0, 0.5], // 4: front 2 (dominated by 2)
        ];
        let fronts = non_dominated_fronts(&pts);
        assert_eq!(fronts, vec![vec![0, 3], vec![2], vec![1, 4]]);
    }

    #[test]
    fn no_survivor_is_dominated_by_a_better_front() {
        let pts: Vec<[f64; 3]> = (0..30)
            .map(|i| {
                let x = i as f64;
                [x % 7.0, (x * 3.0) % 11.0, 30.0 - x]
            })
            .collect();
        let fronts = non_dominated_fronts(&pts);
        assert_eq!(fronts.iter().map(Vec::len).sum::<usize>(), pts.len());
        for a in &fronts[0] {
            for b in &fronts[0] {
                assert!(!dominates(&pts[*a], &pts[*b]));
            }
        }
        for (rank, front) in fronts.iter().enumerate().skip(1) {
            for &i in front {
                assert!(
                    fronts[rank - 1].iter().any(|&j| dominates(&pts[j], &pts[i])),
                    "member of front {rank} must be dominated by the previous front"
                );
            }
        }
    }

    #[test]
    fn crowding_prefers_spread() {
        // One front on a line; middle point 2 is tightly packed next to 1.
        let pts = [
            [0.0, 10.0, 0.0],
            [5.0, 5.0, 0.0],
            [5.5, 4.5, 0.0],
            [10.0, 0.0, 0.0],
        ];
        let front = vec![0, 1, 2, 3];
        let d = crowding_distance(&pts, &front);
        assert!(d[0].is_infinite() && d[3].is_infinite());
        assert!(d[1] > 0.0 && d[2] > 0.0);

        let survivors = select_nsga2(&pts, 3);
        assert_eq!(survivors.len(), 3);
        assert!(survivors.contains(&0) && survivors.contains(&3));
    }

    #[test]
    fn select_takes_whole_fronts_first() {
        let pts = [[3.0, 3.0, 3.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        assert_eq!(select_nsga2(&pts, 2), vec![0, 2]);
        assert_eq!(select_nsga2(&pts, 10), vec![0, 2, 1]);
    }
}
