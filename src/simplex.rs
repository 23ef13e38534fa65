//! Downhill-simplex refinement of the bootstrap element set.
//!
//! Works entirely in the nonsingular parameter space of
//! [`crate::equinoctial`], so no move can step outside the set of valid
//! closed orbits. The scheme is the classic Nelder–Mead cycle: reflect the
//! worst vertex through the centroid of the rest, expand on success,
//! contract on failure, shrink everything toward the best vertex as a last
//! resort.

use crate::window::FitWindow;

const MAX_ITERATIONS: usize = 3000;
/// Scores below this are treated as converged.
const MIN_DELTA_SQUARED: f64 = 1e-22;
/// Initial displacement of each vertex from the starting point.
const NUDGE: f64 = 0.1;

#[derive(Clone, Copy)]
struct Vertex {
    params: [f64; 6],
    score: f64,
}

/// A general simplex move: the candidate is
/// `extrap · worst + (1 − extrap)/6 · Σ others`, and it replaces the worst
/// vertex iff it scores strictly lower. Returns the candidate's score.
fn try_move<F>(vertices: &mut [Vertex; 7], extrap: f64, score: &F) -> f64
where
    F: Fn(&[f64; 6]) -> f64,
{
    let frac = (1. - extrap) / 6.;
    let mut params = [0.; 6];
    for (i, slot) in params.iter_mut().enumerate() {
        let centroid_sum: f64 = vertices[..6].iter().map(|v| v.params[i]).sum();
        *slot = extrap * vertices[6].params[i] + frac * centroid_sum;
    }

    let candidate = Vertex {
        params,
        score: score(&params),
    };
    if candidate.score < vertices[6].score {
        vertices[6] = candidate;
    }
    candidate.score
}

/// Minimize the window's squared residual starting from `start`.
///
/// Vertex 0 is the starting point; vertex i (1..=6) nudges coordinate i−1 by
/// 0.1, with the two eccentricity-related coordinates first scaled toward
/// lower eccentricity. Stops when the worst/best score ratio collapses,
/// the best score hits the floor, or after 3000 iterations.
pub fn simplex_search(window: &FitWindow, start: &[f64; 6]) -> [f64; 6] {
    let score = |params: &[f64; 6]| window.sum_squared_residuals(params);

    let mut vertices = [Vertex {
        params: *start,
        score: 0.,
    }; 7];
    for (i, vertex) in vertices.iter_mut().enumerate() {
        if i > 0 {
            if i == 1 || i == 2 {
                // Eccentricity terms: bias the initial spread toward
                // smaller eccentricity.
                vertex.params[i - 1] *= 1. - NUDGE;
            }
            vertex.params[i - 1] += NUDGE;
        }
        vertex.score = score(&vertex.params);
    }

    for _ in 0..MAX_ITERATIONS {
        vertices.sort_by(|a, b| a.score.total_cmp(&b.score));
        let orig_worst = vertices[6].score;
        if orig_worst / vertices[0].score < 1.00001 || vertices[0].score < MIN_DELTA_SQUARED {
            break;
        }

        let reflected = try_move(&mut vertices, -1., &score);
        if reflected < vertices[0].score {
            try_move(&mut vertices, 2., &score); // expansion
        } else if reflected >= vertices[5].score {
            // Still (second-)worst: contract toward the centroid, on the
            // near side if the reflection at least improved matters.
            let fraction = if reflected < orig_worst { 0.5 } else { -0.5 };
            if try_move(&mut vertices, fraction, &score) > vertices[5].score {
                for i in 1..7 {
                    for j in 0..6 {
                        vertices[i].params[j] = (vertices[i].params[j] + vertices[0].params[j]) / 2.;
                    }
                    vertices[i].score = score(&vertices[i].params);
                }
            }
        }
    }

    vertices.sort_by(|a, b| a.score.total_cmp(&b.score));
    vertices[0].params
}
