//! Post-processing applied to finished paths before delivery.

use waymark_core::Vec2;

/// Transforms a finished path. Modifiers run on the worker thread, in the
/// order they were given, before the path reaches the dispatcher.
pub trait PathModifier<P>: Send + Sync {
    fn modify(&self, path: Vec<P>) -> Vec<P>;
}

impl<P, F> PathModifier<P> for F
where
    F: Fn(Vec<P>) -> Vec<P> + Send + Sync,
{
    fn modify(&self, path: Vec<P>) -> Vec<P> {
        self(path)
    }
}

/// Drops interior points that lie on the straight segment between their
/// neighbours. Endpoints always survive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollinearSimplifier {
    /// Largest cross product of the two unit step directions still treated
    /// as straight.
    pub tolerance: f32,
}

impl Default for CollinearSimplifier {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl PathModifier<Vec2> for CollinearSimplifier {
    fn modify(&self, path: Vec<Vec2>) -> Vec<Vec2> {
        if path.len() < 3 {
            return path;
        }
        let mut out: Vec<Vec2> = Vec::with_capacity(path.len());
        for (i, &p) in path.iter().enumerate() {
            let Some(&next) = path.get(i + 1) else {
                out.push(p);
                break;
            };
            let Some(&prev) = out.last() else {
                out.push(p);
                continue;
            };
            let a = (p - prev).normalized();
            let b = (next - p).normalized();
            let cross = a.x * b.y - a.y * b.x;
            let straight = cross.abs() <= self.tolerance && a.dot(b) > 0.0;
            if !straight {
                out.push(p);
            }
        }
        out
    }
}
