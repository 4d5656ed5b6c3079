//! Arc penalties for guided local search.
//!
//! Features are directed arcs between locations. The augmented objective seen by
//! the local search is `cost + lambda * sum(penalty(arc))` over the arcs in use.

#[derive(Debug, Clone, PartialEq)]
pub struct ArcPenalties {
    counts: Vec<u32>,
    num_locations: usize,
    lambda: f64,
}

impl ArcPenalties {
    pub fn new(num_locations: usize) -> Self {
        Self {
            counts: vec![0; num_locations * num_locations],
            num_locations,
            lambda: 0.0,
        }
    }

    #[inline]
    fn flatten(&self, from: usize, to: usize) -> usize {
        debug_assert!(from < self.num_locations && to < self.num_locations);
        from * self.num_locations + to
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    pub fn count(&self, from: usize, to: usize) -> u32 {
        self.counts[self.flatten(from, to)]
    }

    pub fn increment(&mut self, from: usize, to: usize) {
        let index = self.flatten(from, to);
        self.counts[index] = self.counts[index].saturating_add(1);
    }

    /// Weighted penalty of one arc.
    #[inline]
    pub fn arc_penalty(&self, from: usize, to: usize) -> f64 {
        if self.lambda == 0.0 {
            return 0.0;
        }
        self.lambda * self.count(from, to) as f64
    }

    pub fn total_count(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// GLS utility of an arc: its cost discounted by how often it was already penalised.
    pub fn utility(&self, from: usize, to: usize, arc_cost: f64) -> f64 {
        arc_cost / (1.0 + self.count(from, to) as f64)
    }
}
