/// Disjoint sets over `0..n` with path halving and union by size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Canonical representative of the set containing `a`.
    #[inline]
    pub fn find_set(&mut self, mut a: usize) -> usize {
        while self.parent[a] != a {
            self.parent[a] = self.parent[self.parent[a]];
            a = self.parent[a];
        }
        a
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were already joined.
    pub fn unite_sets(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find_set(a);
        let rb = self.find_set(b);
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] < self.size[rb] {
            (rb, ra)
        } else {
            (ra, rb)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    /// Number of elements in the set containing `a`.
    pub fn set_size(&mut self, a: usize) -> usize {
        let r = self.find_set(a);
        self.size[r]
    }

    /// Representative of every element, compressing all paths.
    pub fn roots(&mut self) -> Vec<usize> {
        (0..self.len()).map(|a| self.find_set(a)).collect()
    }

    /// Back to `n` singleton sets, reusing the allocation.
    pub fn reset(&mut self) {
        self.parent.iter_mut().enumerate().for_each(|(i, p)| *p = i);
        self.size.iter_mut().for_each(|s| *s = 1);
    }

    /// Resize to `n` singleton sets.
    pub fn reset_with_len(&mut self, n: usize) {
        self.parent.clear();
        self.parent.extend(0..n);
        self.size.clear();
        self.size.resize(n, 1);
    }
}
