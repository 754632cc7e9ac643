pub mod serde;

use std::cmp::Ordering;
use std::fmt::Debug;

use num::Num;

/// ZeroSpVec is a sparse vector that treats zero elements as absent.
/// It holds `inds` and `vals`:
/// - `inds` holds the dimension index of each stored element
/// - `vals` holds the value of each stored element
///
/// Elements are guaranteed to be sorted by ascending index, and no stored value is zero.
#[derive(Clone, PartialEq)]
pub struct ZeroSpVec<N>
where
    N: Num + Copy,
{
    len: usize,
    inds: Vec<u32>,
    vals: Vec<N>,
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    /// Create an all-zero vector of logical length `len`
    #[inline]
    pub fn new(len: usize) -> Self {
        ZeroSpVec {
            len,
            inds: Vec::new(),
            vals: Vec::new(),
        }
    }

    /// Build from unordered `(index, value)` pairs.
    /// Duplicate indices are summed, zeros are dropped.
    ///
    /// # Panics
    /// In debug builds, if an index is out of range.
    pub fn from_pairs(len: usize, mut pairs: Vec<(u32, N)>) -> Self {
        // stable: duplicates keep their input order before summing
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut inds: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut vals: Vec<N> = Vec::with_capacity(pairs.len());
        for (idx, val) in pairs {
            debug_assert!((idx as usize) < len, "index {idx} out of range {len}");
            match inds.last() {
                Some(&last) if last == idx => {
                    if let Some(v) = vals.last_mut() {
                        *v = *v + val;
                    }
                }
                _ => {
                    inds.push(idx);
                    vals.push(val);
                }
            }
        }
        let mut vec = ZeroSpVec { len, inds, vals };
        vec.drop_zeros();
        vec
    }

    /// Build a sparse vector from a dense slice
    pub fn from_dense(dense: &[N]) -> Self {
        let mut vec = ZeroSpVec::new(dense.len());
        for (idx, &val) in dense.iter().enumerate() {
            if val != N::zero() {
                vec.inds.push(idx as u32);
                vec.vals.push(val);
            }
        }
        vec
    }

    fn drop_zeros(&mut self) {
        if self.vals.iter().all(|v| *v != N::zero()) {
            return;
        }
        let (inds, vals): (Vec<u32>, Vec<N>) = self
            .inds
            .iter()
            .zip(self.vals.iter())
            .filter(|(_, v)| **v != N::zero())
            .map(|(i, v)| (*i, *v))
            .unzip();
        self.inds = inds;
        self.vals = vals;
    }

    /// logical length (dimension count)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// true when every element is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    /// Value at `index`, `None` when out of range
    #[inline]
    pub fn get(&self, index: usize) -> Option<N> {
        if index >= self.len {
            return None;
        }
        match self.inds.binary_search(&(index as u32)) {
            Ok(pos) => Some(self.vals[pos]),
            Err(_) => Some(N::zero()),
        }
    }

    /// Iterate stored elements as `(index, value)` in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.inds
            .iter()
            .zip(self.vals.iter())
            .map(|(i, v)| (*i as usize, *v))
    }

    /// Apply `f` to every stored value.
    /// Values that become zero are dropped.
    pub fn map_values<F>(&mut self, f: F)
    where
        F: Fn(N) -> N,
    {
        for v in self.vals.iter_mut() {
            *v = f(*v);
        }
        self.drop_zeros();
    }

    #[inline]
    pub(crate) fn raw_parts(&self) -> (&[u32], &[N]) {
        (&self.inds, &self.vals)
    }
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy + Into<f64>,
{
    /// dot product
    /// d(a, b) = Σ(a_i * b_i)
    pub fn dot(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.len, other.len, "dot on vectors of different length");
        let mut a_it = self.raw_iter();
        let mut b_it = other.raw_iter();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut dot = 0_f64;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => {
                    dot += va.into() * vb.into();
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => a_next = a_it.next(),
                Ordering::Greater => b_next = b_it.next(),
            }
        }
        dot
    }

    /// ||a|| = sqrt(Σ(a_i^2))
    #[inline]
    pub fn norm(&self) -> f64 {
        self.vals
            .iter()
            .map(|v| {
                let v: f64 = (*v).into();
                v * v
            })
            .sum::<f64>()
            .sqrt()
    }

    /// cosine similarity
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    ///
    /// Zero-norm on either side yields exactly 0.0.
    /// The result is clamped to [-1, 1].
    pub fn cosine(&self, other: &Self) -> f64 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let score = self.dot(other) / (norm_a * norm_b);
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(-1.0, 1.0)
    }
}

impl<N> ZeroSpVec<N>
where
    N: num::Float,
{
    /// Scale to unit L2 norm. A zero vector is left untouched.
    pub fn l2_normalize(&mut self) {
        let norm = self
            .vals
            .iter()
            .fold(N::zero(), |acc, v| acc + *v * *v)
            .sqrt();
        if norm > N::zero() {
            self.map_values(|v| v / norm);
        }
    }
}

impl<N> Debug for ZeroSpVec<N>
where
    N: Num + Copy + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "ZeroSpVec(len: {}, nnz: {}) [", self.len, self.nnz())?;
            for (i, v) in self.inds.iter().zip(self.vals.iter()) {
                writeln!(f, "    {}: {:?}", i, v)?;
            }
            write!(f, "]")
        } else {
            f.debug_map()
                .entries(self.inds.iter().zip(self.vals.iter()))
                .finish()
        }
    }
}
