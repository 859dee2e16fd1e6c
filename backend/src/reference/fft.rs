use std::f64::consts::PI;

use num_complex::{Complex32, Complex64};

use crate::hal::layouts::PlanShape;

/// Precomputed roots of unity for one transform length.
///
/// Powers of two run an iterative radix-2 transform; any other length falls
/// back to a direct DFT. All arithmetic is done in `f64`.
pub struct FftTable {
    n: usize,
    /// `exp(-2 pi i k / n)` for `k` in `0..n`.
    roots: Vec<Complex64>,
    /// Bit-reversal permutation, empty for non power-of-two lengths.
    rev: Vec<usize>,
}

impl FftTable {
    pub fn new(n: usize) -> Self {
        assert!(n > 0);
        let roots: Vec<Complex64> = (0..n)
            .map(|k| Complex64::from_polar(1.0, -2.0 * PI * k as f64 / n as f64))
            .collect();
        let rev: Vec<usize> = if n.is_power_of_two() {
            let bits: u32 = n.trailing_zeros();
            (0..n)
                .map(|i| if bits == 0 { 0 } else { i.reverse_bits() >> (usize::BITS - bits) })
                .collect()
        } else {
            Vec::new()
        };
        Self { n, roots, rev }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline(always)]
    fn root(&self, k: usize, inverse: bool) -> Complex64 {
        let w: Complex64 = self.roots[k];
        if inverse { w.conj() } else { w }
    }

    /// Unnormalized in-place transform of `data`.
    pub fn execute(&self, data: &mut [Complex64], inverse: bool, scratch: &mut Vec<Complex64>) {
        #[cfg(debug_assertions)]
        {
            assert_eq!(data.len(), self.n);
        }

        if self.rev.is_empty() {
            self.dft(data, inverse, scratch)
        } else {
            self.radix2(data, inverse)
        }
    }

    fn radix2(&self, data: &mut [Complex64], inverse: bool) {
        let n: usize = self.n;
        for i in 0..n {
            let j: usize = self.rev[i];
            if i < j {
                data.swap(i, j);
            }
        }
        let mut len: usize = 2;
        while len <= n {
            let half: usize = len >> 1;
            let step: usize = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let u: Complex64 = data[start + k];
                    let v: Complex64 = data[start + k + half] * self.root(k * step, inverse);
                    data[start + k] = u + v;
                    data[start + k + half] = u - v;
                }
            }
            len <<= 1;
        }
    }

    fn dft(&self, data: &mut [Complex64], inverse: bool, scratch: &mut Vec<Complex64>) {
        let n: usize = self.n;
        scratch.clear();
        scratch.extend_from_slice(data);
        for (k, out) in data.iter_mut().enumerate() {
            let mut acc: Complex64 = Complex64::new(0.0, 0.0);
            for (j, &x) in scratch.iter().enumerate() {
                acc += x * self.root((j * k) % n, inverse);
            }
            *out = acc;
        }
    }
}

/// Calls `f` with the start index of every line along an axis of length
/// `len` whose elements are `stride` apart, in a buffer of `total` elements.
pub fn for_each_line(total: usize, len: usize, stride: usize, mut f: impl FnMut(usize)) {
    let block: usize = len * stride;
    for outer in 0..total / block {
        for inner in 0..stride {
            f(outer * block + inner)
        }
    }
}

/// Separable 1D/2D/3D transform over a row-major buffer, `x` fastest.
pub struct ReferencePlan {
    shape: PlanShape,
    tables: Vec<(usize, FftTable)>,
}

impl ReferencePlan {
    pub fn new(shape: PlanShape) -> Self {
        let mut stride: usize = 1;
        let mut tables: Vec<(usize, FftTable)> = Vec::new();
        for n in shape.axes() {
            if n > 1 {
                tables.push((stride, FftTable::new(n)));
            }
            stride *= n;
        }
        Self { shape, tables }
    }

    #[inline]
    pub fn shape(&self) -> PlanShape {
        self.shape
    }

    /// Unnormalized in-place transform; the inverse is not scaled by `1/N`.
    pub fn execute(&self, data: &mut [Complex32], inverse: bool) {
        assert_eq!(data.len(), self.shape.len());
        let total: usize = data.len();
        let mut line: Vec<Complex64> = Vec::new();
        let mut scratch: Vec<Complex64> = Vec::new();
        for (stride, table) in &self.tables {
            let (stride, n) = (*stride, table.len());
            for_each_line(total, n, stride, |start| {
                line.clear();
                line.extend((0..n).map(|i| {
                    let z: Complex32 = data[start + i * stride];
                    Complex64::new(z.re as f64, z.im as f64)
                }));
                table.execute(&mut line, inverse, &mut scratch);
                for (i, z) in line.iter().enumerate() {
                    data[start + i * stride] = Complex32::new(z.re as f32, z.im as f32);
                }
            });
        }
    }
}
