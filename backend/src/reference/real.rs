use itertools::izip;

pub fn vec_zero_ref(res: &mut [f32]) {
    res.fill(0.0);
}

pub fn vec_copy_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    res.copy_from_slice(a);
}

/// `res += a`, word by word. Valid for real and interleaved complex data.
pub fn vec_add_inplace_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    for i in 0..res.len() {
        res[i] += a[i]
    }
}

/// `res += alpha * x`
pub fn real_axpy_ref(res: &mut [f32], alpha: f32, x: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(x.len(), res.len());
    }

    for i in 0..res.len() {
        res[i] += alpha * x[i]
    }
}

pub fn real_scal_ref(res: &mut [f32], alpha: f32) {
    for ri in res {
        *ri *= alpha
    }
}

pub fn real_add_const_ref(res: &mut [f32], c: f32) {
    for ri in res {
        *ri += c
    }
}

pub fn real_times_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    for i in 0..res.len() {
        res[i] *= a[i]
    }
}

/// `res += a^2`
pub fn real_add_sqr_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    for i in 0..res.len() {
        res[i] += a[i] * a[i]
    }
}

/// `res = 1 / res`; zeros map to infinities.
pub fn real_reciproc_ref(res: &mut [f32]) {
    for ri in res {
        *ri = 1.0 / *ri
    }
}

pub fn real_dot_ref(a: &[f32], b: &[f32]) -> f64 {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), b.len());
    }

    izip!(a.iter(), b.iter()).fold(0.0, |acc, (&x, &y)| acc + x as f64 * y as f64)
}

pub fn real_norm2_ref(a: &[f32]) -> f64 {
    a.iter().fold(0.0, |acc, &x| acc + x as f64 * x as f64)
}

pub fn real_sum_ref(a: &[f32]) -> f64 {
    a.iter().fold(0.0, |acc, &x| acc + x as f64)
}

pub fn real_min_ref(a: &[f32]) -> f32 {
    a.iter().copied().fold(f32::INFINITY, f32::min)
}

pub fn real_max_ref(a: &[f32]) -> f32 {
    a.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

pub fn real_avr_ref(a: &[f32]) -> f64 {
    real_sum_ref(a) / a.len() as f64
}

/// Median of `a`. For an even count, the mean of the two middle values.
pub fn real_median_ref(a: &[f32]) -> f64 {
    assert!(!a.is_empty());
    let mut sorted: Vec<f32> = a.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    let mid: usize = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) * 0.5
    }
}

/// Indices of the `n` elements of largest magnitude, largest first.
/// Ties keep the lower index first.
pub fn real_n_largest_idx_ref(a: &[f32], n: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..a.len()).collect();
    idx.sort_by(|&i, &j| a[j].abs().total_cmp(&a[i].abs()).then(i.cmp(&j)));
    idx.truncate(n);
    idx
}

/// Affinely maps `[min(res), max(res)]` onto `[vmin, vmax]`.
/// A constant vector maps to `vmin`.
pub fn real_normalize_ref(res: &mut [f32], vmin: f32, vmax: f32) {
    let lo: f32 = real_min_ref(res);
    let hi: f32 = real_max_ref(res);
    let range: f32 = hi - lo;
    if range == 0.0 {
        res.fill(vmin);
        return;
    }
    let scale: f32 = (vmax - vmin) / range;
    for ri in res {
        *ri = (*ri - lo) * scale + vmin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_even_and_odd() {
        assert_eq!(real_median_ref(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(real_median_ref(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn n_largest_by_magnitude() {
        let a: [f32; 6] = [0.5, -7.0, 3.0, 7.0, -0.1, 2.0];
        assert_eq!(real_n_largest_idx_ref(&a, 3), vec![1, 3, 2]);
        assert_eq!(real_n_largest_idx_ref(&a, 10).len(), 6);
    }

    #[test]
    fn normalize_maps_range() {
        let mut a: [f32; 4] = [2.0, 4.0, 6.0, 10.0];
        real_normalize_ref(&mut a, 0.0, 1.0);
        assert_eq!(a, [0.0, 0.25, 0.5, 1.0]);

        let mut flat: [f32; 3] = [5.0; 3];
        real_normalize_ref(&mut flat, -1.0, 1.0);
        assert_eq!(flat, [-1.0; 3]);
    }

    #[test]
    fn reductions_accumulate_in_f64() {
        let a: Vec<f32> = vec![1.0e-4; 100_000];
        assert!((real_sum_ref(&a) - 10.0).abs() < 1e-6);
        assert_eq!(real_dot_ref(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(real_norm2_ref(&[3.0, 4.0]), 25.0);
        assert_eq!(real_min_ref(&[3.0, -4.0, 1.0]), -4.0);
        assert_eq!(real_max_ref(&[3.0, -4.0, 1.0]), 3.0);
    }
}
