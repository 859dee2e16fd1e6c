use num_complex::Complex32;

use crate::reference::{as_cplx, as_cplx_mut, vec_add_inplace_ref, vec_copy_ref};

/// Signed frequency of bin `i` in an `n`-point FFT-native axis.
#[inline(always)]
fn signed_freq(i: usize, n: usize) -> isize {
    if i < n / 2 { i as isize } else { i as isize - n as isize }
}

/// Destination bin of source bin `i`, or `None` if the frequency does not
/// fit in an `n_out`-point axis.
#[inline(always)]
fn remap_freq(i: usize, n_in: usize, n_out: usize, offset: isize) -> Option<usize> {
    let f: isize = signed_freq(i, n_in);
    let half: isize = (n_out / 2) as isize;
    let lo: isize = half - n_out as isize;
    if f < lo || f >= half {
        return None;
    }
    Some((f + offset).rem_euclid(n_out as isize) as usize)
}

/// Copies the `src_w x src_h` complex image into `res` at `(x, y)`,
/// zeroing `res` first if `zero`.
#[allow(clippy::too_many_arguments)]
pub fn paste_ref(
    res: &mut [f32],
    res_w: usize,
    res_h: usize,
    src: &[f32],
    src_w: usize,
    src_h: usize,
    x: usize,
    y: usize,
    zero: bool,
) {
    assert!(x + src_w <= res_w && y + src_h <= res_h);
    #[cfg(debug_assertions)]
    {
        assert_eq!(res.len(), 2 * res_w * res_h);
        assert_eq!(src.len(), 2 * src_w * src_h);
    }

    if zero {
        res.fill(0.0);
    }
    for j in 0..src_h {
        let d: usize = 2 * (x + (y + j) * res_w);
        let s: usize = 2 * j * src_w;
        vec_copy_ref(&mut res[d..d + 2 * src_w], &src[s..s + 2 * src_w]);
    }
}

/// Remaps a centered-DC `src` into FFT-native ordering in `res`.
///
/// Each source bin keeps its signed frequency, shifted by the offsets and
/// wrapped into the destination. Frequencies that do not fit are dropped and
/// uncovered destination bins are zero. With `res_w == 2 * src_w` bin `x`
/// lands on `x` or `x + res_w / 2`; with equal shapes the remap is a pure
/// cyclic shift by the offsets. Other ratios also place bins by signed
/// frequency rather than at `x + res_w / 2`, so cropping drops out-of-band
/// frequencies instead of wrapping them.
#[allow(clippy::too_many_arguments)]
pub fn paste_freq_ref(
    res: &mut [f32],
    res_w: usize,
    res_h: usize,
    src: &[f32],
    src_w: usize,
    src_h: usize,
    x_offset: isize,
    y_offset: isize,
) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(res.len(), 2 * res_w * res_h);
        assert_eq!(src.len(), 2 * src_w * src_h);
    }

    res.fill(0.0);
    let res: &mut [Complex32] = as_cplx_mut(res);
    let src: &[Complex32] = as_cplx(src);
    for y in 0..src_h {
        let Some(oy) = remap_freq(y, src_h, res_h, y_offset) else {
            continue;
        };
        for x in 0..src_w {
            if let Some(ox) = remap_freq(x, src_w, res_w, x_offset) {
                res[ox + oy * res_w] = src[x + y * src_w];
            }
        }
    }
}

/// Multiplies element `(x, y)` of the square `n x n` image by
/// `exp(2 pi i (kx x + ky y) / n)`.
pub fn fourier_shift_ref(res: &mut [f32], n: usize, kx: f64, ky: f64) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(res.len(), 2 * n * n);
    }

    let res: &mut [Complex32] = as_cplx_mut(res);
    let step: f64 = 2.0 * std::f64::consts::PI / n as f64;
    for y in 0..n {
        for x in 0..n {
            let (sin, cos) = (step * (kx * x as f64 + ky * y as f64)).sin_cos();
            res[x + y * n] *= Complex32::new(cos as f32, sin as f32);
        }
    }
}

/// Copies plane `z` of a `w x h x d` volume into `res`.
pub fn slice_ref(res: &mut [f32], src: &[f32], w: usize, h: usize, z: usize) {
    let plane: usize = 2 * w * h;
    assert!((z + 1) * plane <= src.len());
    vec_copy_ref(res, &src[z * plane..(z + 1) * plane]);
}

/// Sums planes `start..end` of a `w x h x d` volume into `res`.
pub fn project_ref(res: &mut [f32], src: &[f32], w: usize, h: usize, start: usize, end: usize) {
    let plane: usize = 2 * w * h;
    assert!(start <= end && end * plane <= src.len());
    res.fill(0.0);
    for z in start..end {
        vec_add_inplace_ref(res, &src[z * plane..(z + 1) * plane]);
    }
}
