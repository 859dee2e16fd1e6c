use bytemuck::{cast_slice, cast_slice_mut};
use itertools::izip;
use num_complex::{Complex32, Complex64};

use crate::hal::layouts::Part;

#[inline(always)]
pub fn as_cplx(a: &[f32]) -> &[Complex32] {
    cast_slice(a)
}

#[inline(always)]
pub fn as_cplx_mut(a: &mut [f32]) -> &mut [Complex32] {
    cast_slice_mut(a)
}

#[inline(always)]
fn widen(z: Complex32) -> Complex64 {
    Complex64::new(z.re as f64, z.im as f64)
}

/// `res += alpha * x`
pub fn cplx_axpy_ref(res: &mut [f32], alpha: Complex32, x: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(x.len(), res.len());
    }

    for (r, &xi) in izip!(as_cplx_mut(res).iter_mut(), as_cplx(x).iter()) {
        *r += alpha * xi
    }
}

pub fn cplx_scal_ref(res: &mut [f32], alpha: Complex32) {
    for r in as_cplx_mut(res) {
        *r *= alpha
    }
}

pub fn cplx_add_const_ref(res: &mut [f32], c: Complex32) {
    for r in as_cplx_mut(res) {
        *r += c
    }
}

/// `res *= a`, or `res *= conj(a)` if `conj`.
pub fn cplx_times_ref(res: &mut [f32], a: &[f32], conj: bool) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    let res: &mut [Complex32] = as_cplx_mut(res);
    let a: &[Complex32] = as_cplx(a);
    if conj {
        for i in 0..res.len() {
            res[i] *= a[i].conj()
        }
    } else {
        for i in 0..res.len() {
            res[i] *= a[i]
        }
    }
}

/// `res *= a` with a real `a` of half the word count.
pub fn cplx_times_real_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(2 * a.len(), res.len());
    }

    for (r, &ai) in izip!(as_cplx_mut(res).iter_mut(), a.iter()) {
        *r *= ai
    }
}

/// `res += |a|^2`, accumulated into the real part.
pub fn cplx_add_sqr_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), res.len());
    }

    for (r, ai) in izip!(as_cplx_mut(res).iter_mut(), as_cplx(a).iter()) {
        r.re += ai.norm_sqr()
    }
}

pub fn cplx_reciproc_ref(res: &mut [f32]) {
    for r in as_cplx_mut(res) {
        *r = r.inv()
    }
}

pub fn cplx_conj_ref(res: &mut [f32]) {
    for r in as_cplx_mut(res) {
        r.im = -r.im
    }
}

/// `res = a + 0i`
pub fn cplx_from_real_ref(res: &mut [f32], a: &[f32]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(2 * a.len(), res.len());
    }

    for (r, &ai) in izip!(as_cplx_mut(res).iter_mut(), a.iter()) {
        *r = Complex32::new(ai, 0.0)
    }
}

/// `res = pixel + 0i`
pub fn cplx_from_u16_ref(res: &mut [f32], px: &[u16]) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(2 * px.len(), res.len());
    }

    for (r, &p) in izip!(as_cplx_mut(res).iter_mut(), px.iter()) {
        *r = Complex32::new(p as f32, 0.0)
    }
}

/// Extracts one real projection of `a` into `res`.
pub fn cplx_part_ref(res: &mut [f32], a: &[f32], part: Part) {
    #[cfg(debug_assertions)]
    {
        assert_eq!(2 * res.len(), a.len());
    }

    let a: &[Complex32] = as_cplx(a);
    match part {
        Part::Real => izip!(res.iter_mut(), a.iter()).for_each(|(r, z)| *r = z.re),
        Part::Imag => izip!(res.iter_mut(), a.iter()).for_each(|(r, z)| *r = z.im),
        Part::Magnitude => izip!(res.iter_mut(), a.iter()).for_each(|(r, z)| *r = z.norm()),
        Part::Phase => izip!(res.iter_mut(), a.iter()).for_each(|(r, z)| *r = z.arg()),
    }
}

/// `<conj(a), b>`
pub fn cplx_dot_ref(a: &[f32], b: &[f32]) -> Complex64 {
    #[cfg(debug_assertions)]
    {
        assert_eq!(a.len(), b.len());
    }

    izip!(as_cplx(a).iter(), as_cplx(b).iter()).fold(Complex64::new(0.0, 0.0), |acc, (&x, &y)| {
        acc + widen(x).conj() * widen(y)
    })
}

pub fn cplx_norm2_ref(a: &[f32]) -> f64 {
    as_cplx(a).iter().fold(0.0, |acc, &z| acc + widen(z).norm_sqr())
}

pub fn cplx_sum_ref(a: &[f32]) -> Complex64 {
    as_cplx(a).iter().fold(Complex64::new(0.0, 0.0), |acc, &z| acc + widen(z))
}

#[cfg(test)]
mod tests {
    use num_complex::{Complex32, Complex64};

    use super::*;

    #[test]
    fn times_with_and_without_conj() {
        let a: [f32; 2] = [1.0, 2.0];
        let mut res: [f32; 2] = [3.0, -1.0];
        cplx_times_ref(&mut res, &a, false);
        assert_eq!(res, [5.0, 5.0]);

        let mut res: [f32; 2] = [3.0, -1.0];
        cplx_times_ref(&mut res, &a, true);
        assert_eq!(res, [1.0, -7.0]);
    }

    #[test]
    fn dot_conjugates_left_operand() {
        let a: [f32; 2] = [0.0, 1.0];
        assert_eq!(cplx_dot_ref(&a, &a), Complex64::new(1.0, 0.0));
        assert_eq!(cplx_dot_ref(&a, &[1.0, 0.0]), Complex64::new(0.0, -1.0));
        assert_eq!(cplx_norm2_ref(&[3.0, 4.0, 1.0, 0.0]), 26.0);
    }

    #[test]
    fn add_sqr_accumulates_magnitude() {
        let mut res: [f32; 4] = [1.0, 1.0, 0.0, 0.0];
        cplx_add_sqr_ref(&mut res, &[3.0, 4.0, 0.0, 2.0]);
        assert_eq!(res, [26.0, 1.0, 4.0, 0.0]);
    }

    #[test]
    fn parts_and_conversions() {
        let a: [f32; 4] = [3.0, 4.0, 0.0, -2.0];
        let mut out: [f32; 2] = [0.0; 2];
        cplx_part_ref(&mut out, &a, Part::Magnitude);
        assert_eq!(out, [5.0, 2.0]);
        cplx_part_ref(&mut out, &a, Part::Imag);
        assert_eq!(out, [4.0, -2.0]);
        cplx_part_ref(&mut out, &a, Part::Phase);
        assert!((out[1] + std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        let mut z: [f32; 4] = [9.0; 4];
        cplx_from_u16_ref(&mut z, &[7, 65535]);
        assert_eq!(z, [7.0, 0.0, 65535.0, 0.0]);

        let mut r: [f32; 2] = [0.0, 2.0];
        cplx_reciproc_ref(&mut r);
        assert_eq!(as_cplx(&r)[0], Complex32::new(0.0, -0.5));
    }
}
