use std::sync::mpsc::{Receiver, Sender};

use num_complex::{Complex32, Complex64};
use sigvec_utils::Map;
use tracing::{error, trace};

use crate::{
    hal::layouts::{Elem, PlanShape, Reduction},
    reference::{
        ReferencePlan, as_cplx_mut, cplx_add_const_ref, cplx_add_sqr_ref, cplx_axpy_ref, cplx_conj_ref,
        cplx_from_real_ref, cplx_from_u16_ref, cplx_reciproc_ref, cplx_scal_ref, cplx_times_real_ref, cplx_times_ref,
        fourier_shift_ref, paste_freq_ref, paste_ref, real_add_const_ref, real_add_sqr_ref, real_axpy_ref,
        real_reciproc_ref, real_scal_ref, real_times_ref, reduce_ref, vec_add_inplace_ref, vec_copy_ref,
        vec_zero_ref,
    },
};

/// Kernel launch. Lengths are in words and bound the slice each operand
/// is read or written through.
#[derive(Debug)]
pub(crate) enum Kernel {
    Zero {
        dst: u64,
        len: usize,
    },
    Copy {
        dst: u64,
        src: u64,
        len: usize,
    },
    CopyRealToCplx {
        dst: u64,
        src: u64,
        n: usize,
    },
    Add {
        dst: u64,
        src: u64,
        len: usize,
    },
    Axpy {
        elem: Elem,
        dst: u64,
        x: u64,
        len: usize,
        alpha: Complex32,
    },
    Scal {
        elem: Elem,
        dst: u64,
        len: usize,
        alpha: Complex32,
    },
    AddConst {
        elem: Elem,
        dst: u64,
        len: usize,
        c: Complex32,
    },
    Times {
        elem: Elem,
        dst: u64,
        a: u64,
        len: usize,
        conj: bool,
    },
    TimesReal {
        dst: u64,
        a: u64,
        n: usize,
    },
    AddSqr {
        elem: Elem,
        dst: u64,
        a: u64,
        len: usize,
    },
    Reciproc {
        elem: Elem,
        dst: u64,
        len: usize,
    },
    Conj {
        dst: u64,
        len: usize,
    },
    Paste {
        dst: u64,
        dst_dims: (usize, usize),
        src: u64,
        src_dims: (usize, usize),
        at: (usize, usize),
        zero: bool,
    },
    PasteFreq {
        dst: u64,
        dst_dims: (usize, usize),
        src: u64,
        src_dims: (usize, usize),
        offset: (isize, isize),
    },
    FourierShift {
        dst: u64,
        n: usize,
        kx: f64,
        ky: f64,
    },
}

/// Commands executed in issue order by the device worker.
#[derive(Debug)]
pub(crate) enum Command {
    Alloc { handle: u64, len: usize },
    Free { handle: u64 },
    Upload { dst: u64, data: Vec<f32> },
    UploadU16 { dst: u64, px: Vec<u16> },
    Download { src: u64, len: usize, reply: Sender<Option<Vec<f32>>> },
    Kernel(Kernel),
    Reduce {
        elem: Elem,
        op: Reduction,
        a: u64,
        b: Option<u64>,
        len: usize,
        reply: Sender<Option<Complex64>>,
    },
    CreatePlan { handle: u64, shape: PlanShape },
    DestroyPlan { handle: u64 },
    Fft { plan: u64, buf: u64, inverse: bool },
    Fence { reply: Sender<()> },
}

/// Device-side memory: buffers and plans, owned by the worker thread.
#[derive(Default)]
pub(crate) struct Worker {
    buffers: Map<u64, Vec<f32>>,
    plans: Map<u64, ReferencePlan>,
}

impl Worker {
    pub(crate) fn run(mut self, rx: Receiver<Command>) {
        while let Ok(cmd) = rx.recv() {
            self.execute(cmd);
        }
        trace!(buffers = self.buffers.len(), plans = self.plans.len(), "device worker stopped");
    }

    fn execute(&mut self, cmd: Command) {
        match cmd {
            Command::Alloc { handle, len } => {
                self.buffers.insert(handle, vec![0.0; len]);
            }
            Command::Free { handle } => {
                if self.buffers.remove(&handle).is_none() {
                    error!(handle, "free of unknown device buffer");
                }
            }
            Command::Upload { dst, data } => {
                self.with_mut(dst, |d| vec_copy_ref(&mut d[..data.len()], &data));
            }
            Command::UploadU16 { dst, px } => {
                self.with_mut(dst, |d| cplx_from_u16_ref(&mut d[..2 * px.len()], &px));
            }
            Command::Download { src, len, reply } => {
                let data: Option<Vec<f32>> = self.get(src).map(|s| s[..len].to_vec());
                let _ = reply.send(data);
            }
            Command::Kernel(kernel) => self.launch(kernel),
            Command::Reduce {
                elem,
                op,
                a,
                b,
                len,
                reply,
            } => {
                let res: Option<Complex64> = match b {
                    None => self.get(a).map(|a| reduce_ref(elem, op, &a[..len], None)),
                    Some(b) => match (self.get(a), self.get(b)) {
                        (Some(a), Some(b)) => Some(reduce_ref(elem, op, &a[..len], Some(&b[..len]))),
                        _ => None,
                    },
                };
                let _ = reply.send(res);
            }
            Command::CreatePlan { handle, shape } => {
                self.plans.insert(handle, ReferencePlan::new(shape));
            }
            Command::DestroyPlan { handle } => {
                if self.plans.remove(&handle).is_none() {
                    error!(handle, "destroy of unknown device plan");
                }
            }
            Command::Fft { plan, buf, inverse } => {
                let (Some(plan), Some(data)) = (self.plans.get(&plan), self.buffers.get_mut(&buf)) else {
                    error!(plan, buf, "transform with unknown plan or buffer");
                    return;
                };
                plan.execute(as_cplx_mut(&mut data[..2 * plan.shape().len()]), inverse);
            }
            Command::Fence { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn get(&self, handle: u64) -> Option<&Vec<f32>> {
        let buf: Option<&Vec<f32>> = self.buffers.get(&handle);
        if buf.is_none() {
            error!(handle, "unknown device buffer");
        }
        buf
    }

    fn with_mut(&mut self, handle: u64, f: impl FnOnce(&mut [f32])) {
        match self.buffers.get_mut(&handle) {
            Some(buf) => f(buf),
            None => error!(handle, "unknown device buffer"),
        }
    }

    /// Runs `f(dst, src)`. `src` may be `dst` itself, in which case it sees
    /// the content before the kernel.
    fn with_pair(&mut self, dst: u64, src: u64, f: impl FnOnce(&mut [f32], &[f32])) {
        let Some(mut d) = self.buffers.remove(&dst) else {
            error!(handle = dst, "unknown device buffer");
            return;
        };
        if dst == src {
            let s: Vec<f32> = d.clone();
            f(&mut d, &s);
        } else {
            match self.buffers.get(&src) {
                Some(s) => f(&mut d, s),
                None => error!(handle = src, "unknown device buffer"),
            }
        }
        self.buffers.insert(dst, d);
    }

    fn launch(&mut self, kernel: Kernel) {
        match kernel {
            Kernel::Zero { dst, len } => self.with_mut(dst, |d| vec_zero_ref(&mut d[..len])),
            Kernel::Copy { dst, src, len } => self.with_pair(dst, src, |d, s| vec_copy_ref(&mut d[..len], &s[..len])),
            Kernel::CopyRealToCplx { dst, src, n } => {
                self.with_pair(dst, src, |d, s| cplx_from_real_ref(&mut d[..2 * n], &s[..n]))
            }
            Kernel::Add { dst, src, len } => {
                self.with_pair(dst, src, |d, s| vec_add_inplace_ref(&mut d[..len], &s[..len]))
            }
            Kernel::Axpy {
                elem,
                dst,
                x,
                len,
                alpha,
            } => self.with_pair(dst, x, |d, s| match elem {
                Elem::Real => real_axpy_ref(&mut d[..len], alpha.re, &s[..len]),
                Elem::Cplx => cplx_axpy_ref(&mut d[..len], alpha, &s[..len]),
            }),
            Kernel::Scal { elem, dst, len, alpha } => self.with_mut(dst, |d| match elem {
                Elem::Real => real_scal_ref(&mut d[..len], alpha.re),
                Elem::Cplx => cplx_scal_ref(&mut d[..len], alpha),
            }),
            Kernel::AddConst { elem, dst, len, c } => self.with_mut(dst, |d| match elem {
                Elem::Real => real_add_const_ref(&mut d[..len], c.re),
                Elem::Cplx => cplx_add_const_ref(&mut d[..len], c),
            }),
            Kernel::Times {
                elem,
                dst,
                a,
                len,
                conj,
            } => self.with_pair(dst, a, |d, s| match elem {
                Elem::Real => real_times_ref(&mut d[..len], &s[..len]),
                Elem::Cplx => cplx_times_ref(&mut d[..len], &s[..len], conj),
            }),
            Kernel::TimesReal { dst, a, n } => {
                self.with_pair(dst, a, |d, s| cplx_times_real_ref(&mut d[..2 * n], &s[..n]))
            }
            Kernel::AddSqr { elem, dst, a, len } => self.with_pair(dst, a, |d, s| match elem {
                Elem::Real => real_add_sqr_ref(&mut d[..len], &s[..len]),
                Elem::Cplx => cplx_add_sqr_ref(&mut d[..len], &s[..len]),
            }),
            Kernel::Reciproc { elem, dst, len } => self.with_mut(dst, |d| match elem {
                Elem::Real => real_reciproc_ref(&mut d[..len]),
                Elem::Cplx => cplx_reciproc_ref(&mut d[..len]),
            }),
            Kernel::Conj { dst, len } => self.with_mut(dst, |d| cplx_conj_ref(&mut d[..len])),
            Kernel::Paste {
                dst,
                dst_dims: (dw, dh),
                src,
                src_dims: (sw, sh),
                at: (x, y),
                zero,
            } => self.with_pair(dst, src, |d, s| {
                paste_ref(&mut d[..2 * dw * dh], dw, dh, &s[..2 * sw * sh], sw, sh, x, y, zero)
            }),
            Kernel::PasteFreq {
                dst,
                dst_dims: (dw, dh),
                src,
                src_dims: (sw, sh),
                offset: (xo, yo),
            } => self.with_pair(dst, src, |d, s| {
                paste_freq_ref(&mut d[..2 * dw * dh], dw, dh, &s[..2 * sw * sh], sw, sh, xo, yo)
            }),
            Kernel::FourierShift { dst, n, kx, ky } => {
                self.with_mut(dst, |d| fourier_shift_ref(&mut d[..2 * n * n], n, kx, ky))
            }
        }
    }
}
