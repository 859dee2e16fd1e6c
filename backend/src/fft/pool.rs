use std::{
    mem::ManuallyDrop,
    ops::{Deref, DerefMut},
};

use parking_lot::Mutex;
use sigvec_utils::Map;
use tracing::debug;

use crate::{
    error::{Result, VecError},
    hal::layouts::{DevicePlan, PlanShape},
};

/// A plan that knows the shape it was built for.
pub trait ShapedPlan: Send {
    fn plan_shape(&self) -> PlanShape;
}

impl ShapedPlan for DevicePlan {
    fn plan_shape(&self) -> PlanShape {
        self.shape()
    }
}

struct PoolState<P> {
    idle: Map<PlanShape, Vec<P>>,
    built: Map<PlanShape, usize>,
}

/// Shape-keyed pool of reusable transform plans.
///
/// A checked-out plan is owned by exactly one caller until it is released.
/// Concurrent requests for a shape whose plans are all checked out build an
/// additional plan, outside the lock, so no caller ever waits on another
/// caller's transform. Plans are never evicted.
pub struct PlanPool<P> {
    state: Mutex<PoolState<P>>,
}

impl<P: ShapedPlan> Default for PlanPool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ShapedPlan> PlanPool<P> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState {
                idle: Map::new(),
                built: Map::new(),
            }),
        }
    }

    /// Checks out a plan for `shape`, building one with `build` if none is
    /// idle. The plan must be handed back with [`PlanPool::release`].
    pub fn acquire<F>(&self, shape: PlanShape, build: F) -> Result<P>
    where
        F: FnOnce(PlanShape) -> Result<P>,
    {
        if let Some(plan) = self.state.lock().idle.get_mut(&shape).and_then(Vec::pop) {
            return Ok(plan);
        }

        let plan: P = build(shape)?;
        if plan.plan_shape() != shape {
            return Err(VecError::consistency(format!(
                "plan built for {:?} while {:?} was requested",
                plan.plan_shape(),
                shape
            )));
        }
        let mut state = self.state.lock();
        let built: &mut usize = state.built.get_or_insert_with(shape, || 0);
        *built += 1;
        debug!(?shape, built = *built, "transform plan built");
        Ok(plan)
    }

    /// Returns a plan checked out with [`PlanPool::acquire`].
    pub fn release(&self, shape: PlanShape, plan: P) -> Result<()> {
        if plan.plan_shape() != shape {
            return Err(VecError::consistency(format!(
                "plan for {:?} released as {:?}",
                plan.plan_shape(),
                shape
            )));
        }
        self.state.lock().idle.get_or_insert_with(shape, Vec::new).push(plan);
        Ok(())
    }

    /// Checks out a plan that is released when the lease is dropped.
    pub fn lease<F>(&self, shape: PlanShape, build: F) -> Result<PlanLease<'_, P>>
    where
        F: FnOnce(PlanShape) -> Result<P>,
    {
        let plan: P = self.acquire(shape, build)?;
        Ok(PlanLease {
            pool: self,
            plan: ManuallyDrop::new(plan),
        })
    }

    /// Number of plans ever built for `shape`.
    pub fn built(&self, shape: PlanShape) -> usize {
        self.state.lock().built.get(&shape).copied().unwrap_or(0)
    }

    /// Number of plans for `shape` currently waiting in the pool.
    pub fn idle(&self, shape: PlanShape) -> usize {
        self.state.lock().idle.get(&shape).map_or(0, Vec::len)
    }

    /// Number of distinct shapes seen so far.
    pub fn shapes(&self) -> usize {
        self.state.lock().built.len()
    }
}

/// A checked-out plan, returned to its pool on drop.
pub struct PlanLease<'a, P: ShapedPlan> {
    pool: &'a PlanPool<P>,
    plan: ManuallyDrop<P>,
}

impl<P: ShapedPlan> Deref for PlanLease<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.plan
    }
}

impl<P: ShapedPlan> DerefMut for PlanLease<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.plan
    }
}

impl<P: ShapedPlan> Drop for PlanLease<'_, P> {
    fn drop(&mut self) {
        // Taken exactly once, here.
        let plan: P = unsafe { ManuallyDrop::take(&mut self.plan) };
        let shape: PlanShape = plan.plan_shape();
        self.pool.state.lock().idle.get_or_insert_with(shape, Vec::new).push(plan);
    }
}
