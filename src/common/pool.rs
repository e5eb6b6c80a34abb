//! Reusable scratch storage for constraint evaluation.
//!
//! A [`ScratchPool`] hands out frames of temporary vectors, matrices and
//! rotations. Each checkout returns a guard; dropping the guard returns the
//! frame, so checkouts and returns always pair up within one call. Frames are
//! allocated once and recycled, so steady-state stepping does not touch the
//! heap.
//!
//! A pool is single-threaded state. Every island solved concurrently owns
//! its own pool.

use std::ops::{Deref, DerefMut};

use crate::math::{Mat22, Rot, Vec2};

/// Temporaries available in one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scratch {
    pub vec2: [Vec2; 4],
    pub mat22: [Mat22; 2],
    pub rot: [Rot; 2],
}

#[derive(Debug, Default)]
pub struct ScratchPool {
    frames: Vec<Scratch>,
    depth: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates `frames` nested frames.
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            frames: vec![Scratch::default(); frames],
            depth: 0,
        }
    }

    /// Checks out a zeroed frame. It is returned when the guard drops.
    pub fn checkout(&mut self) -> ScratchGuard<'_> {
        if self.depth == self.frames.len() {
            self.frames.push(Scratch::default());
        }
        let index = self.depth;
        self.depth += 1;
        self.frames[index] = Scratch::default();
        ScratchGuard { pool: self, index }
    }

    /// Number of frames currently checked out.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of frames ever allocated.
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }
}

/// A checked-out frame. Nested checkouts go through [`ScratchGuard::checkout`].
pub struct ScratchGuard<'a> {
    pool: &'a mut ScratchPool,
    index: usize,
}

impl ScratchGuard<'_> {
    pub fn checkout(&mut self) -> ScratchGuard<'_> {
        self.pool.checkout()
    }
}

impl Deref for ScratchGuard<'_> {
    type Target = Scratch;

    fn deref(&self) -> &Scratch {
        &self.pool.frames[self.index]
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Scratch {
        &mut self.pool.frames[self.index]
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        debug_assert_eq!(self.pool.depth, self.index + 1, "scratch frame returned out of order");
        self.pool.depth -= 1;
    }
}
