/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image processing routines over pixl buffers
//!
//! Every operation reads its input through a read only view and writes
//! a freshly allocated output rented from the caller's pool; sources
//! are never mutated in place. Output rows are independent of each
//! other, which lets each operation run in parallel row bands (see
//! [`utils::for_each_row_band`]).
//!
//! All state an operation needs arrives through [`ProcContext`], there
//! are no process wide globals.

pub use crate::binarize::{binarize, BinarizeMethod};
pub use crate::errors::ProcErrors;
pub use crate::grayscale::grayscale;
pub use crate::mathops::{image_math, MathMode};
pub use crate::mirror::{mirror, MirrorMode};
pub use crate::resize::{resize, ResizeMethod};
pub use crate::utils::Workers;

use pixl_core::pool::BufferPool;

mod binarize;
mod errors;
mod grayscale;
mod mathops;
mod mirror;
mod resize;
pub mod traits;
pub mod utils;

/// Everything an operation needs besides its operands
#[derive(Clone)]
pub struct ProcContext {
    /// Pool output buffers are rented from
    pub pool:    BufferPool,
    /// Worker threads row bands are spread across
    pub workers: Workers
}

impl ProcContext {
    /// Context with the default worker count
    pub fn new(pool: BufferPool) -> ProcContext {
        ProcContext {
            pool,
            workers: Workers::Auto
        }
    }

    #[must_use]
    pub fn with_workers(mut self, workers: Workers) -> ProcContext {
        self.workers = workers;
        self
    }
}
