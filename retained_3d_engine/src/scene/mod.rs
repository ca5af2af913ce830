//! Scene graph
//!
//! Frames form a tree through their child lists; meshes, nested frames and
//! lights are attached to frames and shared between them.

mod frame;

pub use frame::{CombineType, Frame, Visual, WeakFrame};
