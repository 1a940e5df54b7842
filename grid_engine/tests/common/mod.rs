// Copyright 2026 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers")]

use std::io;
use std::sync::{Arc, Mutex};

use grid_engine::kurbo::{Axis, Rect};
use grid_engine::{GridBox, LayoutItem, PerAxis, SizeHint, SizePolicy};

/// Routes engine diagnostics to the test output.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` and returns the warnings and errors it logged.
pub(crate) fn capture_warnings(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

/// A configurable item recording the geometry it receives.
#[derive(Clone, Debug)]
pub(crate) struct TestItem {
    pub boxes: PerAxis<GridBox>,
    pub policy: PerAxis<SizePolicy>,
    pub descent: Option<f64>,
    /// The axis whose extent is `area / cross extent` when a constraint is given.
    pub dependent: Option<(Axis, f64)>,
    pub hidden: bool,
    pub geometry: Option<Rect>,
}

impl TestItem {
    pub(crate) fn new(horizontal: GridBox, vertical: GridBox) -> Self {
        Self {
            boxes: PerAxis::new(horizontal, vertical),
            policy: PerAxis::splat(SizePolicy::PREFERRED),
            descent: None,
            dependent: None,
            hidden: false,
            geometry: None,
        }
    }

    /// An item that only accepts `width` by `height`.
    pub(crate) fn fixed(width: f64, height: f64) -> Self {
        Self::new(GridBox::fixed(width), GridBox::fixed(height))
            .with_policy(SizePolicy::FIXED)
    }

    /// An item that prefers `width` by `height` and can grow without limit.
    pub(crate) fn growing(width: f64, height: f64) -> Self {
        Self::new(
            GridBox::new(0., width, GridBox::UNBOUNDED),
            GridBox::new(0., height, GridBox::UNBOUNDED),
        )
    }

    pub(crate) fn with_policy(mut self, policy: SizePolicy) -> Self {
        self.policy = PerAxis::splat(policy);
        self
    }

    pub(crate) fn with_descent(mut self, descent: f64) -> Self {
        self.descent = Some(descent);
        self
    }

    /// Makes the extent along `axis` depend on the extent of the other axis.
    pub(crate) fn depending(mut self, axis: Axis, area: f64) -> Self {
        self.dependent = Some((axis, area));
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl LayoutItem for TestItem {
    fn size_hint(&self, which: SizeHint, axis: Axis, constraint: Option<f64>) -> f64 {
        match (self.dependent, constraint) {
            (Some((dependent, area)), Some(cross)) if dependent == axis && cross > 0. => {
                area / cross
            }
            _ => self.boxes[axis].get(which),
        }
    }

    fn minimum_descent(&self, _constraint: Option<f64>) -> Option<f64> {
        self.descent
    }

    fn size_policy(&self, axis: Axis) -> SizePolicy {
        self.policy[axis]
    }

    fn dynamic_constraint(&self) -> Option<Axis> {
        self.dependent.map(|(axis, _)| axis)
    }

    fn is_empty(&self) -> bool {
        self.hidden
    }

    fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = Some(geometry);
    }
}
