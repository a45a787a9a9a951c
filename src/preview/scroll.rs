//! Reciprocal scroll synchronization between editor and preview.

use std::cell::Cell;

/// A scrollbar that can be moved programmatically.
pub trait ScrollBar {
    fn maximum(&self) -> i32;

    /// Move the scrollbar. Implementations may call back into
    /// [`ScrollSync`] synchronously, as toolkit signals do.
    fn set_value(&self, value: i32);
}

/// Mirrors one scrollbar's position onto the other by ratio.
///
/// A programmatic move of the target echoes back as a scroll notification;
/// the guard flag drops that echo instead of bouncing it back.
#[derive(Debug, Default)]
pub struct ScrollSync {
    syncing: Cell<bool>,
}

impl ScrollSync {
    pub const fn new() -> Self {
        Self {
            syncing: Cell::new(false),
        }
    }

    /// The editor moved to `value`; update the preview.
    pub fn editor_scrolled(&self, value: i32, editor: &dyn ScrollBar, preview: &dyn ScrollBar) {
        self.mirror(value, editor, preview);
    }

    /// The preview moved to `value`; update the editor.
    pub fn preview_scrolled(&self, value: i32, preview: &dyn ScrollBar, editor: &dyn ScrollBar) {
        self.mirror(value, preview, editor);
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.get()
    }

    fn mirror(&self, value: i32, source: &dyn ScrollBar, target: &dyn ScrollBar) {
        if self.syncing.replace(true) {
            return;
        }
        let _guard = SyncGuard(&self.syncing);
        target.set_value(scaled_position(value, source.maximum(), target.maximum()));
    }
}

struct SyncGuard<'a>(&'a Cell<bool>);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Map `value` out of `source_max` onto `target_max`, truncating.
#[allow(clippy::cast_possible_truncation)]
pub fn scaled_position(value: i32, source_max: i32, target_max: i32) -> i32 {
    if source_max == 0 {
        return 0;
    }
    let ratio = f64::from(value) / f64::from(source_max);
    (ratio * f64::from(target_max)) as i32
}
