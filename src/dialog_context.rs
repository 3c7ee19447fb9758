/*
 * Window-free logic behind the modal message dialogs: the per-kind modal
 * slots that reject re-entrant invocations, clamping of choice lists to the
 * controls a template provides, the checked-mask conversions, username
 * sanitizing and the layout deltas applied when text does not fit the
 * authored control sizes.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::DialogKind;

use std::sync::atomic::{AtomicBool, Ordering};

/// Longest username accepted from the selection dialog.
pub const MAX_USERNAME_LENGTH: usize = 128;
const USERNAME_INVALID_CHARS: &str = "/\\[]:;|=,+*?<>\"";

// Non-client hit-test codes that start a border resize.
const HTSIZE: isize = 4;
const HTLEFT: isize = 10;
const HTBOTTOMRIGHT: isize = 17;

/// One busy flag per dialog kind.
#[derive(Debug, Default)]
pub struct ModalSlots {
    busy: [AtomicBool; DialogKind::ALL.len()],
}

/// Marks a dialog kind as showing until dropped.
#[derive(Debug)]
pub struct ModalGuard<'a> {
    slots: &'a ModalSlots,
    kind: DialogKind,
}

impl ModalSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, kind: DialogKind) -> bool {
        self.busy[kind.index()].load(Ordering::Acquire)
    }

    pub fn acquire(&self, kind: DialogKind) -> PlatformResult<ModalGuard<'_>> {
        if self.busy[kind.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("ModalSlots: Rejecting second {kind:?} dialog while one is showing");
            return Err(PlatformError::DialogBusy(format!(
                "a {kind:?} dialog is already showing"
            )));
        }
        Ok(ModalGuard { slots: self, kind })
    }
}

impl Drop for ModalGuard<'_> {
    fn drop(&mut self) {
        self.slots.busy[self.kind.index()].store(false, Ordering::Release);
    }
}

/// Truncates `items` to the number of controls available, with a warning.
pub fn clamp_items<'a, T>(items: &'a [T], max: usize, what: &str) -> &'a [T] {
    if items.len() > max {
        log::warn!(
            "DialogContext: Too many {what} requested ({} vs {max}), truncating",
            items.len()
        );
        &items[..max]
    } else {
        items
    }
}

/// Check state of each of `count` choices for an initial mask.
pub fn initial_check_states(mask: u32, count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| i < 32 && mask & (1 << i) != 0)
        .collect()
}

/// Bit `i` of the result is set iff the `i`-th state is checked.
pub fn selection_mask_from_states<I>(states: I) -> u32
where
    I: IntoIterator<Item = bool>,
{
    states
        .into_iter()
        .take(32)
        .enumerate()
        .filter(|(_, checked)| *checked)
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

pub fn sanitize_username(raw: &str) -> String {
    raw.chars()
        .take(MAX_USERNAME_LENGTH)
        .map(|c| {
            if USERNAME_INVALID_CHARS.contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

pub fn is_sizing_hit_test(code: isize) -> bool {
    code == HTSIZE || (HTLEFT..=HTBOTTOMRIGHT).contains(&code)
}

/// Extra width needed for the widest line; zero when the default fits.
pub fn width_growth(widest: i32, default_width: i32) -> i32 {
    if widest <= default_width {
        0
    } else {
        widest - default_width
    }
}

/*
 * Buttons shorter than the host's button height are raised by half the
 * difference and stretched to it, so they stay centred on their row. Returns
 * (upward shift, new height), or `None` when the button is left alone.
 */
pub fn button_height_adjustment(current: i32, target: i32) -> Option<(i32, i32)> {
    if target <= 0 {
        return None;
    }
    let shift = if current < target { (target - current) / 2 } else { 0 };
    Some((shift, target))
}

/// Snaps a requested icon size to the sizes icon resources are authored in.
pub fn icon_resource_size(requested: i32) -> i32 {
    match requested {
        54.. => 64,
        40..=53 => 48,
        28..=39 => 32,
        20..=27 => 24,
        _ => requested,
    }
}

/// Control deltas for a notification whose text needs `text_grow` more
/// pixels and whose "don't display again" checkbox (of height
/// `hidden_checkbox_height`, zero when shown) is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationLayout {
    pub text_grow: i32,
    pub dialog_grow: i32,
    pub background_grow: i32,
    pub line_shift: i32,
    pub checkbox_shift: i32,
    pub button_shift: i32,
}

impl NotificationLayout {
    pub fn compute(measured: i32, current: i32, padding: i32, hidden_checkbox_height: i32) -> Self {
        let dh = (measured - current + padding).max(0);
        Self {
            text_grow: dh,
            dialog_grow: dh - hidden_checkbox_height,
            background_grow: dh,
            line_shift: dh,
            checkbox_shift: dh,
            button_shift: dh - hidden_checkbox_height,
        }
    }
}

/// Control deltas for the selection and list dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsLayout {
    /// Width added to the text, the items and the dialog contents.
    pub width_grow: i32,
    /// Height added to the text control; items move down by this much.
    pub text_grow: i32,
    /// Height added to the dialog and its background.
    pub dialog_grow_h: i32,
    /// Width added to the dialog frame.
    pub dialog_grow_w: i32,
}

impl ItemsLayout {
    /*
     * `rows_extent` is the distance between the first row the template
     * already accounts for and the last row in use; `margin` is added to a
     * non-zero width growth for the frame.
     */
    pub fn compute(width_grow: i32, measured: i32, current: i32, rows_extent: i32, margin: i32) -> Self {
        let text_grow = measured - current;
        Self {
            width_grow,
            text_grow,
            dialog_grow_h: text_grow + rows_extent.max(0),
            dialog_grow_w: if width_grow != 0 {
                width_grow + margin
            } else {
                0
            },
        }
    }
}
