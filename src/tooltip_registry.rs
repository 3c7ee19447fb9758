/*
 * Fixed-capacity table of tooltips keyed by the control they describe.
 *
 * The table is an arena of `capacity` optional slots scanned linearly; a
 * freed slot is reused by the next registration. Each record owns the
 * NUL-terminated UTF-16 text its tooltip displays, so the text lives exactly
 * as long as the record. Native work (creating the tooltip window,
 * subclassing it, tearing it down) is delegated to a `TooltipBackend`, which
 * keeps the bookkeeping portable and testable without a window system.
 *
 * Invariants:
 * - at most one record per control; re-registering releases the old record
 *   first,
 * - a full table rejects the registration and leaves existing records as
 *   they were.
 */
use crate::config::MAX_TOOLTIPS;
use crate::error::{PlatformError, Result as PlatformResult};

use std::fmt::Debug;

pub trait TooltipBackend {
    type Control: Copy + Eq + Debug;
    type Tip: Debug;
    /// Identifies a tooltip window when the window itself asks for its text.
    type TipKey: Copy + Eq + Debug;

    fn is_valid_control(&self, control: Self::Control) -> bool;

    /// Creates a tooltip for `control`. `text` stays valid until `destroy`.
    fn create(
        &mut self,
        control: Self::Control,
        text: &[u16],
        duration_ms: i32,
    ) -> PlatformResult<Self::Tip>;

    fn destroy(&mut self, tip: Self::Tip);

    fn tip_key(tip: &Self::Tip) -> Self::TipKey;
}

#[derive(Debug)]
pub struct TooltipEntry<C, T> {
    pub control: C,
    pub tip: T,
    text: Vec<u16>,
}

impl<C, T> TooltipEntry<C, T> {
    /// Display text including its terminating NUL.
    pub fn text(&self) -> &[u16] {
        &self.text
    }
}

type Slot<B> =
    Option<TooltipEntry<<B as TooltipBackend>::Control, <B as TooltipBackend>::Tip>>;

pub struct TooltipRegistry<B: TooltipBackend> {
    backend: B,
    slots: Box<[Slot<B>]>,
}

pub(crate) fn to_wide_nul(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

impl<B: TooltipBackend> TooltipRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self::with_capacity(backend, MAX_TOOLTIPS)
    }

    pub fn with_capacity(backend: B, capacity: usize) -> Self {
        Self {
            backend,
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn slot_of_control(&self, control: B::Control) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|e| e.control == control))
    }

    pub fn contains(&self, control: B::Control) -> bool {
        self.slot_of_control(control).is_some()
    }

    pub fn entry(&self, control: B::Control) -> Option<&TooltipEntry<B::Control, B::Tip>> {
        self.slot_of_control(control)
            .and_then(|i| self.slots[i].as_ref())
    }

    /// Text of the tooltip whose window is identified by `key`.
    pub fn text_for_tip(&self, key: B::TipKey) -> Option<&[u16]> {
        self.slots
            .iter()
            .flatten()
            .find(|e| B::tip_key(&e.tip) == key)
            .map(|e| e.text())
    }

    /*
     * Registers a tooltip for `control`, replacing any existing one.
     * Returns false (and logs) when the control is invalid, when every slot
     * is taken, or when the backend fails to create the native tooltip.
     */
    pub fn attach(&mut self, control: B::Control, text: &str, duration_ms: i32) -> bool {
        self.try_attach(control, text, duration_ms).is_ok()
    }

    /// `attach` for callers that want the reason a registration failed.
    pub fn try_attach(
        &mut self,
        control: B::Control,
        text: &str,
        duration_ms: i32,
    ) -> PlatformResult<()> {
        if !self.backend.is_valid_control(control) {
            log::debug!("TooltipRegistry: Ignoring tooltip for invalid control {control:?}");
            return Err(PlatformError::InvalidHandle(format!("control {control:?}")));
        }

        self.detach(control);

        let Some(index) = self.slots.iter().position(|s| s.is_none()) else {
            log::warn!(
                "TooltipRegistry: Maximum number of tooltips reached ({})",
                self.capacity()
            );
            return Err(PlatformError::CapacityExceeded(format!(
                "{} tooltips",
                self.capacity()
            )));
        };

        let wide = to_wide_nul(text);
        match self.backend.create(control, &wide, duration_ms) {
            Ok(tip) => {
                log::debug!(
                    "TooltipRegistry: Attached tooltip {tip:?} to control {control:?} in slot {index}"
                );
                self.slots[index] = Some(TooltipEntry {
                    control,
                    tip,
                    text: wide,
                });
                Ok(())
            }
            Err(err) => {
                log::error!("TooltipRegistry: Could not create tooltip for {control:?}: {err}");
                Err(err)
            }
        }
    }

    /// Releases the tooltip attached to `control`. Returns whether one existed.
    pub fn detach(&mut self, control: B::Control) -> bool {
        let Some(index) = self.slot_of_control(control) else {
            return false;
        };
        if let Some(entry) = self.slots[index].take() {
            log::debug!("TooltipRegistry: Detaching tooltip from control {control:?}");
            self.backend.destroy(entry.tip);
        }
        true
    }

    /// Releases every tooltip. Returns how many were released.
    pub fn detach_all(&mut self) -> usize {
        let mut released = 0;
        for slot in self.slots.iter_mut() {
            if let Some(entry) = slot.take() {
                self.backend.destroy(entry.tip);
                released += 1;
            }
        }
        if released > 0 {
            log::debug!("TooltipRegistry: Released {released} tooltips");
        }
        released
    }
}

impl<B: TooltipBackend> Drop for TooltipRegistry<B> {
    fn drop(&mut self) {
        self.detach_all();
    }
}

/// Identifies one installation of a registry in a `RegistrySlot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryToken(u64);

/*
 * Holder of the registry a UI thread serves. Each installation gets a fresh
 * token and only that token removes it, so an owner that has been replaced
 * cannot tear down the tooltips of its successor.
 */
pub struct RegistrySlot<B: TooltipBackend> {
    next_token: u64,
    current: Option<(RegistryToken, TooltipRegistry<B>)>,
}

impl<B: TooltipBackend> Default for RegistrySlot<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: TooltipBackend> RegistrySlot<B> {
    pub const fn new() -> Self {
        Self {
            next_token: 0,
            current: None,
        }
    }

    /// Installs `registry`; returns its token and the registry it replaced.
    pub fn install(
        &mut self,
        registry: TooltipRegistry<B>,
    ) -> (RegistryToken, Option<TooltipRegistry<B>>) {
        self.next_token += 1;
        let token = RegistryToken(self.next_token);
        let previous = self.current.replace((token, registry)).map(|(_, old)| old);
        (token, previous)
    }

    /// Takes the registry out if `token` still owns it.
    pub fn remove(&mut self, token: RegistryToken) -> Option<TooltipRegistry<B>> {
        match &self.current {
            Some((owner, _)) if *owner == token => self.current.take().map(|(_, registry)| registry),
            _ => None,
        }
    }

    pub fn is_current(&self, token: RegistryToken) -> bool {
        matches!(&self.current, Some((owner, _)) if *owner == token)
    }

    pub fn registry(&self) -> Option<&TooltipRegistry<B>> {
        self.current.as_ref().map(|(_, registry)| registry)
    }

    pub fn registry_mut(&mut self) -> Option<&mut TooltipRegistry<B>> {
        self.current.as_mut().map(|(_, registry)| registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Journal {
        created: Vec<(u32, u32)>,
        destroyed: Vec<u32>,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct FakeTip(u32);

    struct FakeBackend {
        next_tip: u32,
        fail_create: bool,
        journal: Rc<RefCell<Journal>>,
    }

    impl FakeBackend {
        fn new() -> (Self, Rc<RefCell<Journal>>) {
            let journal = Rc::new(RefCell::new(Journal::default()));
            (
                Self {
                    next_tip: 100,
                    fail_create: false,
                    journal: journal.clone(),
                },
                journal,
            )
        }
    }

    impl TooltipBackend for FakeBackend {
        type Control = u32;
        type Tip = FakeTip;
        type TipKey = u32;

        fn is_valid_control(&self, control: u32) -> bool {
            control != 0
        }

        fn create(&mut self, control: u32, text: &[u16], _duration_ms: i32) -> PlatformResult<FakeTip> {
            assert_eq!(text.last(), Some(&0), "text must be NUL-terminated");
            if self.fail_create {
                return Err(PlatformError::OperationFailed("CreateWindowExW".into()));
            }
            self.next_tip += 1;
            self.journal
                .borrow_mut()
                .created
                .push((control, self.next_tip));
            Ok(FakeTip(self.next_tip))
        }

        fn destroy(&mut self, tip: FakeTip) {
            self.journal.borrow_mut().destroyed.push(tip.0);
        }

        fn tip_key(tip: &FakeTip) -> u32 {
            tip.0
        }
    }

    fn wide(s: &str) -> Vec<u16> {
        to_wide_nul(s)
    }

    #[test]
    fn replaced_owner_cannot_remove_its_successor() {
        let (first_backend, first_journal) = FakeBackend::new();
        let (second_backend, second_journal) = FakeBackend::new();
        let mut slot = RegistrySlot::new();

        let (first, previous) = slot.install(TooltipRegistry::new(first_backend));
        assert!(previous.is_none());
        assert!(slot.registry_mut().is_some_and(|r| r.attach(1, "first", -1)));

        let (second, previous) = slot.install(TooltipRegistry::new(second_backend));
        assert_ne!(first, second);
        drop(previous);
        assert_eq!(first_journal.borrow().destroyed.len(), 1);
        assert!(slot.registry_mut().is_some_and(|r| r.attach(2, "second", -1)));

        assert!(slot.remove(first).is_none());
        assert!(slot.is_current(second));
        assert_eq!(slot.registry_mut().map(|r| r.len()), Some(1));
        assert!(second_journal.borrow().destroyed.is_empty());

        drop(slot.remove(second));
        assert!(slot.registry_mut().is_none());
        assert_eq!(second_journal.borrow().destroyed.len(), 1);
    }

    #[test]
    fn attach_stores_text_retrievable_by_tip() {
        let (backend, journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::new(backend);

        assert!(registry.attach(7, "Quick format", -1));
        let tip = journal.borrow().created[0].1;
        assert_eq!(registry.text_for_tip(tip), Some(wide("Quick format").as_slice()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reattach_replaces_existing_tooltip_for_same_control() {
        let (backend, journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::new(backend);

        assert!(registry.attach(7, "first", -1));
        assert!(registry.attach(7, "second", 5000));

        assert_eq!(registry.len(), 1);
        let journal = journal.borrow();
        assert_eq!(journal.created.len(), 2);
        assert_eq!(journal.destroyed, vec![journal.created[0].1]);
        let entry = registry.entry(7).expect("entry for control 7");
        assert_eq!(entry.text(), wide("second").as_slice());
        assert_eq!(registry.text_for_tip(journal.created[0].1), None);
    }

    #[test]
    fn detach_all_then_detach_is_a_noop() {
        let (backend, journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::new(backend);
        registry.attach(1, "a", -1);
        registry.attach(2, "b", -1);

        assert_eq!(registry.detach_all(), 2);
        assert!(!registry.detach(1));
        assert!(!registry.detach(42));
        assert_eq!(registry.detach_all(), 0);
        assert!(registry.is_empty());
        assert_eq!(journal.borrow().destroyed.len(), 2);
    }

    #[test]
    fn attach_beyond_capacity_fails_and_keeps_existing_entries() {
        let (backend, journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::new(backend);
        assert_eq!(registry.capacity(), 32);

        for control in 1..=32 {
            assert!(registry.attach(control, &format!("tip {control}"), -1));
        }
        assert!(!registry.attach(33, "one too many", -1));

        assert_eq!(registry.len(), 32);
        assert!(!registry.contains(33));
        assert!(journal.borrow().destroyed.is_empty());
        for control in 1..=32 {
            let entry = registry.entry(control).expect("existing entry");
            assert_eq!(entry.text(), wide(&format!("tip {control}")).as_slice());
        }
    }

    #[test]
    fn try_attach_names_the_reason_for_a_refusal() {
        let (backend, _journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::with_capacity(backend, 1);
        assert_eq!(registry.try_attach(1, "a", -1), Ok(()));

        assert!(matches!(
            registry.try_attach(2, "b", -1),
            Err(PlatformError::CapacityExceeded(_))
        ));
        assert!(matches!(
            registry.try_attach(0, "c", -1),
            Err(PlatformError::InvalidHandle(_))
        ));
        assert!(registry.contains(1));
        assert!(!registry.contains(2));
    }

    #[test]
    fn reattach_on_full_table_still_succeeds() {
        let (backend, _journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::with_capacity(backend, 2);
        assert!(registry.attach(1, "a", -1));
        assert!(registry.attach(2, "b", -1));

        assert!(registry.attach(2, "b2", -1));
        assert_eq!(registry.entry(2).map(|e| e.text().to_vec()), Some(wide("b2")));
    }

    #[test]
    fn freed_slot_is_reused() {
        let (backend, _journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::with_capacity(backend, 2);
        registry.attach(1, "a", -1);
        registry.attach(2, "b", -1);
        assert!(!registry.attach(3, "c", -1));

        registry.detach(1);
        assert!(registry.attach(3, "c", -1));
        assert!(registry.contains(2));
        assert!(registry.contains(3));
    }

    #[test]
    fn invalid_control_is_rejected_without_backend_call() {
        let (backend, journal) = FakeBackend::new();
        let mut registry = TooltipRegistry::new(backend);
        assert!(!registry.attach(0, "nothing", -1));
        assert!(journal.borrow().created.is_empty());
    }

    #[test]
    fn backend_failure_leaves_slot_free() {
        let (mut backend, _journal) = FakeBackend::new();
        backend.fail_create = true;
        let mut registry = TooltipRegistry::new(backend);

        assert!(!registry.attach(5, "x", -1));
        assert!(registry.is_empty());

        registry.backend_mut().fail_create = false;
        assert!(registry.attach(5, "x", -1));
    }

    #[test]
    fn drop_releases_remaining_tooltips() {
        let (backend, journal) = FakeBackend::new();
        {
            let mut registry = TooltipRegistry::new(backend);
            registry.attach(1, "a", -1);
            registry.attach(2, "b", -1);
        }
        assert_eq!(journal.borrow().destroyed.len(), 2);
    }
}
