#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use std::time::Duration;

use header_offset::{Callback, DomError, ElementSource, Px, ReadyState, Scheduler, Task};

pub const HEADER: &str = "header";
pub const BANNER: &str = ".login-banner-wrapper";
pub const PROPERTY: &str = "--header-height";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

pub const ROOT: ElementId = ElementId(0);

type SharedCallback = Rc<RefCell<Callback>>;

#[derive(Default)]
struct World {
    now_ms: u64,
    ready: Option<ReadyState>,
    next_id: u64,

    selectors: HashMap<String, ElementId>,
    heights: HashMap<ElementId, u32>,
    styles: HashMap<(ElementId, String), String>,

    fail_measure: bool,
    no_mutation_observer: bool,

    queries: HashMap<String, usize>,
    writes: HashMap<(ElementId, String), usize>,

    timers: BTreeMap<u64, (u64, Task)>,
    resize: HashMap<u64, SharedCallback>,
    observers: HashMap<u64, (ElementId, SharedCallback)>,
    ready_tasks: HashMap<u64, Task>,
}

impl World {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory document and event loop with a virtual clock.
#[derive(Clone)]
pub struct FakeHost {
    world: Rc<RefCell<World>>,
}

pub struct FakeTimer(u64);

/// Unregisters its listener on drop.
pub struct FakeSubscription {
    world: Weak<RefCell<World>>,
    id: u64,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        if let Some(world) = self.world.upgrade() {
            let mut world = world.borrow_mut();
            world.resize.remove(&self.id);
            world.observers.remove(&self.id);
            world.ready_tasks.remove(&self.id);
        }
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    pub fn new() -> Self {
        let world = World {
            ready: Some(ReadyState::Complete),
            ..World::default()
        };
        Self {
            world: Rc::new(RefCell::new(world)),
        }
    }

    pub fn loading() -> Self {
        let host = Self::new();
        host.world.borrow_mut().ready = Some(ReadyState::Loading);
        host
    }

    pub fn with_header(height: u32) -> Self {
        let host = Self::new();
        host.add(HEADER, height);
        host
    }

    pub fn with_header_and_banner(header: u32, banner: u32) -> Self {
        let host = Self::with_header(header);
        host.add(BANNER, banner);
        host
    }

    pub fn add(&self, selector: &str, height: u32) -> ElementId {
        let mut world = self.world.borrow_mut();
        let id = ElementId(world.next_id());
        world.selectors.insert(selector.to_string(), id);
        world.heights.insert(id, height);
        id
    }

    pub fn remove(&self, selector: &str) {
        self.world.borrow_mut().selectors.remove(selector);
    }

    pub fn element(&self, selector: &str) -> Option<ElementId> {
        self.world.borrow().selectors.get(selector).copied()
    }

    pub fn set_height(&self, selector: &str, height: u32) {
        let mut world = self.world.borrow_mut();
        if let Some(id) = world.selectors.get(selector).copied() {
            world.heights.insert(id, height);
        }
    }

    pub fn fail_measure(&self, fail: bool) {
        self.world.borrow_mut().fail_measure = fail;
    }

    pub fn disable_mutation_observer(&self) {
        self.world.borrow_mut().no_mutation_observer = true;
    }

    pub fn style(&self, element: ElementId, name: &str) -> Option<String> {
        self.world
            .borrow()
            .styles
            .get(&(element, name.to_string()))
            .cloned()
    }

    pub fn root_style(&self, name: &str) -> Option<String> {
        self.style(ROOT, name)
    }

    pub fn set_root_style(&self, name: &str, value: &str) {
        self.world
            .borrow_mut()
            .styles
            .insert((ROOT, name.to_string()), value.to_string());
    }

    pub fn writes(&self, element: ElementId, name: &str) -> usize {
        self.world
            .borrow()
            .writes
            .get(&(element, name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn queries(&self, selector: &str) -> usize {
        self.world
            .borrow()
            .queries
            .get(selector)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.world.borrow().queries.values().sum()
    }

    pub fn now_ms(&self) -> u64 {
        self.world.borrow().now_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.world.borrow().timers.len()
    }

    pub fn resize_listeners(&self) -> usize {
        self.world.borrow().resize.len()
    }

    pub fn observers(&self) -> usize {
        self.world.borrow().observers.len()
    }

    pub fn ready_listeners(&self) -> usize {
        self.world.borrow().ready_tasks.len()
    }

    /// Dispatches a viewport resize to every listener.
    pub fn resize(&self) {
        let callbacks: Vec<SharedCallback> = self.world.borrow().resize.values().cloned().collect();
        for callback in callbacks {
            let mut callback = callback.borrow_mut();
            (*callback)();
        }
    }

    /// Notifies observers of `selector`'s element.
    pub fn mutate(&self, selector: &str) {
        let callbacks: Vec<SharedCallback> = {
            let world = self.world.borrow();
            let Some(id) = world.selectors.get(selector).copied() else {
                return;
            };
            world
                .observers
                .values()
                .filter(|(target, _)| *target == id)
                .map(|(_, callback)| Rc::clone(callback))
                .collect()
        };
        for callback in callbacks {
            let mut callback = callback.borrow_mut();
            (*callback)();
        }
    }

    /// Flips the document to interactive and fires the ready listeners.
    pub fn fire_ready(&self) {
        let tasks: Vec<Task> = {
            let mut world = self.world.borrow_mut();
            world.ready = Some(ReadyState::Interactive);
            world.ready_tasks.drain().map(|(_, task)| task).collect()
        };
        for task in tasks {
            task();
        }
    }

    /// Moves the clock forward, firing due timers in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms() + ms;
        loop {
            let due = {
                let mut world = self.world.borrow_mut();
                let next = world
                    .timers
                    .iter()
                    .filter(|(_, (at, _))| *at <= target)
                    .min_by_key(|(id, (at, _))| (*at, **id))
                    .map(|(id, (at, _))| (*id, *at));
                match next {
                    Some((id, at)) => {
                        world.now_ms = at;
                        world.timers.remove(&id).map(|(_, task)| task)
                    }
                    None => None,
                }
            };
            match due {
                Some(task) => task(),
                None => break,
            }
        }
        self.world.borrow_mut().now_ms = target;
    }

    fn subscription(&self, id: u64) -> FakeSubscription {
        FakeSubscription {
            world: Rc::downgrade(&self.world),
            id,
        }
    }
}

impl ElementSource for FakeHost {
    type Element = ElementId;

    fn ready_state(&self) -> ReadyState {
        self.world.borrow().ready.unwrap_or(ReadyState::Complete)
    }

    fn find(&self, selector: &str) -> Result<Option<ElementId>, DomError> {
        let mut world = self.world.borrow_mut();
        *world.queries.entry(selector.to_string()).or_default() += 1;
        Ok(world.selectors.get(selector).copied())
    }

    fn root(&self) -> Result<ElementId, DomError> {
        Ok(ROOT)
    }

    fn outer_height(&self, element: &ElementId) -> Result<Px, DomError> {
        let world = self.world.borrow();
        if world.fail_measure {
            return Err(DomError::Measure {
                reason: "layout unavailable".to_string(),
            });
        }
        Ok(Px(world.heights.get(element).copied().unwrap_or(0)))
    }

    fn style_property(&self, element: &ElementId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.style(*element, name))
    }

    fn set_style_property(
        &self,
        element: &ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let mut world = self.world.borrow_mut();
        let key = (*element, name.to_string());
        *world.writes.entry(key.clone()).or_default() += 1;
        world.styles.insert(key, value.to_string());
        Ok(())
    }
}

impl Scheduler for FakeHost {
    type Target = ElementId;
    type Timer = FakeTimer;
    type Subscription = FakeSubscription;

    fn schedule_after(&self, delay: Duration, task: Task) -> Result<FakeTimer, DomError> {
        let mut world = self.world.borrow_mut();
        let id = world.next_id();
        let at = world.now_ms + u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        world.timers.insert(id, (at, task));
        Ok(FakeTimer(id))
    }

    fn cancel(&self, timer: FakeTimer) {
        self.world.borrow_mut().timers.remove(&timer.0);
    }

    fn on_resize(&self, callback: Callback) -> Result<FakeSubscription, DomError> {
        let id = {
            let mut world = self.world.borrow_mut();
            let id = world.next_id();
            world.resize.insert(id, Rc::new(RefCell::new(callback)));
            id
        };
        Ok(self.subscription(id))
    }

    fn on_change(
        &self,
        target: &ElementId,
        callback: Callback,
    ) -> Result<Option<FakeSubscription>, DomError> {
        let id = {
            let mut world = self.world.borrow_mut();
            if world.no_mutation_observer {
                return Ok(None);
            }
            let id = world.next_id();
            world
                .observers
                .insert(id, (*target, Rc::new(RefCell::new(callback))));
            id
        };
        Ok(Some(self.subscription(id)))
    }

    fn on_ready(&self, task: Task) -> Result<FakeSubscription, DomError> {
        let id = {
            let mut world = self.world.borrow_mut();
            let id = world.next_id();
            world.ready_tasks.insert(id, task);
            id
        };
        Ok(self.subscription(id))
    }
}
