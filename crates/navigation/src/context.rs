//! The single source of truth for navigation state.
//!
//! Explicitly owned and passed to its consumers rather than hidden in a
//! global; change notification is synchronous so every listener observes
//! the mutation that triggered it before any further input is handled.

use std::fmt;

use geodata::adcode::CHINA_ADCODE;
use geodata::feature::FeatureCollection;

use crate::level::NavigationLevel;

/// Handle returned by [`NavigationContext::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What changed, carried to every listener.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextEvent {
    /// Level, adcode and country changed together in one transition.
    /// All three fields are already updated when this fires.
    Navigated {
        level: NavigationLevel,
        adcode: String,
        country: String,
    },
    /// Level changed alone (no adcode/country movement).
    LevelChanged(NavigationLevel),
    /// A new geography was installed (previous one replaced wholesale).
    GeographyInstalled,
    /// State returned to defaults.
    Reset,
}

type Listener = Box<dyn FnMut(&ContextEvent)>;

/// Current drill level, active country/adcode, and loaded geography.
///
/// The geography is owned exclusively here: it is replaced wholesale on
/// each transition and never mutated in place.
pub struct NavigationContext {
    level: NavigationLevel,
    country: String,
    adcode: String,
    geography: Option<FeatureCollection>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationContext {
    pub fn new() -> Self {
        Self {
            level: NavigationLevel::World,
            country: CHINA_ADCODE.to_string(),
            adcode: CHINA_ADCODE.to_string(),
            geography: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn level(&self) -> NavigationLevel {
        self.level
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn adcode(&self) -> &str {
        &self.adcode
    }

    pub fn geography(&self) -> Option<&FeatureCollection> {
        self.geography.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ContextEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Moves to a new (level, adcode, country) tuple atomically: all
    /// three fields update before the single `Navigated` notification
    /// fires. The previous geography stays installed until new data
    /// arrives, so callers must tolerate level/adcode running ahead of
    /// the rendered shapes.
    pub fn apply_transition(
        &mut self,
        level: NavigationLevel,
        adcode: impl Into<String>,
        country: impl Into<String>,
    ) {
        self.level = level;
        self.adcode = adcode.into();
        self.country = country.into();
        self.notify(&ContextEvent::Navigated {
            level: self.level,
            adcode: self.adcode.clone(),
            country: self.country.clone(),
        });
    }

    pub fn set_level(&mut self, level: NavigationLevel) {
        self.level = level;
        self.notify(&ContextEvent::LevelChanged(level));
    }

    /// Replaces the loaded geography wholesale.
    pub fn install_geography(&mut self, geography: FeatureCollection) {
        self.geography = Some(geography);
        self.notify(&ContextEvent::GeographyInstalled);
    }

    /// Restores default World/China state, keeping subscriptions.
    pub fn reset(&mut self) {
        self.level = NavigationLevel::World;
        self.country = CHINA_ADCODE.to_string();
        self.adcode = CHINA_ADCODE.to_string();
        self.geography = None;
        self.notify(&ContextEvent::Reset);
    }

    /// Resets and drops every subscription.
    pub fn teardown(&mut self) {
        self.reset();
        self.listeners.clear();
    }

    fn notify(&mut self, event: &ContextEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("level", &self.level)
            .field("country", &self.country)
            .field("adcode", &self.adcode)
            .field("geography", &self.geography.as_ref().map(|g| g.features.len()))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use geodata::feature::FeatureCollection;

    use super::{ContextEvent, NavigationContext};
    use crate::level::NavigationLevel;

    fn recorded(ctx: &mut NavigationContext) -> Rc<RefCell<Vec<ContextEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ctx.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn starts_at_world_china() {
        let ctx = NavigationContext::new();
        assert_eq!(ctx.level(), NavigationLevel::World);
        assert_eq!(ctx.country(), "100000");
        assert_eq!(ctx.adcode(), "100000");
        assert!(ctx.geography().is_none());
    }

    #[test]
    fn transition_notifies_once_with_all_fields_updated() {
        let mut ctx = NavigationContext::new();
        let seen = recorded(&mut ctx);
        ctx.apply_transition(NavigationLevel::Country, "100000", "100000");
        let events = seen.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            ContextEvent::Navigated {
                level: NavigationLevel::Country,
                adcode: "100000".to_string(),
                country: "100000".to_string(),
            }
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut ctx = NavigationContext::new();
        let seen = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&seen);
        let id = ctx.subscribe(move |_| *sink.borrow_mut() += 1);
        ctx.set_level(NavigationLevel::Country);
        assert!(ctx.unsubscribe(id));
        assert!(!ctx.unsubscribe(id));
        ctx.set_level(NavigationLevel::World);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn geography_is_replaced_wholesale() {
        let mut ctx = NavigationContext::new();
        let seen = recorded(&mut ctx);
        ctx.install_geography(FeatureCollection::empty());
        assert!(ctx.geography().is_some());
        assert_eq!(seen.borrow().last(), Some(&ContextEvent::GeographyInstalled));
    }

    #[test]
    fn teardown_restores_defaults_and_clears_listeners() {
        let mut ctx = NavigationContext::new();
        let _ = recorded(&mut ctx);
        ctx.apply_transition(NavigationLevel::Province, "440000", "100000");
        ctx.install_geography(FeatureCollection::empty());
        ctx.teardown();
        assert_eq!(ctx.level(), NavigationLevel::World);
        assert_eq!(ctx.adcode(), "100000");
        assert!(ctx.geography().is_none());
        assert_eq!(ctx.listener_count(), 0);
    }
}
