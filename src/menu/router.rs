use anyhow::Result;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

pub struct EventRoute {
    /// Menu item id this route answers to.
    pub id: String,
    pub handler: EventHandler,
}

pub enum EventHandler {
    /// Forwards the click to a dispatch loop.
    Click(mpsc::UnboundedSender<()>),
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Continue,
    Quit,
}

/// Routes tray menu event ids. Routes are added and dropped while the tray runs.
pub struct EventRouter {
    routes: Mutex<Vec<EventRoute>>,
}

impl EventRouter {
    pub fn new(routes: Vec<EventRoute>) -> Self {
        Self { routes: Mutex::new(routes) }
    }

    pub fn register(&self, route: EventRoute) {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).push(route);
    }

    /// Drops every route registered for `event_id`; returns how many were removed.
    pub fn unregister(&self, event_id: &str) -> usize {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let before = routes.len();
        routes.retain(|route| route.id != event_id);
        before - routes.len()
    }

    pub fn len(&self) -> usize {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn route(&self, event_id: &str) -> Result<HandlerResult> {
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        for route in routes.iter() {
            if route.id == event_id {
                return match &route.handler {
                    EventHandler::Click(tx) => {
                        if tx.send(()).is_err() {
                            anyhow::bail!("Listener for {} has stopped", event_id);
                        }
                        Ok(HandlerResult::Continue)
                    }
                    EventHandler::Quit => Ok(HandlerResult::Quit),
                };
            }
        }

        log::warn!("No route found for event: {}", event_id);
        Ok(HandlerResult::Continue)
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
