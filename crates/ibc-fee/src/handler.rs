use core::marker::PhantomData;

use crate::events::ModuleEvent;
use crate::prelude::*;

pub type HandlerResult<T, E> = Result<HandlerOutput<T>, E>;

#[derive(Clone, Debug)]
pub struct HandlerOutput<T, Event = ModuleEvent> {
    pub result: T,
    pub log: Vec<String>,
    pub events: Vec<Event>,
}

/// Accumulates the logs and events produced while handling a message or a
/// module callback.
#[derive(Clone, Debug)]
pub struct HandlerOutputBuilder<T, E = ModuleEvent> {
    log: Vec<String>,
    events: Vec<E>,
    marker: PhantomData<T>,
}

/// The output builder handed to module callbacks.
pub type ModuleOutputBuilder = HandlerOutputBuilder<(), ModuleEvent>;

impl<T, E> Default for HandlerOutputBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> HandlerOutputBuilder<T, E> {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            events: Vec::new(),
            marker: PhantomData,
        }
    }

    pub fn log(&mut self, log: impl Into<String>) {
        self.log.push(log.into());
    }

    pub fn emit(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn logs(&self) -> &[String] {
        &self.log
    }

    pub fn with_result(self, result: T) -> HandlerOutput<T, E> {
        HandlerOutput {
            result,
            log: self.log,
            events: self.events,
        }
    }
}
