//! In-process application events.
//!
//! Delivery is synchronous and follows registration order. Listeners are
//! snapshotted before dispatch, so a listener may emit or subscribe while an
//! event is being delivered; new subscriptions only see later events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::view::ViewId;

/// Listener count past which a leak warning is logged.
pub const MAX_LISTENERS: usize = 128;

/// Identity of a newly installed chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub session: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Ready,
    NewClient(ClientInfo),
    SwitchView(ViewId),
    LoginRequested(String),
    LoginFinished { account_id: String, success: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    NewClient,
    SwitchView,
    LoginRequested,
    LoginFinished,
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready => EventKind::Ready,
            Self::NewClient(_) => EventKind::NewClient,
            Self::SwitchView(_) => EventKind::SwitchView,
            Self::LoginRequested(_) => EventKind::LoginRequested,
            Self::LoginFinished { .. } => EventKind::LoginFinished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&AppEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
    leak_warned: Cell<bool>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut subscriptions = self.subscriptions.borrow_mut();
        subscriptions.push(Subscription {
            id,
            kind,
            listener: Rc::new(listener),
        });
        if subscriptions.len() > MAX_LISTENERS && !self.leak_warned.replace(true) {
            tracing::warn!(
                listeners = subscriptions.len(),
                max = MAX_LISTENERS,
                "possible event listener leak"
            );
        }
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        subscriptions.len() != before
    }

    pub fn on_ready<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn() + 'static,
    {
        self.subscribe(EventKind::Ready, move |_| listener())
    }

    pub fn on_new_client<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ClientInfo) + 'static,
    {
        self.subscribe(EventKind::NewClient, move |event| {
            if let AppEvent::NewClient(info) = event {
                listener(info);
            }
        })
    }

    pub fn on_switch_view<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(ViewId) + 'static,
    {
        self.subscribe(EventKind::SwitchView, move |event| {
            if let AppEvent::SwitchView(view) = event {
                listener(*view);
            }
        })
    }

    pub fn on_login_requested<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + 'static,
    {
        self.subscribe(EventKind::LoginRequested, move |event| {
            if let AppEvent::LoginRequested(account_id) = event {
                listener(account_id);
            }
        })
    }

    pub fn on_login_finished<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&str, bool) + 'static,
    {
        self.subscribe(EventKind::LoginFinished, move |event| {
            if let AppEvent::LoginFinished {
                account_id,
                success,
            } = event
            {
                listener(account_id, *success);
            }
        })
    }

    pub fn emit(&self, event: AppEvent) {
        let kind = event.kind();
        let listeners: Vec<Listener> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|subscription| subscription.kind == kind)
            .map(|subscription| subscription.listener.clone())
            .collect();

        tracing::trace!(?kind, listeners = listeners.len(), "dispatching app event");
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|subscription| subscription.kind == kind)
            .count()
    }
}
