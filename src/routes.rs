use crate::identity::PendingIdentity;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, info};

/// Application routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Landing,
    Auth,
    CameraCapture,
    Home,
    Friends,
    OffersRewards,
    Services,
    BankTransfer,
    BankTransferAmount,
    BankTransferConfirm,
    Settings,
    Notifications,
    TransactionsHistory,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 13] = [
        Route::Landing,
        Route::Auth,
        Route::CameraCapture,
        Route::Home,
        Route::Friends,
        Route::OffersRewards,
        Route::Services,
        Route::BankTransfer,
        Route::BankTransferAmount,
        Route::BankTransferConfirm,
        Route::Settings,
        Route::Notifications,
        Route::TransactionsHistory,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Auth => "/auth",
            Route::CameraCapture => "/camera-capture",
            Route::Home => "/home",
            Route::Friends => "/friends",
            Route::OffersRewards => "/offers-rewards",
            Route::Services => "/services",
            Route::BankTransfer => "/services/bank-transfer",
            Route::BankTransferAmount => "/services/bank-transfer/amount",
            Route::BankTransferConfirm => "/services/bank-transfer/confirm",
            Route::Settings => "/settings",
            Route::Notifications => "/notifications",
            Route::TransactionsHistory => "/transactions-history",
            Route::NotFound => "*",
        }
    }

    /// Resolve a path; a single trailing slash is ignored
    pub fn from_path(path: &str) -> Route {
        let normalized = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        Route::ALL
            .iter()
            .copied()
            .find(|route| route.path() == normalized)
            .unwrap_or(Route::NotFound)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Context handed to the home page after a successful verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeContext {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Ephemeral payload attached to a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationState {
    /// Form data travelling to the capture page
    Capture(PendingIdentity),
    /// Form data handed back to the auth page on cancel
    Returned(PendingIdentity),
    /// Verification result for the home page
    Home(HomeContext),
}

/// In-process router: current route is observable, transfer state is read once.
pub struct Navigator {
    route: watch::Sender<Route>,
    state: Mutex<Option<NavigationState>>,
    history: Mutex<Vec<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        Self {
            route,
            state: Mutex::new(None),
            history: Mutex::new(vec![initial]),
        }
    }

    /// Navigate to `route`, replacing any unread transfer state
    pub fn navigate(&self, route: Route, state: Option<NavigationState>) {
        info!("Navigating to {}", route);
        *self.state.lock() = state;
        self.history.lock().push(route);
        self.route.send_replace(route);
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    /// Receiver that observes every subsequent navigation
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }

    /// Consume the transfer state; later reads see nothing
    pub fn take_state(&self) -> Option<NavigationState> {
        let state = self.state.lock().take();
        if state.is_some() {
            debug!("Navigation state consumed on {}", self.current());
        }
        state
    }

    pub fn peek_state(&self) -> Option<NavigationState> {
        self.state.lock().clone()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}
