//! Guard decision types and the navigation collaborator

use serde::{Deserialize, Serialize};

/// Where a redirect sends the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    /// Sign-in page; the original location is preserved
    Login,
    /// Generic missing-page response, also used for denied access
    NotFound,
}

/// What the pending state shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingIndicator {
    /// Nothing, inside the debounce window
    Hidden,
    /// A "verifying access" indicator
    Verifying,
}

/// Render decision for one guarded navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Show the protected content
    Render,

    /// Leave the route
    Redirect {
        target: RedirectTarget,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_to: Option<String>,
    },

    /// Auth or roles still loading
    Pending { indicator: PendingIndicator },
}

impl Decision {
    pub fn is_render(&self) -> bool {
        matches!(self, Decision::Render)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Decision::Pending { .. })
    }

    pub fn redirect_target(&self) -> Option<RedirectTarget> {
        match self {
            Decision::Redirect { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Forward a redirect to `navigator`
    ///
    /// Returns `true` if navigation happened.
    pub fn apply(&self, navigator: &dyn Navigator) -> bool {
        match self {
            Decision::Redirect {
                path, return_to, ..
            } => {
                navigator.navigate(path, return_to.as_deref());
                true
            }
            _ => false,
        }
    }
}

/// Performs the actual redirect in the rendering layer
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, return_to: Option<&str>);
}
