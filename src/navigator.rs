// ABOUTME: Navigator tracking the current location and the sign-in return path
// ABOUTME: Redirects to sign-in preserve the requested path so sign-in can return there
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use tokio::sync::watch;
use tracing::debug;

use crate::constants::routes;
use crate::gate::{normalize_path, Redirect};

/// Current location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path including any query string
    pub path: String,
    /// Where to go after sign-in, when on the sign-in view
    pub return_to: Option<String>,
}

impl Location {
    /// Parse a location, picking up `?from=` on the sign-in view
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = if raw.is_empty() { routes::HOME } else { raw };
        let return_to = (normalize_path(raw) == routes::SIGN_IN)
            .then(|| return_param(raw))
            .flatten();
        Self {
            path: raw.to_owned(),
            return_to,
        }
    }

    /// Whether this is the sign-in view
    #[must_use]
    pub fn is_sign_in(&self) -> bool {
        normalize_path(&self.path) == routes::SIGN_IN
    }
}

fn return_param(raw: &str) -> Option<String> {
    let (_, query) = raw.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == routes::RETURN_PARAM)
            .then(|| urlencoding::decode(value).ok().map(|decoded| decoded.into_owned()))
            .flatten()
            .filter(|path| path.starts_with('/'))
    })
}

/// Single writer of the current location
#[derive(Debug)]
pub struct Navigator {
    location: watch::Sender<Location>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(routes::HOME)
    }
}

impl Navigator {
    /// Navigator starting at `path`
    #[must_use]
    pub fn new(path: &str) -> Self {
        let (location, _) = watch::channel(Location::parse(path));
        Self { location }
    }

    /// Current location
    #[must_use]
    pub fn current(&self) -> Location {
        self.location.borrow().clone()
    }

    /// Current path
    #[must_use]
    pub fn current_path(&self) -> String {
        self.location.borrow().path.clone()
    }

    /// Receiver notified on every navigation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }

    /// Go to `path`
    pub fn navigate(&self, path: &str) {
        let next = Location::parse(path);
        debug!(path = %next.path, "Navigating");
        self.location.send_replace(next);
    }

    /// Go to sign-in, remembering `from`
    ///
    /// Redirecting while already on the sign-in view keeps the original
    /// return target instead of nesting sign-in inside itself.
    pub fn redirect_to_sign_in(&self, from: &str) -> Redirect {
        let from = {
            let current = self.location.borrow();
            if normalize_path(from) == routes::SIGN_IN {
                Location::parse(from)
                    .return_to
                    .or_else(|| current.return_to.clone())
                    .unwrap_or_else(|| routes::HOME.to_owned())
            } else {
                from.to_owned()
            }
        };
        let redirect = Redirect::to_sign_in(from);
        debug!(location = %redirect.location(), "Redirecting to sign-in");
        self.location.send_replace(Location {
            path: redirect.location(),
            return_to: Some(redirect.from.clone()),
        });
        redirect
    }

    /// Leave the sign-in view for the remembered target; returns where it went
    pub fn complete_sign_in(&self) -> String {
        let target = self
            .location
            .borrow()
            .return_to
            .clone()
            .unwrap_or_else(|| routes::HOME.to_owned());
        self.navigate(&target);
        target
    }
}
