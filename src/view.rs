//! Presentation state for one destination image
//!
//! A UI element asks the resolver for a photo when it mounts or when its
//! place changes, shows a placeholder while the lookup runs, then shows the
//! resolved URL. Results that arrive after the place changed or the element
//! went away are dropped. If the browser cannot load the resolved image the
//! view swaps to the category image once, and gives up after that.

use std::sync::Mutex;

use crate::catalog::category_fallback;
use crate::place::{PhotoRequest, ResolutionResult};
use crate::resolver::Resolver;
use crate::source::PhotoSource;

/// Identifies one `begin` call. Stale once the view moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Showing {
        image_url: String,
        source: PhotoSource,
        attribution: Option<String>,
        /// Set once the category image has replaced a broken one
        fell_back: bool,
    },
    /// "No image available"
    Unavailable,
}

#[derive(Debug)]
pub struct PhotoView {
    generation: u64,
    request: Option<PhotoRequest>,
    state: ViewState,
    torn_down: bool,
}

impl Default for PhotoView {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoView {
    pub fn new() -> Self {
        Self {
            generation: 0,
            request: None,
            state: ViewState::Idle,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn request(&self) -> Option<&PhotoRequest> {
        self.request.as_ref()
    }

    /// Start showing `request`. Invalidates every earlier ticket.
    pub fn begin(&mut self, request: PhotoRequest) -> Ticket {
        self.generation += 1;
        if !self.torn_down {
            self.request = Some(request);
            self.state = ViewState::Loading;
        }
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.torn_down && ticket.0 == self.generation
    }

    /// Apply a resolution. Returns false when the ticket was stale.
    pub fn complete(&mut self, ticket: Ticket, result: ResolutionResult) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!("Dropping stale photo result ({})", result.image_url);
            return false;
        }

        self.state = if result.image_url.trim().is_empty() {
            ViewState::Unavailable
        } else {
            ViewState::Showing {
                image_url: result.image_url,
                source: result.source,
                attribution: result.attribution,
                fell_back: false,
            }
        };
        true
    }

    /// The shown image failed to load in the browser
    pub fn image_failed(&mut self) -> &ViewState {
        if self.torn_down {
            return &self.state;
        }

        let next = match (&self.state, &self.request) {
            (
                ViewState::Showing {
                    source,
                    fell_back: false,
                    ..
                },
                Some(request),
            ) if *source != PhotoSource::Fallback => {
                let url = category_fallback(&request.place_name, request.category.as_deref());
                tracing::debug!("Image for {:?} failed, using {}", request.place_name, url);
                ViewState::Showing {
                    image_url: url.to_string(),
                    source: PhotoSource::Fallback,
                    attribution: None,
                    fell_back: true,
                }
            }
            (ViewState::Showing { .. }, _) => ViewState::Unavailable,
            (state, _) => state.clone(),
        };

        self.state = next;
        &self.state
    }

    /// The element went away; later results are ignored
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.generation += 1;
    }
}

/// Drive one resolution for `view`. Returns whether the result was applied.
pub async fn load(view: &Mutex<PhotoView>, resolver: &Resolver, request: PhotoRequest) -> bool {
    let ticket = {
        let mut view = view.lock().unwrap_or_else(|p| p.into_inner());
        view.begin(request.clone())
    };

    let result = resolver.resolve(&request).await;

    let mut view = view.lock().unwrap_or_else(|p| p.into_inner());
    view.complete(ticket, result)
}
