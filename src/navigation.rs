//! Pure navigation state machine.
//!
//! [`NavigationState::reduce`] maps the current state and one logical
//! [`Action`] to a candidate state plus the [`Effect`]s needed to make it
//! true. Nothing here touches the network, the cache or the terminal; the
//! [`Browser`](crate::browser::Browser) runs the effects and decides whether
//! the candidate is committed.

use crate::api::Strategy;
use crate::cache::PageKey;

/// The two visible regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    List,
    Reader,
}

impl Pane {
    pub fn toggled(self) -> Self {
        match self {
            Self::List => Self::Reader,
            Self::Reader => Self::List,
        }
    }
}

/// A logical user intent, independent of which key or click produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SwitchPane,
    FocusPane(Pane),
    SetStrategy(Strategy),
    NextPage,
    PreviousPage,
    MoveSelection(isize),
    SelectIndex(usize),
    /// Load the current page again, keeping the caches.
    Reload,
    Refresh,
    Quit,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop the in-memory cache and delete the disk snapshot.
    ClearCaches,
    /// Load a listing page (cache first), then the article of the selected row.
    LoadPage(PageKey),
    /// Load the article at this row of the current page (cache first).
    LoadArticle(usize),
    /// Write the article cache to disk.
    Persist,
    Exit,
}

/// Result of reducing one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: NavigationState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &NavigationState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Where the user is: page, ranking, selected row and focused pane.
///
/// `selected < item_count` holds whenever `item_count > 0`; on an empty page
/// `selected` is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    page: u32,
    strategy: Strategy,
    selected: usize,
    pane: Pane,
    item_count: usize,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    /// Startup state: page 1, `Relevant`, first row, list pane focused.
    pub fn new() -> Self {
        Self {
            page: 1,
            strategy: Strategy::Relevant,
            selected: 0,
            pane: Pane::List,
            item_count: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn page_key(&self) -> PageKey {
        PageKey::new(self.strategy, self.page)
    }

    /// Record how many rows the current page holds, clamping the selection.
    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self.selected = clamp_index(self.selected, item_count);
        self
    }

    /// Effects that populate the startup state.
    pub fn initial_load(&self) -> Vec<Effect> {
        vec![Effect::LoadPage(self.page_key())]
    }

    pub fn reduce(&self, action: Action) -> Transition {
        match action {
            Action::SwitchPane => self.with_pane(self.pane.toggled()),
            Action::FocusPane(pane) => self.with_pane(pane),
            Action::SetStrategy(strategy) => {
                if strategy == self.strategy {
                    return Transition::unchanged(self);
                }
                self.goto_page(strategy, 1)
            }
            Action::NextPage => self.goto_page(self.strategy, self.page.saturating_add(1)),
            Action::PreviousPage => {
                if self.page > 1 {
                    self.goto_page(self.strategy, self.page - 1)
                } else {
                    self.select(0)
                }
            }
            Action::MoveSelection(delta) => {
                let target = self.selected.saturating_add_signed(delta);
                self.select(target)
            }
            Action::SelectIndex(index) => self.select(index),
            Action::Reload => Transition {
                state: self.clone(),
                effects: vec![Effect::LoadPage(self.page_key())],
            },
            Action::Refresh => {
                let state = Self {
                    page: 1,
                    selected: 0,
                    ..self.clone()
                };
                let key = state.page_key();
                Transition {
                    state,
                    effects: vec![Effect::ClearCaches, Effect::LoadPage(key)],
                }
            }
            Action::Quit => Transition {
                state: self.clone(),
                effects: vec![Effect::Persist, Effect::Exit],
            },
        }
    }

    /// Candidate state for loading `key` again after it failed.
    ///
    /// Same as the page change that first asked for it, so the selection
    /// starts at the top.
    pub fn retry_page(&self, key: PageKey) -> Transition {
        self.goto_page(key.strategy, key.page)
    }

    fn with_pane(&self, pane: Pane) -> Transition {
        Transition {
            state: Self {
                pane,
                ..self.clone()
            },
            effects: Vec::new(),
        }
    }

    /// Candidate state for a page change. `item_count` is carried over until
    /// the new page is known.
    fn goto_page(&self, strategy: Strategy, page: u32) -> Transition {
        let state = Self {
            strategy,
            page: page.max(1),
            selected: 0,
            ..self.clone()
        };
        let key = state.page_key();
        Transition {
            state,
            effects: vec![Effect::LoadPage(key)],
        }
    }

    fn select(&self, index: usize) -> Transition {
        if self.item_count == 0 {
            return Transition::unchanged(self);
        }
        let index = clamp_index(index, self.item_count);
        if index == self.selected {
            return Transition::unchanged(self);
        }
        Transition {
            state: Self {
                selected: index,
                ..self.clone()
            },
            effects: vec![Effect::LoadArticle(index)],
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}
