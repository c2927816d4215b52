//! Search input with instant suggestions and recent searches

use crate::services::{
    recent_searches::RecentSearches,
    session::CatalogSession,
    suggestions::{SuggestionEngine, SuggestionSet},
};

/// What the dropdown under the input shows
#[derive(Debug, Clone, PartialEq)]
pub enum Dropdown {
    Hidden,
    /// Empty input: previously submitted terms
    Recent(Vec<String>),
    /// Suggestions pending for the current input
    Loading,
    Suggestions(SuggestionSet),
}

pub struct SearchBar {
    input: String,
    focused: bool,
    engine: SuggestionEngine,
    recent: RecentSearches,
}

impl SearchBar {
    pub fn new(engine: SuggestionEngine, recent: RecentSearches) -> Self {
        Self {
            input: String::new(),
            focused: false,
            engine,
            recent,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn recent(&self) -> &RecentSearches {
        &self.recent
    }

    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.engine.cancel();
    }

    /// Keystroke handler
    pub fn on_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.focused = true;
        self.engine.on_query_change(text);
    }

    pub fn dropdown(&self) -> Dropdown {
        if !self.focused {
            return Dropdown::Hidden;
        }
        let query = self.input.trim();
        if query.is_empty() {
            return match self.recent.entries() {
                [] => Dropdown::Hidden,
                entries => Dropdown::Recent(entries.to_vec()),
            };
        }

        let set = self.engine.snapshot();
        if set.query != query {
            return Dropdown::Hidden;
        }
        if set.open {
            Dropdown::Suggestions(set)
        } else if set.loading {
            Dropdown::Loading
        } else {
            Dropdown::Hidden
        }
    }

    /// Commit the input as the catalog search. Returns whether the filters changed.
    pub fn submit(&mut self, session: &mut CatalogSession) -> bool {
        let term = self.input.trim().to_string();
        self.engine.cancel();
        self.focused = false;
        if !term.is_empty() {
            self.recent.record(&term);
        }
        session.update(|store| store.set_search_query(&term))
    }

    /// Pick a suggestion or a recent term from the dropdown
    pub fn choose(&mut self, text: &str, session: &mut CatalogSession) -> bool {
        self.input = text.to_string();
        self.submit(session)
    }

    pub fn forget_recent(&mut self, term: &str) -> bool {
        self.recent.remove(term)
    }

    /// Empty the input and drop the search term from the filters
    pub fn clear(&mut self, session: &mut CatalogSession) -> bool {
        self.input.clear();
        self.engine.on_query_change("");
        session.update(|store| store.set_search_query(""))
    }
}
