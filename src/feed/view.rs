/// Grid/map view selection and the manage mode interlock

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// Paginated card grid
    #[default]
    Grid,
    /// Every feed photo plotted at once, no pagination
    Map,
}

#[derive(Debug, Clone, Default)]
pub struct ViewSelector {
    mode: ViewMode,
    managing: bool,
}

impl ViewSelector {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_managing(&self) -> bool {
        self.managing
    }

    /// Whether the reveal controller limits what is shown
    pub fn is_paginated(&self) -> bool {
        self.mode == ViewMode::Grid
    }

    /// Flip between grid and map. Always changes the mode; manage mode only
    /// forces the grid at the moment it is entered.
    pub fn toggle_map(&mut self) -> bool {
        self.mode = match self.mode {
            ViewMode::Grid => ViewMode::Map,
            ViewMode::Map => ViewMode::Grid,
        };
        true
    }

    /// A feed tab was picked: tabs describe list order, so the map closes.
    /// Returns whether the mode changed.
    pub fn on_tab_selected(&mut self) -> bool {
        self.leave_map()
    }

    /// Enter or leave manage mode. Entering forces the grid.
    /// Returns whether the view mode changed.
    pub fn set_managing(&mut self, managing: bool) -> bool {
        self.managing = managing;
        if managing {
            self.leave_map()
        } else {
            false
        }
    }

    fn leave_map(&mut self) -> bool {
        let changed = self.mode == ViewMode::Map;
        self.mode = ViewMode::Grid;
        changed
    }
}
