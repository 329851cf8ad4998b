//! Keyboard navigation over a result list.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    Highlight(usize),
    /// Focus the result at this index.
    Pick(usize),
    Close,
    Nothing,
}

/// Wrap-around highlight over `len` results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCursor {
    len: usize,
    highlighted: Option<usize>,
}

impl ResultCursor {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            highlighted: None,
        }
    }

    /// Starts over for a fresh result list.
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn press(&mut self, key: SearchKey) -> CursorAction {
        if key == SearchKey::Escape {
            self.highlighted = None;
            return CursorAction::Close;
        }
        if self.len == 0 {
            return CursorAction::Nothing;
        }
        match key {
            SearchKey::Down => {
                let next = self.highlighted.map_or(0, |index| (index + 1) % self.len);
                self.highlighted = Some(next);
                CursorAction::Highlight(next)
            }
            SearchKey::Up => {
                let next = self
                    .highlighted
                    .map_or(self.len - 1, |index| (index + self.len - 1) % self.len);
                self.highlighted = Some(next);
                CursorAction::Highlight(next)
            }
            SearchKey::Enter => CursorAction::Pick(self.highlighted.unwrap_or(0)),
            SearchKey::Escape => CursorAction::Close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorAction, ResultCursor, SearchKey};

    #[test]
    fn arrows_wrap_around() {
        let mut cursor = ResultCursor::new(3);
        assert_eq!(cursor.press(SearchKey::Up), CursorAction::Highlight(2));
        assert_eq!(cursor.press(SearchKey::Down), CursorAction::Highlight(0));
        assert_eq!(cursor.press(SearchKey::Down), CursorAction::Highlight(1));
        assert_eq!(cursor.press(SearchKey::Enter), CursorAction::Pick(1));
    }

    #[test]
    fn enter_without_highlight_picks_first() {
        let mut cursor = ResultCursor::new(2);
        assert_eq!(cursor.press(SearchKey::Enter), CursorAction::Pick(0));
        assert_eq!(cursor.press(SearchKey::Escape), CursorAction::Close);
        assert_eq!(cursor.highlighted(), None);
    }

    #[test]
    fn empty_results_ignore_navigation() {
        let mut cursor = ResultCursor::default();
        assert_eq!(cursor.press(SearchKey::Down), CursorAction::Nothing);
        assert_eq!(cursor.press(SearchKey::Enter), CursorAction::Nothing);
    }
}
