// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory stand-in for a document's style elements.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

/// Identifies one compiled sheet within a [`StyleMedium`].
pub type SheetId = u32;

/// Injected CSS, one block per attached sheet, in injection order.
///
/// Cloning a medium clones the handle; every clone observes the same blocks.
#[derive(Clone, Debug, Default)]
pub struct StyleMedium {
    blocks: Rc<RefCell<Vec<(SheetId, String)>>>,
}

impl StyleMedium {
    /// Creates an empty medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects `css` for `sheet`.
    ///
    /// A sheet that is already present keeps its position and has its text
    /// replaced.
    pub(crate) fn inject(&self, sheet: SheetId, css: String) {
        let mut blocks = self.blocks.borrow_mut();
        match blocks.iter_mut().find(|(id, _)| *id == sheet) {
            Some((_, text)) => *text = css,
            None => blocks.push((sheet, css)),
        }
    }

    /// Rewrites the text of an injected sheet. Does nothing if `sheet` is not
    /// injected.
    pub(crate) fn rewrite(&self, sheet: SheetId, css: String) {
        if let Some((_, text)) = self
            .blocks
            .borrow_mut()
            .iter_mut()
            .find(|(id, _)| *id == sheet)
        {
            *text = css;
        }
    }

    pub(crate) fn remove(&self, sheet: SheetId) {
        self.blocks.borrow_mut().retain(|(id, _)| *id != sheet);
    }

    /// Returns the number of injected sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Returns `true` if nothing is injected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }

    /// Returns `true` if `sheet` is injected.
    #[must_use]
    pub fn contains(&self, sheet: SheetId) -> bool {
        self.blocks.borrow().iter().any(|(id, _)| *id == sheet)
    }

    /// Returns the injected text of `sheet`.
    #[must_use]
    pub fn sheet_css(&self, sheet: SheetId) -> Option<String> {
        self.blocks
            .borrow()
            .iter()
            .find(|(id, _)| *id == sheet)
            .map(|(_, text)| text.clone())
    }

    /// Returns the injected sheet ids in injection order.
    #[must_use]
    pub fn sheets(&self) -> Vec<SheetId> {
        self.blocks.borrow().iter().map(|(id, _)| *id).collect()
    }

    /// Returns the full document text: every non-empty block in injection
    /// order.
    #[must_use]
    pub fn css(&self) -> String {
        let blocks = self.blocks.borrow();
        let mut out = String::new();
        for (_, text) in blocks.iter().filter(|(_, text)| !text.is_empty()) {
            out.push_str(text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_keeps_position_on_reinjection() {
        let medium = StyleMedium::new();
        medium.inject(1, ".a {}\n".into());
        medium.inject(2, ".b {}\n".into());
        medium.inject(1, ".a2 {}\n".into());

        assert_eq!(medium.sheets(), [1, 2]);
        assert_eq!(medium.css(), ".a2 {}\n.b {}\n");
    }

    #[test]
    fn rewrite_ignores_absent_sheets() {
        let medium = StyleMedium::new();
        medium.rewrite(3, ".c {}\n".into());
        assert!(medium.is_empty());

        medium.inject(3, String::new());
        medium.rewrite(3, ".c {}\n".into());
        assert_eq!(medium.sheet_css(3).as_deref(), Some(".c {}\n"));

        let clone = medium.clone();
        clone.remove(3);
        assert!(!medium.contains(3));
    }
}
