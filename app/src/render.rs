//! Row rendering.
//!
//! The renderer is toolkit-agnostic: it turns the observed items into row
//! descriptors and turns row taps back into actions.

use crate::actions::AppAction;
use crate::types::{Item, ItemId};

/// One rendered row of the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Item shown by the row
    pub id: ItemId,
    /// Text to display
    pub text: String,
    /// Draw the text struck through
    pub struck_through: bool,
    /// Draw the text in italics
    pub italic: bool,
}

impl From<&Item> for Row {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            text: item.text.clone(),
            struck_through: item.done,
            italic: item.done,
        }
    }
}

/// Renders one row per item, in snapshot order
#[must_use]
pub fn render(items: &[Item]) -> Vec<Row> {
    items.iter().map(Row::from).collect()
}

/// Keeps the last rendered rows and reports changes
#[derive(Clone, Debug, Default)]
pub struct ListRenderer {
    rows: Vec<Row>,
}

impl ListRenderer {
    /// Creates a renderer with nothing rendered yet
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Re-renders `items`, returning the rows only if they differ from the
    /// last rendered ones.
    pub fn update(&mut self, items: &[Item]) -> Option<&[Row]> {
        let rows = render(items);
        if rows == self.rows {
            return None;
        }

        tracing::trace!(rows = rows.len(), "Rows changed");
        self.rows = rows;
        Some(self.rows.as_slice())
    }

    /// The last rendered rows
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// A tap on a row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowEvent {
    /// The row body was tapped: toggle the item
    Tapped(ItemId),
    /// The row's delete control was tapped
    DeleteTapped(ItemId),
}

impl RowEvent {
    /// The action this tap stands for
    #[must_use]
    pub fn into_action(self) -> AppAction {
        match self {
            Self::Tapped(id) => AppAction::ToggleItem { id },
            Self::DeleteTapped(id) => AppAction::DeleteItem { id },
        }
    }
}

impl From<RowEvent> for AppAction {
    fn from(event: RowEvent) -> Self {
        event.into_action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, text: &str, done: bool) -> Item {
        Item {
            id: ItemId::new(id),
            text: text.to_string(),
            done,
        }
    }

    #[test]
    fn done_items_are_struck_through_and_italic() {
        let rows = render(&[item("a", "buy milk", true), item("b", "walk dog", false)]);

        assert_eq!(rows.len(), 2);
        assert!(rows[0].struck_through && rows[0].italic);
        assert!(!rows[1].struck_through && !rows[1].italic);
        assert_eq!(rows[1].text, "walk dog");
    }

    #[test]
    fn update_reports_only_changes() {
        let mut renderer = ListRenderer::new();
        let items = vec![item("a", "buy milk", false)];

        assert!(renderer.update(&items).is_some());
        assert!(renderer.update(&items).is_none());

        let toggled = vec![item("a", "buy milk", true)];
        let rows = renderer.update(&toggled).map(<[Row]>::to_vec);
        assert_eq!(rows, Some(render(&toggled)));
        assert_eq!(renderer.rows(), render(&toggled).as_slice());
    }

    #[test]
    fn empty_list_is_not_a_change_initially() {
        let mut renderer = ListRenderer::new();
        assert!(renderer.update(&[]).is_none());
    }

    #[test]
    fn row_events_map_to_actions() {
        let id = ItemId::new("a");
        assert_eq!(
            RowEvent::Tapped(id.clone()).into_action(),
            AppAction::ToggleItem { id: id.clone() }
        );
        assert_eq!(AppAction::from(RowEvent::DeleteTapped(id.clone())), AppAction::DeleteItem { id });
    }
}
