//! Paginated language selection menus.
//!
//! Menus are rendered as transport-neutral button grids; the Telegram
//! adapter turns them into inline keyboards. Every button carries a
//! [`Token`] that round-trips through one encode/decode pair, so a
//! callback can never be misread into a different action than the one
//! that produced it.

use crate::catalog::{AUTO_DETECT, LANGUAGES};

/// Catalog entries shown per page
pub const PAGE_SIZE: usize = 20;

/// Catalog entries per keyboard row; the last row is reserved for
/// navigation controls
pub const ENTRIES_PER_ROW: usize = 2;

/// Which session field a menu is selecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    /// Choosing the source language (includes auto-detect)
    Source,
    /// Choosing the target language
    Target,
}

impl SelectAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "src",
            Self::Target => "dst",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "src" => Some(Self::Source),
            "dst" => Some(Self::Target),
            _ => None,
        }
    }
}

/// A callback token carried by a menu button.
///
/// Encoded as `sel:<action>:<code>`, `page:<action>:<index>` or
/// `cancel`. Anything else fails to parse and is dropped by the router
/// as a malformed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// User picked a language on an open menu
    Select {
        /// Menu the selection came from
        action: SelectAction,
        /// Selected language code (or [`AUTO_DETECT`])
        code: String,
    },
    /// User asked for another page of the same menu
    Page {
        /// Menu being paged through
        action: SelectAction,
        /// Zero-based page index to render
        index: usize,
    },
    /// User dismissed the menu
    Cancel,
}

impl Token {
    /// Serialize the token into its callback-data form
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Select { action, code } => format!("sel:{}:{}", action.as_str(), code),
            Self::Page { action, index } => format!("page:{}:{}", action.as_str(), index),
            Self::Cancel => "cancel".to_string(),
        }
    }

    /// Parse callback data back into a token.
    ///
    /// Returns `None` for malformed or forged data.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        if data == "cancel" {
            return Some(Self::Cancel);
        }
        let mut parts = data.splitn(3, ':');
        let kind = parts.next()?;
        let action = SelectAction::parse(parts.next()?)?;
        let rest = parts.next()?;
        match kind {
            "sel" if !rest.is_empty() => Some(Self::Select {
                action,
                code: rest.to_string(),
            }),
            "page" => rest.parse().ok().map(|index| Self::Page { action, index }),
            _ => None,
        }
    }
}

/// A single menu button: display label plus encoded callback token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    /// Text shown on the button
    pub label: String,
    /// Encoded [`Token`] echoed back on press
    pub token: String,
}

impl MenuButton {
    fn new(label: impl Into<String>, token: &Token) -> Self {
        Self {
            label: label.into(),
            token: token.encode(),
        }
    }
}

/// One rendered page of a selection menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPage {
    /// Which selection this menu serves
    pub action: SelectAction,
    /// Zero-based page index
    pub index: usize,
    /// Button grid; the last row holds navigation controls
    pub rows: Vec<Vec<MenuButton>>,
    /// Whether a previous page exists
    pub has_prev: bool,
    /// Whether a further page exists
    pub has_next: bool,
}

impl MenuPage {
    /// Title text shown above the button grid
    #[must_use]
    pub fn title(&self) -> String {
        match self.action {
            SelectAction::Source => "Choose the source language:".to_string(),
            SelectAction::Target => "Choose the target language:".to_string(),
        }
    }
}

/// Render one page of the language menu for `action`.
///
/// Pure over the fixed catalog: the same `(action, index)` always
/// produces byte-identical buttons, which keeps re-renders after a
/// failed send idempotent. An `index` past the end of the catalog
/// renders an empty grid with only a back control; normal navigation
/// never produces one because next buttons are emitted only while
/// entries remain.
#[must_use]
pub fn build_page(action: SelectAction, index: usize) -> MenuPage {
    let start = index.saturating_mul(PAGE_SIZE).min(LANGUAGES.len());
    let end = (start + PAGE_SIZE).min(LANGUAGES.len());
    let entries = &LANGUAGES[start..end];

    let mut rows: Vec<Vec<MenuButton>> = Vec::with_capacity(entries.len() / ENTRIES_PER_ROW + 2);

    // Auto-detect is offered once, at the top of the first source page
    if action == SelectAction::Source && index == 0 {
        rows.push(vec![MenuButton::new(
            "🌐 Auto-detect",
            &Token::Select {
                action,
                code: AUTO_DETECT.to_string(),
            },
        )]);
    }

    for chunk in entries.chunks(ENTRIES_PER_ROW) {
        rows.push(
            chunk
                .iter()
                .map(|e| {
                    MenuButton::new(
                        e.name,
                        &Token::Select {
                            action,
                            code: e.code.to_string(),
                        },
                    )
                })
                .collect(),
        );
    }

    let has_prev = index > 0;
    let has_next = end < LANGUAGES.len();

    let mut nav = Vec::with_capacity(3);
    if has_prev {
        nav.push(MenuButton::new(
            "⬅️ Back",
            &Token::Page {
                action,
                index: index - 1,
            },
        ));
    }
    nav.push(MenuButton::new("✖️ Cancel", &Token::Cancel));
    if has_next {
        nav.push(MenuButton::new(
            "Next ➡️",
            &Token::Page {
                action,
                index: index + 1,
            },
        ));
    }
    rows.push(nav);

    MenuPage {
        action,
        index,
        rows,
        has_prev,
        has_next,
    }
}

/// Entry menu for `/set`: pick which side of the translation to change
#[must_use]
pub fn build_chooser() -> Vec<Vec<MenuButton>> {
    vec![
        vec![
            MenuButton::new(
                "Source language",
                &Token::Page {
                    action: SelectAction::Source,
                    index: 0,
                },
            ),
            MenuButton::new(
                "Target language",
                &Token::Page {
                    action: SelectAction::Target,
                    index: 0,
                },
            ),
        ],
        vec![MenuButton::new("✖️ Cancel", &Token::Cancel)],
    ]
}
