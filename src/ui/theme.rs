use ratatui::style::{Color, Modifier, Style};

use crate::api::AccountType;

/// Colours shared by every view.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub primary: Color,
    pub muted: Color,
    pub text: Color,
    pub error: Color,
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(0x16, 0x77, 0xff),
            muted: Color::DarkGray,
            text: Color::White,
            error: Color::Red,
            success: Color::Green,
        }
    }
}

impl Theme {
    pub fn focused(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn label(&self, focused: bool) -> Style {
        if focused {
            self.focused()
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.primary } else { self.muted })
    }

    pub fn account_type(&self, code: i32) -> Color {
        match AccountType::from_code(code) {
            Some(AccountType::Asset) => Color::Blue,
            Some(AccountType::Liability) => Color::Rgb(0xfa, 0x8c, 0x16),
            Some(AccountType::Equity) => Color::Magenta,
            Some(AccountType::Income) => Color::Green,
            Some(AccountType::Expense) => Color::Red,
            None => Color::Gray,
        }
    }
}
