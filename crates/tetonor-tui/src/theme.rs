use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Shown in the info panel
    pub name: &'static str,
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Grid and strip border color
    pub border: Color,
    /// Sum cell color
    pub sum: Color,
    /// Product cell color
    pub product: Color,
    /// Solved cell color
    pub solved: Color,
    /// Spent strip number color
    pub used: Color,
    /// Selected strip numbers and pro mode target
    pub selected_bg: Color,
    /// Cursor background
    pub cursor_bg: Color,
    /// Error color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "Dark",
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            sum: Color::Rgb { r: 255, g: 255, b: 255 },
            product: Color::Rgb { r: 80, g: 180, b: 255 },
            solved: Color::Rgb { r: 90, g: 255, b: 130 },
            used: Color::Rgb { r: 90, g: 95, b: 110 },
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            cursor_bg: Color::Rgb { r: 45, g: 50, b: 70 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "Light",
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            sum: Color::Rgb { r: 0, g: 0, b: 0 },
            product: Color::Rgb { r: 30, g: 100, b: 200 },
            solved: Color::Rgb { r: 40, g: 160, b: 60 },
            used: Color::Rgb { r: 190, g: 190, b: 200 },
            selected_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            cursor_bg: Color::Rgb { r: 225, g: 228, b: 240 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            name: "Contrast",
            bg: Color::Black,
            fg: Color::White,
            border: Color::Grey,
            sum: Color::Yellow,
            product: Color::Cyan,
            solved: Color::Green,
            used: Color::DarkGrey,
            selected_bg: Color::Blue,
            cursor_bg: Color::Rgb { r: 50, g: 50, b: 50 },
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }

    /// Cycle dark -> light -> high contrast
    pub fn next(&self) -> Self {
        match self.name {
            "Dark" => Self::light(),
            "Light" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }
}
