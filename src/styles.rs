use umya_spreadsheet::{PatternValues, Style};

/// The parts of a cell style that travel onto appended rows: font, pattern
/// fill and the four border side styles.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFormat {
    pub font: Option<FontFormat>,
    pub fill: Option<FillFormat>,
    pub borders: Option<BorderFormat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontFormat {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillFormat {
    pub pattern_type: PatternValues,
    pub start_color: Option<String>,
    pub end_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderFormat {
    pub left: String,
    pub right: String,
    pub top: String,
    pub bottom: String,
}

impl CellFormat {
    /// Snapshot of `style`, or `None` when the cell carries no style at all.
    pub fn from_style(style: &Style) -> Option<Self> {
        let font = style.get_font().map(|font| FontFormat {
            name: font.get_name().to_string(),
            size: *font.get_size(),
            bold: *font.get_bold(),
            italic: *font.get_italic(),
            color: font.get_color().get_argb().to_string(),
        });

        let fill = style
            .get_fill()
            .and_then(|fill| fill.get_pattern_fill())
            .map(|pattern| FillFormat {
                pattern_type: pattern.get_pattern_type().clone(),
                start_color: pattern
                    .get_foreground_color()
                    .map(|c| c.get_argb().to_string())
                    .filter(|s| !s.is_empty()),
                end_color: pattern
                    .get_background_color()
                    .map(|c| c.get_argb().to_string())
                    .filter(|s| !s.is_empty()),
            });

        let borders = style.get_borders().map(|borders| BorderFormat {
            left: borders.get_left_border().get_border_style().to_string(),
            right: borders.get_right_border().get_border_style().to_string(),
            top: borders.get_top_border().get_border_style().to_string(),
            bottom: borders.get_bottom_border().get_border_style().to_string(),
        });

        if font.is_none() && fill.is_none() && borders.is_none() {
            return None;
        }
        Some(Self {
            font,
            fill,
            borders,
        })
    }

    pub fn apply_to(&self, style: &mut Style) {
        if let Some(font) = &self.font {
            let target = style.get_font_mut();
            if !font.name.is_empty() {
                target.set_name(font.name.clone());
            }
            if font.size > 0.0 {
                target.set_size(font.size);
            }
            target.set_bold(font.bold);
            target.set_italic(font.italic);
            if !font.color.is_empty() {
                target.get_color_mut().set_argb(font.color.clone());
            }
        }

        if let Some(fill) = &self.fill {
            let pattern = style.get_fill_mut().get_pattern_fill_mut();
            pattern.set_pattern_type(fill.pattern_type.clone());
            if let Some(color) = &fill.start_color {
                pattern.get_foreground_color_mut().set_argb(color.clone());
            }
            if let Some(color) = &fill.end_color {
                pattern.get_background_color_mut().set_argb(color.clone());
            }
        }

        if let Some(borders) = &self.borders {
            let target = style.get_borders_mut();
            target
                .get_left_border_mut()
                .set_border_style(borders.left.clone());
            target
                .get_right_border_mut()
                .set_border_style(borders.right.clone());
            target
                .get_top_border_mut()
                .set_border_style(borders.top.clone());
            target
                .get_bottom_border_mut()
                .set_border_style(borders.bottom.clone());
        }
    }
}
