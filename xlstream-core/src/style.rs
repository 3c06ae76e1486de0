//! Style model and cascade resolution.
//!
//! A [`Style`] is a partially specified set of formatting attributes: every
//! attribute is independently optional, and `None` means "inherit from the
//! next layer down". Styles cascade workbook -> sheet -> column -> row ->
//! cell, first set value wins, cell highest. Resolving a cascade against the
//! (fully specified) workbook default produces a [`ResolvedStyle`], which is
//! what the interning tables consume.

use crate::error::{Result, XlstreamError};
use crate::stylesheet::formats;

/// Horizontal cell alignment. `Auto` is the format default and never written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizAlign {
    #[default]
    Auto,
    Left,
    Center,
    Right,
}

impl HorizAlign {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            HorizAlign::Auto => "",
            HorizAlign::Left => "left",
            HorizAlign::Center => "center",
            HorizAlign::Right => "right",
        }
    }
}

/// Vertical cell alignment. `Bottom` is the format default and never written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertAlign {
    #[default]
    Bottom,
    Center,
    Top,
}

impl VertAlign {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            VertAlign::Bottom => "",
            VertAlign::Center => "center",
            VertAlign::Top => "top",
        }
    }
}

/// Border line style. Serialized names are the format's own; do not reorder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderKind {
    #[default]
    None,
    Hair,
    Thin,
    Medium,
    Thick,
    Dotted,
    Dashed,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
    Double,
}

impl BorderKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BorderKind::None => "",
            BorderKind::Hair => "hair",
            BorderKind::Thin => "thin",
            BorderKind::Medium => "medium",
            BorderKind::Thick => "thick",
            BorderKind::Dotted => "dotted",
            BorderKind::Dashed => "dashed",
            BorderKind::MediumDashed => "mediumDashed",
            BorderKind::DashDot => "dashDot",
            BorderKind::MediumDashDot => "mediumDashDot",
            BorderKind::DashDotDot => "dashDotDot",
            BorderKind::MediumDashDotDot => "mediumDashDotDot",
            BorderKind::SlantDashDot => "slantDashDot",
            BorderKind::Double => "double",
        }
    }
}

/// A partially specified cell style.
///
/// Colors are RGB or ARGB hex without a leading `#`. For the text color an
/// empty string means the theme default; for the fill color it means an
/// explicit "no fill"; for border colors it means "auto".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub number_format: Option<String>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    pub fill_color: Option<String>,
    pub horizontal: Option<HorizAlign>,
    pub vertical: Option<VertAlign>,
    pub wrap: Option<bool>,
    pub border_left: Option<BorderKind>,
    pub border_left_color: Option<String>,
    pub border_right: Option<BorderKind>,
    pub border_right_color: Option<String>,
    pub border_top: Option<BorderKind>,
    pub border_top_color: Option<String>,
    pub border_bottom: Option<BorderKind>,
    pub border_bottom_color: Option<String>,
}

impl Style {
    /// Create a style with every attribute unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The style every cell ultimately inherits from: the base case of the
    /// cascade, with every attribute set.
    pub fn workbook_default() -> Self {
        Style {
            number_format: Some(formats::GENERAL.to_string()),
            font_name: Some("Aptos Narrow".to_string()),
            font_size: Some(11.0),
            bold: Some(false),
            italic: Some(false),
            color: Some(String::new()),
            fill_color: Some(String::new()),
            horizontal: Some(HorizAlign::Auto),
            vertical: Some(VertAlign::Bottom),
            wrap: Some(false),
            border_left: Some(BorderKind::None),
            border_left_color: Some(String::new()),
            border_right: Some(BorderKind::None),
            border_right_color: Some(String::new()),
            border_top: Some(BorderKind::None),
            border_top_color: Some(String::new()),
            border_bottom: Some(BorderKind::None),
            border_bottom_color: Some(String::new()),
        }
    }

    /// Set the number format string (see [`formats`] for the built-ins).
    pub fn with_number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = Some(format.into());
        self
    }

    /// Set the font family name.
    pub fn with_font<S: Into<String>>(mut self, name: S) -> Self {
        self.font_name = Some(name.into());
        self
    }

    /// Set the font size in points.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set the text color ("" for the theme default).
    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the solid fill color ("" for no fill).
    pub fn with_fill<S: Into<String>>(mut self, color: S) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn with_horizontal(mut self, align: HorizAlign) -> Self {
        self.horizontal = Some(align);
        self
    }

    pub fn with_vertical(mut self, align: VertAlign) -> Self {
        self.vertical = Some(align);
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// Set all four border sides to the same kind.
    pub fn with_border(mut self, kind: BorderKind) -> Self {
        self.border_left = Some(kind);
        self.border_right = Some(kind);
        self.border_top = Some(kind);
        self.border_bottom = Some(kind);
        self
    }

    /// Set all four border colors to the same color ("" for auto).
    pub fn with_border_color<S: Into<String>>(mut self, color: S) -> Self {
        let color = color.into();
        self.border_left_color = Some(color.clone());
        self.border_right_color = Some(color.clone());
        self.border_top_color = Some(color.clone());
        self.border_bottom_color = Some(color);
        self
    }

    pub fn with_border_left(mut self, kind: BorderKind) -> Self {
        self.border_left = Some(kind);
        self
    }

    pub fn with_border_left_color<S: Into<String>>(mut self, color: S) -> Self {
        self.border_left_color = Some(color.into());
        self
    }

    pub fn with_border_right(mut self, kind: BorderKind) -> Self {
        self.border_right = Some(kind);
        self
    }

    pub fn with_border_right_color<S: Into<String>>(mut self, color: S) -> Self {
        self.border_right_color = Some(color.into());
        self
    }

    pub fn with_border_top(mut self, kind: BorderKind) -> Self {
        self.border_top = Some(kind);
        self
    }

    pub fn with_border_top_color<S: Into<String>>(mut self, color: S) -> Self {
        self.border_top_color = Some(color.into());
        self
    }

    pub fn with_border_bottom(mut self, kind: BorderKind) -> Self {
        self.border_bottom = Some(kind);
        self
    }

    pub fn with_border_bottom_color<S: Into<String>>(mut self, color: S) -> Self {
        self.border_bottom_color = Some(color.into());
        self
    }

    /// Merge `self` over `parent`: every unset attribute is taken from
    /// `parent`, set attributes win.
    pub fn or(&self, parent: &Style) -> Style {
        fn pick<T: Clone>(child: &Option<T>, parent: &Option<T>) -> Option<T> {
            child.clone().or_else(|| parent.clone())
        }
        Style {
            number_format: pick(&self.number_format, &parent.number_format),
            font_name: pick(&self.font_name, &parent.font_name),
            font_size: self.font_size.or(parent.font_size),
            bold: self.bold.or(parent.bold),
            italic: self.italic.or(parent.italic),
            color: pick(&self.color, &parent.color),
            fill_color: pick(&self.fill_color, &parent.fill_color),
            horizontal: self.horizontal.or(parent.horizontal),
            vertical: self.vertical.or(parent.vertical),
            wrap: self.wrap.or(parent.wrap),
            border_left: self.border_left.or(parent.border_left),
            border_left_color: pick(&self.border_left_color, &parent.border_left_color),
            border_right: self.border_right.or(parent.border_right),
            border_right_color: pick(&self.border_right_color, &parent.border_right_color),
            border_top: self.border_top.or(parent.border_top),
            border_top_color: pick(&self.border_top_color, &parent.border_top_color),
            border_bottom: self.border_bottom.or(parent.border_bottom),
            border_bottom_color: pick(&self.border_bottom_color, &parent.border_bottom_color),
        }
    }

    /// Resolve an ordered cascade of optional layers, lowest priority first.
    /// Attributes unset in every layer stay unset in the result.
    pub fn cascade<'a, I>(layers: I) -> Style
    where
        I: IntoIterator<Item = Option<&'a Style>>,
    {
        let mut resolved = Style::default();
        for layer in layers.into_iter().flatten() {
            resolved = layer.or(&resolved);
        }
        resolved
    }

    /// Resolve against an already complete base. Infallible; this is the
    /// per-cell path.
    pub fn resolve_over(&self, base: &ResolvedStyle) -> ResolvedStyle {
        fn pick(v: &Option<String>, base: &str) -> String {
            match v {
                Some(v) => v.clone(),
                None => base.to_string(),
            }
        }
        ResolvedStyle {
            number_format: pick(&self.number_format, &base.number_format),
            font_name: pick(&self.font_name, &base.font_name),
            font_size: self.font_size.unwrap_or(base.font_size),
            bold: self.bold.unwrap_or(base.bold),
            italic: self.italic.unwrap_or(base.italic),
            color: pick(&self.color, &base.color),
            fill_color: pick(&self.fill_color, &base.fill_color),
            horizontal: self.horizontal.unwrap_or(base.horizontal),
            vertical: self.vertical.unwrap_or(base.vertical),
            wrap: self.wrap.unwrap_or(base.wrap),
            border_left: self.border_left.unwrap_or(base.border_left),
            border_left_color: pick(&self.border_left_color, &base.border_left_color),
            border_right: self.border_right.unwrap_or(base.border_right),
            border_right_color: pick(&self.border_right_color, &base.border_right_color),
            border_top: self.border_top.unwrap_or(base.border_top),
            border_top_color: pick(&self.border_top_color, &base.border_top_color),
            border_bottom: self.border_bottom.unwrap_or(base.border_bottom),
            border_bottom_color: pick(&self.border_bottom_color, &base.border_bottom_color),
        }
    }

    /// Require every attribute to be set, as the workbook default must be.
    /// The error names the first attribute found unset.
    pub fn finalize(&self) -> Result<ResolvedStyle> {
        fn need<T: Clone>(v: &Option<T>, name: &'static str) -> Result<T> {
            v.clone()
                .ok_or(XlstreamError::IncompleteDefaultStyle(name))
        }
        Ok(ResolvedStyle {
            number_format: need(&self.number_format, "the number format")?,
            font_name: need(&self.font_name, "the font name")?,
            font_size: need(&self.font_size, "the font size")?,
            bold: need(&self.bold, "bold")?,
            italic: need(&self.italic, "italic")?,
            color: need(&self.color, "the text color")?,
            fill_color: need(&self.fill_color, "the fill color")?,
            horizontal: need(&self.horizontal, "horizontal alignment")?,
            vertical: need(&self.vertical, "vertical alignment")?,
            wrap: need(&self.wrap, "wrap")?,
            border_left: need(&self.border_left, "the left border")?,
            border_left_color: need(&self.border_left_color, "the left border color")?,
            border_right: need(&self.border_right, "the right border")?,
            border_right_color: need(&self.border_right_color, "the right border color")?,
            border_top: need(&self.border_top, "the top border")?,
            border_top_color: need(&self.border_top_color, "the top border color")?,
            border_bottom: need(&self.border_bottom, "the bottom border")?,
            border_bottom_color: need(&self.border_bottom_color, "the bottom border color")?,
        })
    }
}

/// A fully resolved style: every attribute concrete. Produced by cascading
/// down to the workbook default and consumed by the interning tables; never
/// stored in the workbook model.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    pub number_format: String,
    pub font_name: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
    pub fill_color: String,
    pub horizontal: HorizAlign,
    pub vertical: VertAlign,
    pub wrap: bool,
    pub border_left: BorderKind,
    pub border_left_color: String,
    pub border_right: BorderKind,
    pub border_right_color: String,
    pub border_top: BorderKind,
    pub border_top_color: String,
    pub border_bottom: BorderKind,
    pub border_bottom_color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let style = Style::new()
            .with_font("Arial")
            .with_font_size(12.0)
            .with_bold(true)
            .with_color("FF0000");
        assert_eq!(style.font_name, Some("Arial".to_string()));
        assert_eq!(style.font_size, Some(12.0));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.color, Some("FF0000".to_string()));
        assert_eq!(style.italic, None);
    }

    #[test]
    fn test_with_border_sets_all_sides() {
        let style = Style::new()
            .with_border(BorderKind::Thin)
            .with_border_color("00FF00");
        assert_eq!(style.border_left, Some(BorderKind::Thin));
        assert_eq!(style.border_right, Some(BorderKind::Thin));
        assert_eq!(style.border_top, Some(BorderKind::Thin));
        assert_eq!(style.border_bottom, Some(BorderKind::Thin));
        assert_eq!(style.border_top_color, Some("00FF00".to_string()));
    }

    #[test]
    fn test_cascade_highest_wins() {
        let wb = Style::new().with_color("000000");
        let cell = Style::new().with_color("FF0000");
        let resolved = Style::cascade([Some(&wb), None, Some(&cell)]);
        assert_eq!(resolved.color, Some("FF0000".to_string()));
    }

    #[test]
    fn test_cascade_falls_through_unset() {
        let wb = Style::new().with_bold(true);
        let cell = Style::new();
        let resolved = Style::cascade([Some(&wb), Some(&cell)]);
        assert_eq!(resolved.bold, Some(true));
    }

    #[test]
    fn test_resolve_over_base() {
        let base = Style::workbook_default().finalize().unwrap();
        let style = Style::new().with_font_size(20.0).with_fill("FFDD22");
        let resolved = style.resolve_over(&base);
        assert_eq!(resolved.font_size, 20.0);
        assert_eq!(resolved.fill_color, "FFDD22");
        // everything else comes from the base
        assert_eq!(resolved.font_name, base.font_name);
        assert_eq!(resolved.number_format, base.number_format);
    }

    #[test]
    fn test_finalize_complete_default() {
        assert!(Style::workbook_default().finalize().is_ok());
    }

    #[test]
    fn test_finalize_rejects_unset() {
        let mut incomplete = Style::workbook_default();
        incomplete.wrap = None;
        let err = incomplete.finalize().unwrap_err();
        assert!(matches!(err, XlstreamError::IncompleteDefaultStyle("wrap")));
    }
}
