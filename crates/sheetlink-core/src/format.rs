use serde::{Deserialize, Serialize};

/// RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let unit = |c: u8| f32::from(c) / 255.0;
        Color {
            red: unit(r),
            green: unit(g),
            blue: unit(b),
            alpha: unit(a),
        }
    }

    /// Parse from CSS hex color string
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    pub const BLACK: Color = Color { red: 0.0, green: 0.0, blue: 0.0, alpha: 1.0 };
    pub const WHITE: Color = Color { red: 1.0, green: 1.0, blue: 1.0, alpha: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// How text that does not fit a cell is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WrapStrategy {
    OverflowCell,
    LegacyWrap,
    Clip,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberType {
    Text,
    Number,
    Percent,
    Currency,
    Date,
    Time,
    DateTime,
    Scientific,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: NumberType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Cell padding in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
}

impl Padding {
    fn is_empty(&self) -> bool {
        *self == Padding::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

impl TextFormat {
    fn is_empty(&self) -> bool {
        *self == TextFormat::default()
    }
}

/// Cell formatting properties.
///
/// Only the properties that are set are sent; [`CellFormat::field_mask`] names
/// them so the remote leaves everything else untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_strategy: Option<WrapStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
    #[serde(default, skip_serializing_if = "Padding::is_empty")]
    pub padding: Padding,
    #[serde(default, skip_serializing_if = "TextFormat::is_empty")]
    pub text_format: TextFormat,
}

impl CellFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.text_format.foreground_color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.text_format.bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.text_format.italic = Some(true);
        self
    }

    pub fn font_size(mut self, points: u32) -> Self {
        self.text_format.font_size = Some(points);
        self
    }

    pub fn align(mut self, align: HorizontalAlign) -> Self {
        self.horizontal_alignment = Some(align);
        self
    }

    pub fn valign(mut self, align: VerticalAlign) -> Self {
        self.vertical_alignment = Some(align);
        self
    }

    pub fn wrap(mut self, strategy: WrapStrategy) -> Self {
        self.wrap_strategy = Some(strategy);
        self
    }

    pub fn number(mut self, kind: NumberType, pattern: Option<&str>) -> Self {
        self.number_format = Some(NumberFormat {
            kind,
            pattern: pattern.map(str::to_string),
        });
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Check if no property is set
    pub fn is_empty(&self) -> bool {
        *self == CellFormat::default()
    }

    /// Comma separated `userEnteredFormat.*` paths for every property that is set
    pub fn field_mask(&self) -> String {
        let mut fields = Vec::new();
        if self.background_color.is_some() {
            fields.push("userEnteredFormat.backgroundColor");
        }
        if self.horizontal_alignment.is_some() {
            fields.push("userEnteredFormat.horizontalAlignment");
        }
        if self.vertical_alignment.is_some() {
            fields.push("userEnteredFormat.verticalAlignment");
        }
        if self.wrap_strategy.is_some() {
            fields.push("userEnteredFormat.wrapStrategy");
        }
        if self.number_format.is_some() {
            fields.push("userEnteredFormat.numberFormat");
        }
        if !self.padding.is_empty() {
            fields.push("userEnteredFormat.padding");
        }
        if !self.text_format.is_empty() {
            fields.push("userEnteredFormat.textFormat");
        }
        fields.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("000000"), Some(Color::BLACK));
        let translucent = Color::from_hex("#ff000080").unwrap();
        assert_eq!(translucent.red, 1.0);
        assert!((translucent.alpha - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_field_mask() {
        assert_eq!(CellFormat::new().field_mask(), "");

        let format = CellFormat::new()
            .background(Color::WHITE)
            .bold()
            .font_size(12)
            .align(HorizontalAlign::Center);
        assert_eq!(
            format.field_mask(),
            concat!(
                "userEnteredFormat.backgroundColor,",
                "userEnteredFormat.horizontalAlignment,",
                "userEnteredFormat.textFormat"
            )
        );
    }

    #[test]
    fn test_serialization_skips_unset() {
        let format = CellFormat::new()
            .number(NumberType::Date, Some("yyyy-mm-dd"))
            .wrap(WrapStrategy::Clip);
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "wrapStrategy": "CLIP",
                "numberFormat": {"type": "DATE", "pattern": "yyyy-mm-dd"}
            })
        );
    }
}
