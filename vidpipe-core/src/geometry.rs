// ============================================================================
// vidpipe-core/src/geometry.rs
// ============================================================================
//
// POSITION RESOLVER: Named Positions to ffmpeg Coordinate Expressions
//
// Overlay-style filters (overlay, pad, crop, drawtext) each name the frame and
// the placed element with their own symbols. This module turns a named
// position such as `bottomright` into the pair of x/y expressions for a given
// filter's symbol set, so that every module shares one calculus:
//
//   start  -> 0 (or the margin)
//   center -> (outer-inner)/2
//   end    -> outer-inner (minus the margin)
//
// KEY COMPONENTS:
// - Position: the named anchor, parsed case-insensitively
// - Axes: the symbol set (and margin) of a particular filter
// - Placement: resolved x/y expressions

use crate::error::{CoreResult, validation_error};
use std::fmt;
use std::str::FromStr;

/// Named placement of an element inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Center,
    Top,
    Bottom,
    Left,
    Right,
    CenterLeft,
    CenterRight,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Middle,
    End,
}

impl Position {
    pub const ALL: [Position; 11] = [
        Position::Center,
        Position::Top,
        Position::Bottom,
        Position::Left,
        Position::Right,
        Position::CenterLeft,
        Position::CenterRight,
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::Top => "top",
            Position::Bottom => "bottom",
            Position::Left => "left",
            Position::Right => "right",
            Position::CenterLeft => "center_left",
            Position::CenterRight => "center_right",
            Position::TopLeft => "topleft",
            Position::TopRight => "topright",
            Position::BottomLeft => "bottomleft",
            Position::BottomRight => "bottomright",
        }
    }

    // (horizontal, vertical)
    fn alignment(self) -> (Align, Align) {
        match self {
            Position::Center => (Align::Middle, Align::Middle),
            Position::Top => (Align::Middle, Align::Start),
            Position::Bottom => (Align::Middle, Align::End),
            Position::Left | Position::CenterLeft => (Align::Start, Align::Middle),
            Position::Right | Position::CenterRight => (Align::End, Align::Middle),
            Position::TopLeft => (Align::Start, Align::Start),
            Position::TopRight => (Align::End, Align::Start),
            Position::BottomLeft => (Align::Start, Align::End),
            Position::BottomRight => (Align::End, Align::End),
        }
    }

    /// Parses `value`, falling back to `default` with a warning when the
    /// name is not recognised.
    pub fn parse_or(value: &str, default: Position, module: &str) -> Position {
        value.parse().unwrap_or_else(|_| {
            log::warn!(
                "{}: unknown position '{}', using '{}'",
                module,
                value,
                default
            );
            default
        })
    }

    /// Parses the optional `position` value of a module's parameters.
    pub fn from_param(value: Option<String>, default: Position, module: &str) -> Position {
        value.map_or(default, |v| Position::parse_or(&v, default, module))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    /// Accepts `topleft`, `top_left`, `top-left` and `TopLeft` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let position = match normalized.as_str() {
            "center" | "centre" | "middle" => Position::Center,
            "top" => Position::Top,
            "bottom" => Position::Bottom,
            "left" => Position::Left,
            "right" => Position::Right,
            "centerleft" => Position::CenterLeft,
            "centerright" => Position::CenterRight,
            "topleft" => Position::TopLeft,
            "topright" => Position::TopRight,
            "bottomleft" => Position::BottomLeft,
            "bottomright" => Position::BottomRight,
            _ => return Err(format!("unknown position '{s}'")),
        };
        Ok(position)
    }
}

/// The symbols a filter uses for the frame and the placed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axes {
    outer_w: String,
    outer_h: String,
    inner_w: String,
    inner_h: String,
    margin: u32,
}

impl Axes {
    pub fn new(
        outer_w: impl Into<String>,
        outer_h: impl Into<String>,
        inner_w: impl Into<String>,
        inner_h: impl Into<String>,
    ) -> Self {
        Self {
            outer_w: outer_w.into(),
            outer_h: outer_h.into(),
            inner_w: inner_w.into(),
            inner_h: inner_h.into(),
            margin: 0,
        }
    }

    /// `overlay` filter spelling: `W`/`H` main, `w`/`h` overlay.
    pub fn overlay() -> Self {
        Self::new("W", "H", "w", "h")
    }

    /// `overlay` filter long spelling used by watermarks.
    pub fn watermark() -> Self {
        Self::new("main_w", "main_h", "overlay_w", "overlay_h")
    }

    /// `pad` filter: padded output `ow`/`oh`, input `iw`/`ih`.
    pub fn pad() -> Self {
        Self::new("ow", "oh", "iw", "ih")
    }

    /// `crop` filter: input `in_w`/`in_h`, literal target size.
    pub fn crop(width: u32, height: u32) -> Self {
        Self::new("in_w", "in_h", width.to_string(), height.to_string())
    }

    /// `drawtext` filter: frame `w`/`h`, text box `text_w`/`text_h`.
    pub fn drawtext() -> Self {
        Self::new("w", "h", "text_w", "text_h").with_margin(10)
    }

    /// Keeps the element `margin` pixels away from the frame edges.
    #[must_use]
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    fn axis(&self, align: Align, outer: &str, inner: &str) -> String {
        match (align, self.margin) {
            (Align::Start, 0) => "0".to_string(),
            (Align::Start, m) => m.to_string(),
            (Align::Middle, _) => format!("({outer}-{inner})/2"),
            (Align::End, 0) => format!("{outer}-{inner}"),
            (Align::End, m) => format!("{outer}-{inner}-{m}"),
        }
    }

    /// Resolves a named position into x/y expressions.
    pub fn resolve(&self, position: Position) -> Placement {
        let (h, v) = position.alignment();
        Placement {
            x: self.axis(h, &self.outer_w, &self.inner_w),
            y: self.axis(v, &self.outer_h, &self.inner_h),
        }
    }
}

/// A resolved pair of coordinate expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub x: String,
    pub y: String,
}

impl Placement {
    pub fn explicit(x: i64, y: i64) -> Self {
        Self {
            x: x.to_string(),
            y: y.to_string(),
        }
    }

    /// `x:y`, the positional form accepted by `overlay` and `pad`.
    pub fn positional(&self) -> String {
        format!("{}:{}", self.x, self.y)
    }

    /// `x=..:y=..`, the named form required by `drawtext`.
    pub fn named(&self) -> String {
        format!("x={}:y={}", self.x, self.y)
    }
}

/// Resolves a module's placement: explicit `x`/`y` win when both are given,
/// otherwise the named position is resolved against `axes`.
pub fn place(
    module: &str,
    axes: &Axes,
    position: Position,
    x: Option<i64>,
    y: Option<i64>,
) -> CoreResult<Placement> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Placement::explicit(x, y)),
        (None, None) => Ok(axes.resolve(position)),
        _ => Err(validation_error(
            module,
            "'x' and 'y' must be given together",
        )),
    }
}
