//! Building blocks shared by the modules that composite a second layer over
//! the main video (watermark, addvideo, chromakey, text_effects).

use crate::config::ParamReader;
use crate::error::{CoreResult, validation_error};
use crate::geometry::Placement;
use crate::graph::{Filter, TimeWindow, fmt_num};

/// Requested size of an overlay layer. Explicit dimensions win over `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySize {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: f64,
}

impl OverlaySize {
    pub fn from_reader(r: &ParamReader<'_>, default_scale: f64) -> CoreResult<Self> {
        let scale = r.f64_or("scale", default_scale)?;
        if scale <= 0.0 {
            return Err(validation_error(r.module(), "'scale' must be greater than zero"));
        }
        Ok(Self {
            width: r.dimension("width")?,
            height: r.dimension("height")?,
            scale,
        })
    }

    fn explicit(&self) -> Option<Filter> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Filter::new("scale", format!("{w}:{h}"))),
            (Some(w), None) => Some(Filter::new("scale", format!("{w}:-1"))),
            (None, Some(h)) => Some(Filter::new("scale", format!("-1:{h}"))),
            (None, None) => None,
        }
    }

    /// Scale filter over both axes, or `None` when the layer keeps its size.
    pub fn filter(&self) -> Option<Filter> {
        self.explicit().or_else(|| {
            (self.scale != 1.0).then(|| {
                let s = fmt_num(self.scale);
                Filter::new("scale", format!("iw*{s}:ih*{s}"))
            })
        })
    }

    /// Scale filter that derives the height from the scaled width
    /// (`scale=iw*S:-1`), as used for watermark images.
    pub fn width_relative_filter(&self) -> Filter {
        self.explicit().unwrap_or_else(|| {
            Filter::new("scale", format!("iw*{}:-1", fmt_num(self.scale)))
        })
    }
}

/// Reads an opacity-like value in `0..=1`.
pub fn read_alpha(r: &ParamReader<'_>, key: &str, default: f64) -> CoreResult<f64> {
    r.f64_in_range_or(key, default, 0.0, 1.0)
}

/// `format=rgba,colorchannelmixer=aa=A` when `alpha < 1`, nothing otherwise.
pub fn alpha_filters(alpha: f64) -> Vec<Filter> {
    if alpha < 1.0 {
        vec![
            Filter::new("format", "rgba"),
            Filter::new("colorchannelmixer", format!("aa={}", fmt_num(alpha))),
        ]
    } else {
        Vec::new()
    }
}

/// Reads `start_time`, `end_time` and `duration` into a window.
pub fn read_time_window(r: &ParamReader<'_>, default_start: Option<f64>) -> CoreResult<TimeWindow> {
    let start = r.f64("start_time")?.or(default_start);
    let end = r.f64("end_time")?;
    let duration = r.f64("duration")?;

    if start.is_some_and(|s| s < 0.0) {
        return Err(validation_error(r.module(), "'start_time' must not be negative"));
    }
    if duration.is_some_and(|d| d < 0.0) {
        return Err(validation_error(r.module(), "'duration' must not be negative"));
    }
    let window = TimeWindow::new(start, end, duration);
    if let (Some(s), Some(e)) = (window.start, window.end) {
        if e < s {
            return Err(validation_error(
                r.module(),
                format!("window ends ({e}s) before it starts ({s}s)"),
            ));
        }
    }
    Ok(window)
}

/// `overlay=x:y[:enable='...']`.
pub fn overlay_filter(placement: &Placement, window: &TimeWindow) -> Filter {
    Filter::new(
        "overlay",
        format!("{}{}", placement.positional(), window.enable_suffix()),
    )
}

/// Normalizes a key color: `green` -> `0x00FF00`, `#RRGGBB` -> `0xRRGGBB`.
pub fn key_color(color: &str) -> String {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        return format!("0x{hex}");
    }
    match color.to_ascii_lowercase().as_str() {
        "green" => "0x00FF00".to_string(),
        "blue" => "0x0000FF".to_string(),
        _ => color.to_string(),
    }
}
