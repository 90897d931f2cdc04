use crate::eval::layers::Shadow;
use crate::foundation::color::parse_css_color;
use crate::foundation::core::Rgba8;

/// Resolve a CSS color, falling back to opaque white.
pub(crate) fn resolve_color(element_id: &str, color: &str) -> Rgba8 {
    match parse_css_color(color) {
        Ok(c) => c,
        Err(err) => {
            tracing::warn!(element_id, color, %err, "unparseable text color, using white");
            Rgba8::WHITE
        }
    }
}

/// CSS `font-weight` to a numeric weight.
pub(crate) fn resolve_font_weight(weight: &str) -> u16 {
    let w = weight.trim().to_ascii_lowercase();
    match w.as_str() {
        "" | "normal" => 400,
        "bold" => 700,
        "lighter" => 300,
        "bolder" => 800,
        other => match other.parse::<u16>() {
            Ok(n) if (1..=1000).contains(&n) => n,
            _ => 400,
        },
    }
}

/// Split a CSS font family list into unquoted names.
pub(crate) fn font_families(list: &str) -> Vec<String> {
    list.split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a CSS `text-shadow` value.
///
/// `None`, empty and `none` give no shadow. Anything else that does not parse gives
/// [`Shadow::FALLBACK`].
pub(crate) fn resolve_shadow(spec: Option<&str>) -> Option<Shadow> {
    let spec = spec?.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(parse_shadow(spec).unwrap_or(Shadow::FALLBACK))
}

fn parse_shadow(spec: &str) -> Option<Shadow> {
    // Only the first shadow of a comma-separated list is honored.
    let first = split_top_level(spec, ',').into_iter().next()?;
    let mut lengths = Vec::new();
    let mut color = None;
    let mut lengths_closed = false;
    for token in split_top_level(first, ' ') {
        if let Some(len) = parse_length(token) {
            if lengths_closed {
                return None;
            }
            lengths.push(len);
        } else if color.is_none() {
            color = Some(parse_css_color(token).ok()?);
            lengths_closed = !lengths.is_empty();
        } else {
            return None;
        }
    }
    let (dx, dy, blur) = match lengths.as_slice() {
        [dx, dy] => (*dx, *dy, 0.0),
        [dx, dy, blur] => (*dx, *dy, *blur),
        _ => return None,
    };
    if blur < 0.0 {
        return None;
    }
    Some(Shadow {
        dx,
        dy,
        blur,
        color: color.unwrap_or(Rgba8::rgb(0, 0, 0)),
    })
}

fn parse_length(token: &str) -> Option<f64> {
    let num = token.strip_suffix("px").unwrap_or(token);
    let v: f64 = num.parse().ok()?;
    v.is_finite().then_some(v)
}

fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out.into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/eval/style.rs"]
mod tests;
