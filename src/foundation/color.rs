use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelforgeError, ReelforgeResult};

/// Parse a CSS color string into straight-alpha RGBA8.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// (channels 0..=255, alpha 0..=1) and a small set of named colors.
pub fn parse_css_color(s: &str) -> ReelforgeResult<Rgba8> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ReelforgeError::validation("color must be non-empty"));
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(args);
    }

    named_color(&lower).ok_or_else(|| ReelforgeError::validation(format!("unknown color \"{s}\"")))
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(s: &str) -> ReelforgeResult<Rgba8> {
    fn hex_byte(pair: &str) -> ReelforgeResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| ReelforgeError::validation(format!("invalid hex byte \"{pair}\"")))
    }
    fn hex_nibble(c: &str) -> ReelforgeResult<u8> {
        let v = hex_byte(c)?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err(ReelforgeError::validation("hex color must be ASCII"));
    }

    match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            Ok(Rgba8::rgba(r, g, b, a))
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            Ok(Rgba8::rgba(r, g, b, a))
        }
        _ => Err(ReelforgeError::validation(
            "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA",
        )),
    }
}

fn parse_rgb_args(args: &str) -> ReelforgeResult<Rgba8> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(ReelforgeError::validation(
            "rgb()/rgba() expects 3 or 4 components",
        ));
    }

    fn channel(p: &str) -> ReelforgeResult<u8> {
        let v = if let Some(pct) = p.strip_suffix('%') {
            parse_f64(pct)? * 2.55
        } else {
            parse_f64(p)?
        };
        Ok(v.round().clamp(0.0, 255.0) as u8)
    }

    fn alpha(p: &str) -> ReelforgeResult<u8> {
        let v = if let Some(pct) = p.strip_suffix('%') {
            parse_f64(pct)? / 100.0
        } else {
            parse_f64(p)?
        };
        Ok((v.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 255,
    };
    Ok(Rgba8::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn parse_f64(s: &str) -> ReelforgeResult<f64> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| ReelforgeError::validation(format!("invalid number \"{s}\"")))?;
    if !v.is_finite() {
        return Err(ReelforgeError::validation("color component must be finite"));
    }
    Ok(v)
}

fn named_color(name: &str) -> Option<Rgba8> {
    Some(match name {
        "white" => Rgba8::WHITE,
        "black" => Rgba8::rgb(0, 0, 0),
        "transparent" => Rgba8::rgba(0, 0, 0, 0),
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "lime" => Rgba8::rgb(0, 255, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "purple" => Rgba8::rgb(128, 0, 128),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        _ => return None,
    })
}
