//! Color tables and shortest-form color rewriting.

/// An RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl CssColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Hex notation, using the 3-digit form whenever it is exact.
    /// Only meaningful for opaque colors.
    pub fn to_hex(self) -> String {
        let short = [self.r, self.g, self.b].iter().all(|c| c >> 4 == c & 0x0f);
        if short {
            format!("#{:x}{:x}{:x}", self.r & 0x0f, self.g & 0x0f, self.b & 0x0f)
        } else {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}

/// The 148 CSS named colors. Aliases (`aqua`/`cyan`, `gray`/`grey`, ...)
/// appear as separate entries.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("cyan", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

/// Try to parse a named CSS color, including `transparent`.
pub fn parse_named_color(name: &str) -> Option<CssColor> {
    let lower = name.to_ascii_lowercase();
    if lower == "transparent" {
        return Some(CssColor::TRANSPARENT);
    }
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, [r, g, b])| CssColor::rgb(*r, *g, *b))
}

/// The shortest color keyword naming exactly this opaque color.
pub fn color_name(color: CssColor) -> Option<&'static str> {
    if color.a != 255 {
        return None;
    }
    NAMED_COLORS
        .iter()
        .filter(|(_, rgb)| *rgb == [color.r, color.g, color.b])
        .map(|(n, _)| *n)
        .min_by_key(|n| n.len())
}

/// Parse a hex color string (without the leading `#`).
/// Supports: `rgb` (3 hex digits), `rrggbb` (6), `rgba` (4), `rrggbbaa` (8).
pub fn parse_hex_color(hex: &str) -> Option<CssColor> {
    let digits: Vec<u8> = hex.chars().map(hex_digit).collect::<Option<_>>()?;
    match digits.as_slice() {
        [r, g, b] => Some(CssColor::rgb(r * 17, g * 17, b * 17)),
        [r, g, b, a] => Some(CssColor::new(r * 17, g * 17, b * 17, a * 17)),
        [r1, r2, g1, g2, b1, b2] => Some(CssColor::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        [r1, r2, g1, g2, b1, b2, a1, a2] => Some(CssColor::new(
            r1 * 16 + r2,
            g1 * 16 + g2,
            b1 * 16 + b2,
            a1 * 16 + a2,
        )),
        _ => None,
    }
}

fn hex_digit(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

/// Parse a normalized `rgb()`, `rgba()`, `hsl()` or `hsla()` function
/// value such as `rgba(0,0,0,.5)`.
pub fn parse_color_function(text: &str) -> Option<CssColor> {
    let lower = text.to_ascii_lowercase();
    let open = lower.find('(')?;
    let name = &lower[..open];
    let inner = lower[open + 1..].strip_suffix(')')?;
    let args: Vec<&str> = inner
        .split([',', ' ', '/'])
        .filter(|a| !a.is_empty())
        .collect();
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let alpha = match args.get(3) {
        Some(raw) => {
            let (value, percent) = parse_number(raw)?;
            let unit = if percent { value / 100.0 } else { value };
            channel(unit * 255.0)
        }
        None => 255,
    };

    match name {
        "rgb" | "rgba" => {
            let mut rgb = [0u8; 3];
            for (slot, raw) in rgb.iter_mut().zip(&args[..3]) {
                let (value, percent) = parse_number(raw)?;
                *slot = if percent { channel(value * 2.55) } else { channel(value) };
            }
            Some(CssColor::new(rgb[0], rgb[1], rgb[2], alpha))
        }
        "hsl" | "hsla" => {
            let h = parse_number(args[0].trim_end_matches("deg"))?.0;
            let (s, s_percent) = parse_number(args[1])?;
            let (l, l_percent) = parse_number(args[2])?;
            if !s_percent || !l_percent {
                return None;
            }
            let h = ((h % 360.0) + 360.0) % 360.0;
            let (r, g, b) = hsl_to_rgb(h, (s / 100.0).clamp(0.0, 1.0), (l / 100.0).clamp(0.0, 1.0));
            Some(CssColor::new(r, g, b, alpha))
        }
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<(f64, bool)> {
    match raw.strip_suffix('%') {
        Some(n) => n.parse().ok().map(|v| (v, true)),
        None => raw.parse().ok().map(|v| (v, false)),
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = channel(l * 255.0);
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h_norm = h / 360.0;
    let r = hue_to_rgb(p, q, h_norm + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h_norm);
    let b = hue_to_rgb(p, q, h_norm - 1.0 / 3.0);
    (channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 { t += 1.0; }
    if t > 1.0 { t -= 1.0; }
    if t < 1.0 / 6.0 { return p + (q - p) * 6.0 * t; }
    if t < 1.0 / 2.0 { return q; }
    if t < 2.0 / 3.0 { return p + (q - p) * (2.0 / 3.0 - t) * 6.0; }
    p
}

/// Is `token` one of the named color keywords (not `transparent`)?
pub fn is_named_color(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    NAMED_COLORS.iter().any(|(n, _)| *n == lower)
}

/// Rewrite an opaque color token into its shortest equivalent spelling.
///
/// Names win over hex only when strictly shorter (`red` stays, `blue`
/// becomes `#00f`). Returns `None` for anything that is not an opaque color
/// this module understands; translucent hex colors are only lowercased.
pub fn shortest_color(token: &str) -> Option<String> {
    let lower = token.to_ascii_lowercase();
    let color = if let Some(hex) = lower.strip_prefix('#') {
        let color = parse_hex_color(hex)?;
        if color.a != 255 {
            return Some(lower);
        }
        color
    } else if lower.contains('(') {
        parse_color_function(&lower)?
    } else if lower == "transparent" {
        return None;
    } else {
        parse_named_color(&lower)?
    };
    if color.a != 255 {
        return None;
    }

    let hex = color.to_hex();
    match color_name(color) {
        Some(name) if name.len() < hex.len() => Some(name.to_string()),
        _ => Some(hex),
    }
}
