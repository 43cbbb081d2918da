//! Text direction derived from the locale cookie.

const LOCALE_COOKIE: &str = "NEXT_LOCALE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Corner a map control is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
}

impl TextDirection {
    /// Reads the locale cookie out of a `Cookie` header value.
    ///
    /// Arabic is right-to-left; any other or missing locale is left-to-right.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Self {
        let locale = header.split(';').find_map(|pair| {
            pair.trim()
                .strip_prefix(LOCALE_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        });
        match locale {
            Some("ar") => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    /// Where the navigation control goes for this direction.
    #[must_use]
    pub fn control_position(self) -> ControlPosition {
        match self {
            TextDirection::Ltr => ControlPosition::TopLeft,
            TextDirection::Rtl => ControlPosition::TopRight,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}
