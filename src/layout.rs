//! Page geometry and standard paper sizes

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    pub fn new(width: Length, height: Length) -> Self {
        Self { width, height }
    }

    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }

    /// US Legal size (8.5" × 14")
    pub fn legal() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(14.0),
        }
    }

    /// Tabloid size (11" × 17")
    pub fn tabloid() -> Self {
        Self {
            width: Length::from_inches(11.0),
            height: Length::from_inches(17.0),
        }
    }

    /// A3 size (297mm × 420mm)
    pub fn a3() -> Self {
        Self {
            width: Length::from_mm(297.0),
            height: Length::from_mm(420.0),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// A5 size (148mm × 210mm)
    pub fn a5() -> Self {
        Self {
            width: Length::from_mm(148.0),
            height: Length::from_mm(210.0),
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.width.pt()
    }

    pub fn height_pt(&self) -> f64 {
        self.height.pt()
    }

    /// Whether a page of `w`×`h` points matches this size within `tolerance`
    /// (a fraction of the expected dimension), in portrait orientation only.
    pub fn matches(&self, w: f64, h: f64, tolerance: f64) -> bool {
        within_tolerance(w, self.width_pt(), tolerance) && within_tolerance(h, self.height_pt(), tolerance)
    }

    /// Like [`matches`](Self::matches), but accepts either orientation.
    pub fn matches_either_orientation(&self, w: f64, h: f64, tolerance: f64) -> bool {
        self.matches(w, h, tolerance) || self.matches(h, w, tolerance)
    }
}

/// The paper sizes the normalizer recognizes and leaves untouched.
pub fn standard_sizes() -> [PageDimensions; 6] {
    [
        PageDimensions::letter(),
        PageDimensions::legal(),
        PageDimensions::tabloid(),
        PageDimensions::a3(),
        PageDimensions::a4(),
        PageDimensions::a5(),
    ]
}

/// True when `value` is within `tolerance` (fractional) of `expected`.
pub fn within_tolerance(value: f64, expected: f64, tolerance: f64) -> bool {
    (value - expected).abs() <= expected * tolerance
}

/// Margins for page content
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// The 2cm margins used for rendered document pages
    pub fn document() -> Self {
        Self::uniform(Length::from_mm(20.0))
    }

    /// Narrow margins for full-bleed composition pages
    pub fn narrow() -> Self {
        Self::uniform(Length::from_inches(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_inches(1.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
        assert!((len.pt() - 72.0).abs() < 0.01);

        let len = Length::from_pt(72.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_letter_size_points() {
        let letter = PageDimensions::letter();
        assert!((letter.width_pt() - 612.0).abs() < 0.1);
        assert!((letter.height_pt() - 792.0).abs() < 0.1);
    }

    #[test]
    fn test_matches_within_tolerance() {
        let letter = PageDimensions::letter();
        assert!(letter.matches(612.0, 792.0, 0.01));
        assert!(letter.matches(615.0, 795.0, 0.01));
        assert!(!letter.matches(595.0, 842.0, 0.01));
    }

    #[test]
    fn test_matches_either_orientation() {
        let a4 = PageDimensions::a4();
        assert!(a4.matches_either_orientation(595.3, 841.9, 0.01));
        assert!(a4.matches_either_orientation(841.9, 595.3, 0.01));
        assert!(!a4.matches_either_orientation(612.0, 792.0, 0.01));
    }

    #[test]
    fn test_document_margins_are_two_centimeters() {
        let margins = Margins::document();
        assert_eq!(margins.top.mm(), 20.0);
        assert!((margins.left.pt() - 56.69).abs() < 0.01);
    }
}
