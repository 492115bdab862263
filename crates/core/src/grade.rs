//! Confidence grades for match scores.

use serde::Serialize;

/// Discretised confidence tier of a match score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

/// Lower bound (inclusive) of each band, highest first. Scores carry one decimal, so a band
/// written as `75–89` covers everything from 75.0 up to but excluding 90.0.
const BANDS: [(f64, Grade); 4] = [
    (90.0, Grade::S),
    (75.0, Grade::A),
    (60.0, Grade::B),
    (40.0, Grade::C),
];

impl Grade {
    /// Grade a total score.
    ///
    /// Scores are clamped to `[0, 100]` before they get here; anything that matches no band
    /// (including NaN) is `D`.
    pub fn for_score(total: f64) -> Self {
        BANDS
            .iter()
            .find(|(floor, _)| total >= *floor)
            .map(|&(_, grade)| grade)
            .unwrap_or(Grade::D)
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::S => "최고 일치",
            Grade::A => "높은 일치",
            Grade::B => "중간 일치",
            Grade::C => "낮은 일치",
            Grade::D => "참고용",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(Grade::for_score(100.0), Grade::S);
        assert_eq!(Grade::for_score(90.0), Grade::S);
        assert_eq!(Grade::for_score(89.9), Grade::A);
        assert_eq!(Grade::for_score(75.0), Grade::A);
        assert_eq!(Grade::for_score(74.9), Grade::B);
        assert_eq!(Grade::for_score(60.0), Grade::B);
        assert_eq!(Grade::for_score(59.9), Grade::C);
        assert_eq!(Grade::for_score(40.0), Grade::C);
        assert_eq!(Grade::for_score(39.9), Grade::D);
        assert_eq!(Grade::for_score(0.0), Grade::D);
    }

    #[test]
    fn unmatched_scores_default_to_d() {
        assert_eq!(Grade::for_score(f64::NAN), Grade::D);
        assert_eq!(Grade::for_score(-5.0), Grade::D);
    }

    #[test]
    fn labels() {
        assert_eq!(Grade::S.label(), "최고 일치");
        assert_eq!(Grade::D.label(), "참고용");
    }
}
