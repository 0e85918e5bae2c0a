use std::fmt;

/// Benefit tier derived from the final score bands. Scores outside
/// [70, 100] are unclassified and yield no tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    JuniorAssociate,
    Senior,
    PrincipalMaster,
}

impl Tier {
    pub fn level(&self) -> &'static str {
        match self {
            Tier::JuniorAssociate => "Junior/Associate Expert",
            Tier::Senior => "Senior Expert",
            Tier::PrincipalMaster => "Principal/Master Expert",
        }
    }

    pub fn benefit(&self) -> &'static str {
        match self {
            Tier::JuniorAssociate => "Sertifikasi Nasional",
            Tier::Senior => "Sertifikasi Internasional",
            Tier::PrincipalMaster => "Sertifikasi Internasional",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Pure band lookup. Interior bounds are half-open so every score in
/// [70, 100] maps to exactly one tier.
pub fn classify(final_score: f64) -> Option<Tier> {
    if (70.0..80.0).contains(&final_score) {
        Some(Tier::JuniorAssociate)
    } else if (80.0..90.0).contains(&final_score) {
        Some(Tier::Senior)
    } else if (90.0..=100.0).contains(&final_score) {
        Some(Tier::PrincipalMaster)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_map_to_expected_tiers() {
        assert_eq!(classify(70.0), Some(Tier::JuniorAssociate));
        assert_eq!(classify(79.0), Some(Tier::JuniorAssociate));
        assert_eq!(classify(79.5), Some(Tier::JuniorAssociate));
        assert_eq!(classify(80.0), Some(Tier::Senior));
        assert_eq!(classify(89.99), Some(Tier::Senior));
        assert_eq!(classify(90.0), Some(Tier::PrincipalMaster));
        assert_eq!(classify(100.0), Some(Tier::PrincipalMaster));
    }

    #[test]
    fn out_of_band_scores_are_unclassified() {
        assert_eq!(classify(0.0), None);
        assert_eq!(classify(69.99), None);
        assert_eq!(classify(100.01), None);
        assert_eq!(classify(-5.0), None);
    }

    #[test]
    fn every_score_in_band_maps_to_exactly_one_tier() {
        let mut score = 70.0;
        while score <= 100.0 {
            assert!(classify(score).is_some(), "no tier for {score}");
            score += 0.25;
        }
    }

    #[test]
    fn benefit_labels_follow_levels() {
        assert_eq!(Tier::JuniorAssociate.benefit(), "Sertifikasi Nasional");
        assert_eq!(Tier::Senior.benefit(), "Sertifikasi Internasional");
        assert_eq!(Tier::PrincipalMaster.benefit(), "Sertifikasi Internasional");
    }
}
