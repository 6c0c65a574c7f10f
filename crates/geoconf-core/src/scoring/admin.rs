//! Best match across the configured admin hierarchy properties.

use super::ScoringContext;
use crate::matching::FuzzyMatcher;
use crate::model::{ParsedQuery, ResultHit};
use tracing::debug;

impl<M: FuzzyMatcher> ScoringContext<'_, M> {
    /// Fuzzy-match every query value against every value found under the
    /// configured admin properties of `hit.parent`; return the best score.
    ///
    /// Returns `0.0` when admin scoring is not configured or the hit has no
    /// admin data.
    #[must_use]
    pub fn match_admin<S: AsRef<str>>(&self, values: &[S], hit: &ResultHit) -> f64 {
        let Some(properties) = self.config.admin_properties() else {
            return 0.0;
        };

        properties
            .iter()
            .filter_map(|key| hit.parent_field(key))
            .flat_map(|admin| admin.iter())
            .filter(|admin| !admin.is_empty())
            .map(|admin| self.matcher.best_of(admin, values))
            .fold(0.0, f64::max)
    }

    /// Admin match for the parsed `regions`.
    ///
    /// The full list goes to the matcher, including the leading entry that
    /// conventionally holds the place name itself.
    #[must_use]
    pub fn match_regions(&self, parsed: &ParsedQuery, hit: &ResultHit) -> f64 {
        let score = self.match_admin(&parsed.regions, hit);
        debug!(score, "admin match");
        score
    }

    /// Admin match for a single city name.
    #[must_use]
    pub fn match_city(&self, city: &str, hit: &ResultHit) -> f64 {
        let score = self.match_admin(&[city], hit);
        debug!(score, city, "city match");
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocalizationSettings, ScoringConfig, ScoringSettings};
    use crate::matching::LevenshteinMatcher;
    use crate::model::{FieldGroup, FieldValues};

    fn assert_approx_eq(actual: f64, expected: f64) {
        let tolerance = 1e-10;
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual ({actual}) != expected ({expected})"
        );
    }

    fn admin_config(properties: &[&str]) -> ScoringConfig {
        ScoringConfig::from_settings(&ScoringSettings {
            localization: Some(LocalizationSettings {
                confidence_admin_properties: Some(
                    properties.iter().map(ToString::to_string).collect(),
                ),
                confidence_address_parts: None,
            }),
            ..ScoringSettings::default()
        })
        .expect("valid settings")
    }

    fn helsinki_hit() -> ResultHit {
        ResultHit {
            parent: Some(FieldGroup::from([
                ("localadmin".to_string(), FieldValues::many(["Helsinki", "Helsingfors"])),
                ("region".to_string(), FieldValues::one("Uusimaa")),
                ("country".to_string(), FieldValues::many(["Finland"])),
            ])),
            ..ResultHit::default()
        }
    }

    #[test]
    fn best_value_across_configured_properties() {
        let config = admin_config(&["localadmin", "region"]);
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        let hit = helsinki_hit();

        assert_approx_eq(ctx.match_admin(&["Kamppi", "Helsingfors"], &hit), 1.0);
        assert_approx_eq(ctx.match_admin(&["uusimaa"], &hit), 1.0);
    }

    #[test]
    fn unconfigured_properties_are_ignored() {
        let config = admin_config(&["localadmin"]);
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        let score = ctx.match_admin(&["Finland"], &helsinki_hit());
        assert!(score < 1.0);
    }

    #[test]
    fn disabled_or_missing_admin_data_scores_zero() {
        let config = ScoringConfig::default();
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        assert_approx_eq(ctx.match_admin(&["Helsinki"], &helsinki_hit()), 0.0);

        let config = admin_config(&["localadmin"]);
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        assert_approx_eq(ctx.match_admin(&["Helsinki"], &ResultHit::default()), 0.0);
    }

    #[test]
    fn regions_include_the_leading_entry() {
        let config = admin_config(&["localadmin"]);
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        let parsed = ParsedQuery {
            regions: vec!["Helsinki".into(), "Espoo".into()],
            ..ParsedQuery::default()
        };
        assert_approx_eq(ctx.match_regions(&parsed, &helsinki_hit()), 1.0);
    }

    #[test]
    fn city_is_a_single_value_admin_match() {
        let config = admin_config(&["localadmin"]);
        let ctx = ScoringContext::new(&config, &LevenshteinMatcher);
        assert_approx_eq(ctx.match_city("helsinki", &helsinki_hit()), 1.0);
        assert!(ctx.match_city("Tampere", &helsinki_hit()) < 0.5);
    }
}
