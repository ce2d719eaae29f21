use serde::{Deserialize, Serialize};

/// How overlap conflicts between surviving parcels are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Walk the overlap pairs once, in discovery order, dropping the smaller
    /// parcel of each pair whose endpoints are both still present.
    /// The outcome can depend on discovery order when three or more parcels
    /// overlap one another.
    #[default]
    SinglePass,

    /// Visit pairs from the highest overall overlap to the lowest (ties in
    /// discovery order), dropping the smaller parcel of each pair whose
    /// endpoints are both still present.
    GreedyGraph,
}

impl std::str::FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "single_pass" | "single" => Ok(Self::SinglePass),
            "greedy_graph" | "greedy" => Ok(Self::GreedyGraph),
            other => Err(format!("unknown resolution policy: {other}")),
        }
    }
}

/// Tunable parameters of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Overall overlap (in percent of the smaller parcel) above which a pair conflicts.
    pub overlap_threshold_pct: f64,

    /// Parcels with fewer vertices than this are reported in `num_point`.
    pub min_vertices: usize,

    /// Order in which conflicting pairs are resolved.
    pub policy: ResolutionPolicy,

    /// Evaluate candidate pairs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            overlap_threshold_pct: 15.0,
            min_vertices: 12,
            policy: ResolutionPolicy::SinglePass,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_report_conventions() {
        let options = ValidationOptions::default();
        assert_eq!(options.overlap_threshold_pct, 15.0);
        assert_eq!(options.min_vertices, 12);
        assert_eq!(options.policy, ResolutionPolicy::SinglePass);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: ValidationOptions =
            serde_json::from_str(r#"{ "policy": "greedy_graph", "min_vertices": 5 }"#).unwrap();
        assert_eq!(options.policy, ResolutionPolicy::GreedyGraph);
        assert_eq!(options.min_vertices, 5);
        assert_eq!(options.overlap_threshold_pct, 15.0);
        assert!(options.parallel);
    }

    #[test]
    fn policy_parses_from_cli_spelling() {
        assert_eq!("single-pass".parse::<ResolutionPolicy>(), Ok(ResolutionPolicy::SinglePass));
        assert_eq!("greedy".parse::<ResolutionPolicy>(), Ok(ResolutionPolicy::GreedyGraph));
        assert!("random".parse::<ResolutionPolicy>().is_err());
    }
}
