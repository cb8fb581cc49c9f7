use super::{Candidate, Strategy, StrategyKind};
use crate::core::cascade::Analysis;
use crate::core::composer::{ComposeMode, compose};
use crate::core::error::Rejection;
use crate::core::pairing::{PairOrigin, locate};

/// Key fragments in a string array, selected and ordered by a numeric index
/// array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayIndirection;

impl Strategy for ArrayIndirection {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ArrayIndirection
    }

    fn candidates(&self, analysis: &Analysis) -> Result<Vec<Candidate>, Rejection> {
        let scan = &analysis.scan;
        if scan.string_arrays.is_empty() || scan.number_arrays.is_empty() {
            return Err(Rejection::not_found(format!(
                "string and number arrays longer than {}",
                analysis.config.min_array_len
            )));
        }

        let mut location = locate(
            &scan.string_arrays,
            &scan.number_arrays,
            &analysis.mapping_sites,
            scan.main_body.as_ref(),
            analysis.config.proximity_threshold,
        );
        if location.pairs.is_empty() {
            return Err(location
                .rejected
                .drain(..)
                .next()
                .unwrap_or_else(|| Rejection::not_found("array pair")));
        }

        Ok(location
            .pairs
            .iter()
            .map(|pair| {
                let candidate = Candidate::new(
                    compose(pair, ComposeMode::Raw),
                    format!(
                        "`{}` indexes into `{}`",
                        pair.number_array.name, pair.string_array.name
                    ),
                )
                .with_pair(pair.summary());
                match pair.origin {
                    PairOrigin::Proximity => candidate,
                    PairOrigin::Sweep => candidate.low_confidence(),
                }
            })
            .collect())
    }
}
