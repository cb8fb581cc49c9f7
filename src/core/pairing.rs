//! Array pair location and mapping validation.
//!
//! Pairs a numeric index array with a string fragment array. Neighbours in
//! source order are tried first; every other combination follows as a sweep
//! so that a reordered payload still yields candidates. Pairs whose indices
//! do not all resolve are dropped, never clamped. Pairs declared inside the
//! payload's main body outrank those outside it.

use std::collections::HashSet;
use std::ops::Range;

use serde::Serialize;

use super::error::Rejection;
use super::scanner::{ArrayElements, ArrayKind, LiteralArrayCandidate, MappingSite};

/// Elements shown per array in a pair summary.
const SAMPLE_LEN: usize = 5;

/// How a pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PairOrigin {
    /// Adjacent declarations within the proximity threshold.
    Proximity,
    /// Exhaustive cross product.
    Sweep,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayPair<'a> {
    pub string_array: &'a LiteralArrayCandidate,
    pub number_array: &'a LiteralArrayCandidate,
    /// Distance between the two declarations, in bytes.
    pub proximity: usize,
    pub origin: PairOrigin,
    /// The payload maps the index array through the fragment array somewhere.
    pub mapping_evidence: bool,
    /// Both declarations sit inside the payload's main body.
    pub in_main_body: bool,
}

/// Name, size and leading elements of one array of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySummary {
    pub name: String,
    pub length: usize,
    pub sample: ArraySample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArraySample {
    Strings(Vec<String>),
    Numbers(Vec<usize>),
}

impl From<&LiteralArrayCandidate> for ArraySummary {
    fn from(array: &LiteralArrayCandidate) -> Self {
        let sample = match &array.elements {
            ArrayElements::Strings(v) => {
                ArraySample::Strings(v.iter().take(SAMPLE_LEN).cloned().collect())
            }
            ArrayElements::Numbers(v) => {
                ArraySample::Numbers(v.iter().take(SAMPLE_LEN).copied().collect())
            }
        };
        Self {
            name: array.name.clone(),
            length: array.len(),
            sample,
        }
    }
}

/// The arrays a key was composed from, for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSummary {
    pub string_array: ArraySummary,
    pub number_array: ArraySummary,
    pub origin: PairOrigin,
}

impl<'a> ArrayPair<'a> {
    /// Pair two candidates. Returns `None` unless `string_array` holds strings
    /// and `number_array` holds numbers.
    pub fn new(
        string_array: &'a LiteralArrayCandidate,
        number_array: &'a LiteralArrayCandidate,
        origin: PairOrigin,
    ) -> Option<Self> {
        if string_array.kind() != ArrayKind::String || number_array.kind() != ArrayKind::Number {
            return None;
        }
        Some(Self {
            string_array,
            number_array,
            proximity: string_array.source_offset.abs_diff(number_array.source_offset),
            origin,
            mapping_evidence: false,
            in_main_body: false,
        })
    }

    pub fn summary(&self) -> PairSummary {
        PairSummary {
            string_array: self.string_array.into(),
            number_array: self.number_array.into(),
            origin: self.origin,
        }
    }

    pub fn fragments(&self) -> &'a [String] {
        self.string_array.as_strings().unwrap_or(&[])
    }

    pub fn indices(&self) -> &'a [usize] {
        self.number_array.as_numbers().unwrap_or(&[])
    }

    fn rank(&self) -> (bool, bool, PairOrigin, bool, usize, usize, usize) {
        (
            !self.mapping_evidence,
            !self.in_main_body,
            self.origin,
            !self.string_array.is_hex_like(),
            self.proximity,
            self.string_array.source_offset,
            self.number_array.source_offset,
        )
    }
}

/// Check that every index of the pair resolves into the fragment array.
pub fn validate_mapping(pair: &ArrayPair) -> Result<(), Rejection> {
    let fragment_len = pair.fragments().len();
    match pair.indices().iter().copied().max() {
        Some(max_index) if max_index >= fragment_len => Err(Rejection::InvalidMapping {
            index_array: pair.number_array.name.clone(),
            fragment_array: pair.string_array.name.clone(),
            max_index,
            fragment_len,
        }),
        _ => Ok(()),
    }
}

/// Valid pairs, best first, plus the rejections of the invalid ones.
#[derive(Debug, Default)]
pub struct PairLocation<'a> {
    pub pairs: Vec<ArrayPair<'a>>,
    pub rejected: Vec<Rejection>,
}

pub fn locate<'a>(
    string_arrays: &'a [LiteralArrayCandidate],
    number_arrays: &'a [LiteralArrayCandidate],
    mapping_sites: &[MappingSite],
    main_body: Option<&Range<usize>>,
    proximity_threshold: usize,
) -> PairLocation<'a> {
    let mut merged: Vec<&LiteralArrayCandidate> =
        string_arrays.iter().chain(number_arrays.iter()).collect();
    merged.sort_by_key(|c| c.source_offset);

    let mut candidates: Vec<ArrayPair<'a>> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for window in merged.windows(2) {
        let (a, b) = (window[0], window[1]);
        if b.source_offset - a.source_offset > proximity_threshold {
            continue;
        }
        let pair = match (a.kind(), b.kind()) {
            (ArrayKind::String, ArrayKind::Number) => ArrayPair::new(a, b, PairOrigin::Proximity),
            (ArrayKind::Number, ArrayKind::String) => ArrayPair::new(b, a, PairOrigin::Proximity),
            _ => None,
        };
        if let Some(pair) = pair {
            seen.insert((pair.string_array.source_offset, pair.number_array.source_offset));
            candidates.push(pair);
        }
    }

    for string_array in string_arrays {
        for number_array in number_arrays {
            if seen.contains(&(string_array.source_offset, number_array.source_offset)) {
                continue;
            }
            if let Some(pair) = ArrayPair::new(string_array, number_array, PairOrigin::Sweep) {
                candidates.push(pair);
            }
        }
    }

    let mut location = PairLocation::default();
    for mut pair in candidates {
        pair.in_main_body = main_body.is_some_and(|body| {
            body.contains(&pair.string_array.source_offset)
                && body.contains(&pair.number_array.source_offset)
        });
        pair.mapping_evidence = mapping_sites.iter().any(|site| {
            site.index_array == pair.number_array.name
                && site
                    .fragment_arrays
                    .iter()
                    .any(|f| *f == pair.string_array.name)
        });
        match validate_mapping(&pair) {
            Ok(()) => location.pairs.push(pair),
            Err(rejection) => location.rejected.push(rejection),
        }
    }
    location.pairs.sort_by_key(|pair| pair.rank());

    location
}
