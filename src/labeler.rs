/*! Record labeling.

Turns eligible [RawRecord]s into [Candidate]s: a category label and the item name, ready to be normalized.

Sampling is done once per record, before any other check,
so that the random sequence only depends on the number of records read.
!*/
use std::hash::Hasher;
use std::path::Path;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use twox_hash::XxHash64;

use crate::catalog::RawRecord;
use crate::config::{Config, LabelMode};
use crate::filtering::{Filter, Taxonomy};
use crate::normalizer::TextNormalizer;

/// A training example: a category label and a normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledExample {
    category: String,
    text: String,
}

impl LabeledExample {
    pub fn new(category: String, text: String) -> Self {
        Self { category, text }
    }

    pub fn category(&self) -> &str {
        self.category.as_ref()
    }

    pub fn text(&self) -> &str {
        self.text.as_ref()
    }
}

/// A labeled, not yet normalized item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    category: String,
    name: String,
}

impl Candidate {
    pub fn category(&self) -> &str {
        self.category.as_ref()
    }

    /// Item name, without newlines.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn normalize(self, normalizer: &TextNormalizer) -> LabeledExample {
        let text = normalizer.normalize(&self.name);
        LabeledExample::new(self.category, text)
    }
}

/// Applies taxonomy rules, sampling and label extraction to records.
#[derive(Debug, Clone)]
pub struct CategoryLabeler {
    taxonomy: Taxonomy,
    label_mode: LabelMode,
    sample_rate: f64,
}

impl CategoryLabeler {
    pub fn new(taxonomy: Taxonomy, label_mode: LabelMode, sample_rate: f64) -> Self {
        Self {
            taxonomy,
            label_mode,
            sample_rate,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.taxonomy().clone(),
            config.label_mode(),
            config.sample_rate(),
        )
    }

    /// Emit a [Candidate] for `record`, or `None` if the record is skipped
    /// (not sampled, not eligible or without a usable label).
    pub fn label<R: Rng>(&self, record: &RawRecord, rng: &mut R) -> Option<Candidate> {
        let draw: f64 = rng.gen();
        if draw > self.sample_rate {
            return None;
        }

        if !self.taxonomy.detect(record) {
            return None;
        }

        let leaf = record.leaf()?;
        let category = match self.label_mode {
            LabelMode::Id => leaf.id()?.to_string(),
            LabelMode::Name => leaf.name()?.split_whitespace().join("_"),
        };
        if category.is_empty() {
            return None;
        }

        let name = record.name()?.replace('\n', " ");

        Some(Candidate { category, name })
    }
}

/// Per-file random number generators for sampling.
///
/// With a seed, each file gets a generator derived from the seed and the file name,
/// so that sampling does not depend on which worker processes which file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    seed: Option<u64>,
}

impl Sampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    pub fn rng_for(&self, path: &Path) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mut hasher = XxHash64::with_seed(seed);
                let key = path.file_name().unwrap_or(path.as_os_str());
                hasher.write(key.to_string_lossy().as_bytes());
                StdRng::seed_from_u64(hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::catalog::CategoryPathSegment;

    fn seg(id: &str, name: &str) -> CategoryPathSegment {
        CategoryPathSegment::new(Some(id.to_string()), Some(name.to_string()))
    }

    fn mouse(branch: &str) -> RawRecord {
        RawRecord::new(
            Some("Wireless-Mouse\n2.4GHz".to_string()),
            vec![
                seg("cat00000", "General"),
                seg(branch, "Electronics"),
                seg("abcat0101000", "Computer Mice"),
            ],
        )
    }

    fn labeler(mode: LabelMode, rate: f64) -> CategoryLabeler {
        CategoryLabeler::new(Taxonomy::default(), mode, rate)
    }

    // always draws 0.0
    fn zero() -> StepRng {
        StepRng::new(0, 0)
    }

    // always draws the largest value below 1.0
    fn almost_one() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn label_by_id() {
        let c = labeler(LabelMode::Id, 1.0)
            .label(&mouse("abcat0100000"), &mut zero())
            .unwrap();
        assert_eq!(c.category(), "abcat0101000");
        assert_eq!(c.name(), "Wireless-Mouse 2.4GHz");
    }

    #[test]
    fn label_by_name() {
        let c = labeler(LabelMode::Name, 1.0)
            .label(&mouse("abcat0100000"), &mut zero())
            .unwrap();
        assert_eq!(c.category(), "Computer_Mice");
    }

    #[test]
    fn name_mode_without_leaf_name() {
        let r = RawRecord::new(
            Some("x".to_string()),
            vec![
                seg("cat00000", "General"),
                CategoryPathSegment::new(Some("abcat0101000".to_string()), None),
            ],
        );
        assert!(labeler(LabelMode::Name, 1.0).label(&r, &mut zero()).is_none());
        assert!(labeler(LabelMode::Id, 1.0).label(&r, &mut zero()).is_some());
    }

    #[test]
    fn name_mode_folds_any_whitespace() {
        let leaf_named = |name: &str| {
            RawRecord::new(
                Some("Mouse".to_string()),
                vec![
                    seg("cat00000", "General"),
                    seg("abcat0100000", "Electronics"),
                    seg("abcat0101000", name),
                ],
            )
        };
        let l = labeler(LabelMode::Name, 1.0);

        let c = l.label(&leaf_named("Computer\tMice\n"), &mut zero()).unwrap();
        assert_eq!(c.category(), "Computer_Mice");
        let c = l
            .label(&leaf_named(" Mice  &\r\nKeyboards "), &mut zero())
            .unwrap();
        assert_eq!(c.category(), "Mice_&_Keyboards");
        assert!(l.label(&leaf_named(" \t\n"), &mut zero()).is_none());
    }

    #[test]
    fn restricted() {
        let l = labeler(LabelMode::Id, 1.0);
        assert!(l.label(&mouse("abcat0600000"), &mut zero()).is_none());
    }

    #[test]
    fn empty_path() {
        let r = RawRecord::new(Some("x".to_string()), vec![]);
        assert!(labeler(LabelMode::Id, 1.0).label(&r, &mut zero()).is_none());
    }

    #[test]
    fn full_rate_always_samples() {
        let l = labeler(LabelMode::Id, 1.0);
        assert!(l.label(&mouse("abcat0100000"), &mut almost_one()).is_some());
    }

    #[test]
    fn sampled_out() {
        let l = labeler(LabelMode::Id, 0.5);
        assert!(l.label(&mouse("abcat0100000"), &mut almost_one()).is_none());
        assert!(l.label(&mouse("abcat0100000"), &mut zero()).is_some());
    }

    #[test]
    fn sampling_rate_is_respected() {
        let l = labeler(LabelMode::Id, 0.3);
        let mut rng = StdRng::seed_from_u64(42);
        let r = mouse("abcat0100000");
        let kept = (0..10_000).filter(|_| l.label(&r, &mut rng).is_some()).count();
        assert!((2_700..3_300).contains(&kept), "kept {}", kept);
    }

    #[test]
    fn one_draw_per_record() {
        // ineligible records consume the same amount of randomness as eligible ones
        let l = labeler(LabelMode::Id, 0.5);
        let records = [mouse("abcat0100000"), mouse("abcat0600000"), RawRecord::default()];

        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for r in records.iter() {
            l.label(r, &mut a);
            let _: f64 = b.gen();
        }
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn seeded_sampler_is_reproducible() {
        let s = Sampler::new(Some(1));
        let p = Path::new("/data/products_0001.xml");
        let q = Path::new("/elsewhere/products_0001.xml");
        assert_eq!(s.rng_for(p).gen::<u64>(), s.rng_for(q).gen::<u64>());

        let other = Path::new("/data/products_0002.xml");
        assert_ne!(s.rng_for(p).gen::<u64>(), s.rng_for(other).gen::<u64>());
    }
}
