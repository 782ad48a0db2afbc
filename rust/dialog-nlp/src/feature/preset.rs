use super::{DenseField, FeatureItem, FeatureTemplate, Field, Relation, SetField};
use crate::error::NlpError;

/// Preset for dependency parsing.
pub const DEPENDENCY_PRESET: &str = "dep0";

/// Preset for part-of-speech tagging.
pub const TAGGING_PRESET: &str = "pos0";

impl FeatureTemplate {
    /// Builds a registered template by id.
    pub fn preset(id: &str, cutoff: usize) -> Result<Self, NlpError> {
        match id {
            DEPENDENCY_PRESET => Ok(dependency_template(cutoff)),
            TAGGING_PRESET => Ok(tagging_template(cutoff)),
            _ => Err(NlpError::UnknownTemplate(id.to_string())),
        }
    }
}

fn dependency_template(cutoff: usize) -> FeatureTemplate {
    use FeatureItem as I;

    let mut template = FeatureTemplate::new(cutoff);

    for field in [Field::Lowercase, Field::Lemma, Field::PartOfSpeech] {
        template
            .add(I::stack(0, field.clone()))
            .add(I::input(0, field.clone()))
            .add(I::input(1, field.clone()))
            .add(I::peek(-1, field.clone()))
            .add(I::peek(1, field));
    }

    template
        .add_conjunction([I::stack(0, Field::PartOfSpeech), I::input(0, Field::PartOfSpeech)])
        .add_conjunction([I::stack(0, Field::Lemma), I::input(0, Field::PartOfSpeech)])
        .add_conjunction([I::stack(0, Field::PartOfSpeech), I::input(0, Field::Lemma)])
        .add_conjunction([I::stack(0, Field::Lemma), I::input(0, Field::Lemma)])
        .add_conjunction([
            I::stack(0, Field::PartOfSpeech),
            I::input(0, Field::PartOfSpeech),
            I::input(1, Field::PartOfSpeech),
        ])
        .add_conjunction([
            I::stack(-1, Field::PartOfSpeech),
            I::stack(0, Field::PartOfSpeech),
            I::input(0, Field::PartOfSpeech),
        ]);

    for relation in [
        Relation::Head,
        Relation::LeftmostDependent(0),
        Relation::RightmostDependent(0),
    ] {
        template
            .add(I::stack(0, Field::DependencyLabel).with_relation(relation))
            .add(I::stack(0, Field::PartOfSpeech).with_relation(relation));
    }

    template
        .add(I::stack(0, Field::DependencyLabel))
        .add(I::input(0, Field::DependencyLabel))
        .add(I::input(0, Field::PartOfSpeech).with_relation(Relation::LeftmostDependent(0)))
        .add(I::input(0, Field::DependencyLabel).with_relation(Relation::LeftmostDependent(0)))
        .add(I::stack(0, Field::PartOfSpeech).with_relation(Relation::GrandHead))
        .add(I::stack(0, Field::DependencyLabel).with_relation(Relation::LeftNearestSibling(0)))
        .add_conjunction([I::stack(0, Field::Valency), I::stack(0, Field::PartOfSpeech)])
        .add_conjunction([I::input(0, Field::Valency), I::input(0, Field::PartOfSpeech)]);

    template.add_dense(I::stack(0, DenseField::Distance));
    template
}

fn tagging_template(cutoff: usize) -> FeatureTemplate {
    use FeatureItem as I;

    let mut template = FeatureTemplate::new(cutoff);

    for window in -2..=2 {
        template.add(I::input(window, Field::Lowercase));
    }
    template
        .add(I::input(0, Field::Shape))
        .add(I::input(-1, Field::PartOfSpeech))
        .add(I::input(-2, Field::PartOfSpeech))
        .add_conjunction([I::input(-2, Field::PartOfSpeech), I::input(-1, Field::PartOfSpeech)])
        .add_conjunction([I::input(-1, Field::Lowercase), I::input(0, Field::Lowercase)])
        .add_conjunction([I::input(0, Field::Lowercase), I::input(1, Field::Lowercase)])
        .add_conjunction([I::input(-1, Field::PartOfSpeech), I::input(1, Field::Lowercase)]);

    for n in 1..=3 {
        template
            .add(I::input(0, Field::Prefix(n)))
            .add(I::input(0, Field::Suffix(n)));
    }

    template
        .add_set(I::input(0, SetField::Orthographic))
        .add_set(I::input(0, SetField::Positional));
    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_resolved_by_id() {
        let dependency = FeatureTemplate::preset(DEPENDENCY_PRESET, 0).unwrap();
        assert!(dependency.feature_types() > 0);
        assert_eq!(dependency.dense_size(), 1);

        let tagging = FeatureTemplate::preset(TAGGING_PRESET, 2).unwrap();
        assert_eq!(tagging.feature_map().cutoff(), 2);
        assert_eq!(tagging.dense_size(), 0);

        assert!(matches!(
            FeatureTemplate::preset("ner9", 0),
            Err(NlpError::UnknownTemplate(id)) if id == "ner9"
        ));
    }
}
