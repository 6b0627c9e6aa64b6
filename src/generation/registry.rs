//! Maps a language to its generator

use std::sync::Arc;

use crate::core::Result;
use crate::generation::base::BaseGenerator;
use crate::generation::config::ConfigStore;
use crate::generation::context::GenerationContext;
use crate::generation::languages::{
    AngularGenerator, CSharpGenerator, GoGenerator, JavaGenerator, JavaScriptGenerator,
    PythonGenerator, RustGenerator,
};
use crate::generation::traits::PackageGenerator;
use crate::generation::types::Language;

/// Build the generator for one language.
///
/// Fails with a configuration error if the store has no entry for it.
pub fn build_generator(
    language: Language,
    ctx: &GenerationContext,
    store: &Arc<ConfigStore>,
) -> Result<Box<dyn PackageGenerator>> {
    let base = BaseGenerator::new(ctx.clone(), store.scoped(language)?);
    let generator: Box<dyn PackageGenerator> = match language {
        Language::CSharp => Box::new(CSharpGenerator::new(base)),
        Language::Java => Box::new(JavaGenerator::new(base)),
        Language::Angular => Box::new(AngularGenerator::new(base)),
        Language::JavaScript | Language::TypeScript => Box::new(JavaScriptGenerator::new(base)),
        Language::Python => Box::new(PythonGenerator::new(base)),
        Language::Go => Box::new(GoGenerator::new(base)),
        Language::Rust => Box::new(RustGenerator::new(base)),
    };
    Ok(generator)
}

/// Build generators for every language, in order
pub fn build_generators(
    languages: &[Language],
    ctx: &GenerationContext,
    store: &Arc<ConfigStore>,
) -> Result<Vec<Box<dyn PackageGenerator>>> {
    languages
        .iter()
        .map(|&language| build_generator(language, ctx, store))
        .collect()
}
