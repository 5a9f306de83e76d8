//! Commands that run locally without calling the model.

use std::path::Path;

use anyhow::Context;
use postcraft_core::{Platform, PlatformRules};
use postcraft_pipeline::{
    check_compliance, extract_post_metadata, heuristic_virality, split_content_into_batches,
    BatchOptions,
};

pub(crate) fn run_split(
    file: &Path,
    chunk_size: usize,
    overlap: usize,
    max_batches: usize,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let options = BatchOptions {
        chunk_size,
        overlap,
        max_batches,
    };
    let batches = split_content_into_batches(&content, &options)?;

    println!(
        "{} chars -> {} batch(es)",
        content.chars().count(),
        batches.len()
    );
    for batch in &batches {
        let preview: String = batch.content.chars().take(60).collect();
        println!(
            "#{:<3} [{:>7}, {:>7}){} {:?}",
            batch.index,
            batch.start_char,
            batch.end_char,
            if batch.has_overlap { " +overlap" } else { "" },
            preview.replace('\n', " ")
        );
    }
    Ok(())
}

pub(crate) fn run_score(text: &str, platform: Option<Platform>) -> anyhow::Result<()> {
    let metadata = extract_post_metadata(text);
    let score = heuristic_virality(&metadata);

    let mut report = serde_json::json!({
        "score": score,
        "metadata": metadata,
    });
    if let Some(platform) = platform {
        let rules = PlatformRules::default_for(platform);
        report["compliance"] = serde_json::to_value(check_compliance(text, &rules))?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
