use std::path::PathBuf;

use anyhow::{Context, Result};
use autovec_core::model::{Article, VectorSearchQuery};
use autovec_store::{Config, SmokeTest, WaitOutcome, WaitStrategy};

/// Insert articles, wait for embeddings, then run one semantic query.
pub async fn run_smoke_test(
    config: &Config,
    documents: Option<PathBuf>,
    query: VectorSearchQuery,
) -> Result<()> {
    let articles = match &documents {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Article::from_json(&json)
                .with_context(|| format!("Failed to parse articles from {}", path.display()))?
        }
        None => Article::samples(),
    };

    let store = super::connect(config).await?;
    let smoke = SmokeTest::new(&store, config.collection.as_str(), config.wait_strategy(), query)
        .with_articles(articles);
    smoke.validate()?;

    println!("Inserting test documents...");
    let inserted = smoke.insert().await.context("Failed to insert documents")?;
    println!("Inserted {} test documents.", inserted);

    match smoke.wait_strategy() {
        WaitStrategy::Fixed(duration) => println!(
            "Waiting {} seconds for embeddings to be generated...",
            duration.as_secs()
        ),
        WaitStrategy::Poll(settings) => println!(
            "Waiting for index '{}' to become queryable (up to {} probes)...",
            smoke.query().index,
            settings.max_attempts
        ),
    }
    let outcome = smoke.wait().await?;
    match &outcome {
        WaitOutcome::Slept(_) => {}
        WaitOutcome::Ready { .. } => {
            println!("Index ready after {:.1}s.", outcome.elapsed().as_secs_f64());
        }
        WaitOutcome::GaveUp { last_status, .. } => {
            println!(
                "Index still {} after {:.1}s; results may be incomplete.",
                last_status,
                outcome.elapsed().as_secs_f64()
            );
        }
    }

    println!(
        "\nRunning semantic search for '{}'...\n",
        smoke.query().text
    );
    let results = smoke.search().await.context("Semantic search failed")?;

    println!("Results:");
    println!("{}", results.to_pretty_json()?);

    Ok(())
}
