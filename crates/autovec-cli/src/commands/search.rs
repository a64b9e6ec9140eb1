use anyhow::{Context, Result};
use autovec_store::{Config, SearchStore};

pub async fn run_search(
    config: &Config,
    text: String,
    limit: u32,
    num_candidates: u32,
    title: Option<String>,
) -> Result<()> {
    let query = config.search_query(text, limit, num_candidates, title);
    query.validate()?;

    let store = super::connect(config).await?;
    let results = store
        .vector_search(&config.collection, &query)
        .await
        .context("Semantic search failed")?;

    if results.is_empty() {
        println!("No results. Run 'autovec status' to check whether the index is ready.");
        return Ok(());
    }

    for (rank, hit) in results.hits().iter().enumerate() {
        println!("{:>3}. {:.4}  {}", rank + 1, hit.score, hit.title);
    }

    Ok(())
}
