use anyhow::{Context, Result};
use autovec_store::{Config, Provisioner};

/// Create the collection and submit the vector search index.
pub async fn run_provision(config: &Config) -> Result<()> {
    log::info!("Starting index provisioning");

    let store = super::connect(config).await?;
    let definition = config.index_definition();

    let report = Provisioner::new(&store)
        .provision(&config.collection, &definition)
        .await
        .context("Failed to create vector search index")?;

    if report.collection_created {
        println!("Created collection {}", report.namespace);
    }
    println!(
        "Vector search index '{}' created on {}",
        report.index_name, report.namespace
    );
    if let (Some(path), Some(model)) = (&report.embedding_path, &report.model) {
        println!(
            "Index will generate embeddings for the '{}' field using {} model",
            path, model
        );
    }

    Ok(())
}
