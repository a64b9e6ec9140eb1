use anyhow::Result;
use autovec_store::{Config, SearchStore};

pub async fn show_status(config: &Config) -> Result<()> {
    let store = super::connect(config).await?;
    let namespace = store.namespace(&config.collection);

    println!("\nAutovec Status\n");
    println!("  Collection: {}", namespace);
    println!("  Documents: {}", store.count_documents(&config.collection).await?);

    let indexes = store
        .list_search_indexes(&config.collection, Some(config.index_name.as_str()))
        .await?;

    let Some(index) = indexes.first() else {
        println!("  Index '{}': not found", config.index_name);
        println!("\n  Run `autovec provision` to create it");
        return Ok(());
    };

    println!(
        "  Index '{}': {} ({})",
        index.name,
        index.status_label(),
        if index.queryable { "queryable" } else { "not queryable" }
    );

    let expected = config.index_definition();
    if index.matches(&expected) {
        println!("  Definition: matches configured embedding field");
    } else {
        println!("  Definition: differs from configuration");
        if let Ok(Some(stored)) = index.definition() {
            println!(
                "    stored model: {}",
                stored.model().unwrap_or("<none>")
            );
        }
        println!(
            "    configured: '{}' using {}",
            config.embedding_path, config.embedding_model
        );
    }

    Ok(())
}
