//! Augment command

use crate::app::AugmentArgs;
use anyhow::{Context, Result};
use ragbridge_core::{OutgoingRequest, ProviderRegistry, RagConfig, RequestPipeline};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

pub async fn run(args: AugmentArgs, mut config: RagConfig, registry: &ProviderRegistry) -> Result<()> {
    let raw = read_input(&args.input)?;
    let mut request: OutgoingRequest =
        serde_json::from_str(&raw).context("Failed to parse request JSON")?;

    if let Some(method) = args.method {
        config.rag_injection_method = method.into();
    }

    let pipeline = RequestPipeline::new(Arc::new(config))?;
    pipeline.on_llm_request(&mut request, registry).await;

    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}
